// roompla-api: Async Rust client for the roompla room-booking API

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{
    DeleteOccupancyRequest, ListOccupanciesRequest, LoginRequest, PutOccupancyRequest,
    RoomplaApi, UpdateOccupancyRequest,
};
pub use config::{API_PREFIX, AccessToken, BEARER_SCHEME, Configuration, DEVELOPMENT_BASE_PATH};
pub use error::Error;
pub use models::{Credentials, Occupancy, Room, TimeRange, Wire};
pub use transport::{ApiResponse, RawResponse, RequestExecutor, RequestSpec};
