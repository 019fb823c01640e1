// roompla-core: Session state between roompla-api and consumers (CLI).

pub mod error;
pub mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use session::{Session, SessionSnapshot};
pub use store::RoomMap;
pub use stream::{SessionStream, SessionWatchStream};

// Re-export the wire types consumers hand to session flows.
pub use roompla_api::{
    Configuration, Credentials, Error as ApiError, Occupancy, Room, RoomplaApi, TimeRange,
};
