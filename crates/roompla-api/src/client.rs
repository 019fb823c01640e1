// Typed gateway for the roompla API
//
// One method pair per endpoint: `*_raw` returns the decoded value with
// status and headers, the plain form returns just the value. Required
// parameters are checked before a request is built, so a malformed call
// never reaches the wire.

use reqwest::Method;

use crate::config::Configuration;
use crate::error::Error;
use crate::models::{Credentials, Occupancy, Room, TimeRange, Wire};
use crate::transport::{ApiResponse, RequestExecutor, RequestSpec};

// ── Request parameters ──────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct LoginRequest {
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone, Default)]
pub struct ListOccupanciesRequest {
    pub room: Option<String>,
    /// Only occupancies starting at or after this RFC 3339 instant.
    pub start: Option<String>,
    /// Only occupancies ending at or before this RFC 3339 instant.
    pub end: Option<String>,
}

impl ListOccupanciesRequest {
    pub fn for_room(room: impl Into<String>) -> Self {
        Self {
            room: Some(room.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PutOccupancyRequest {
    pub room: Option<String>,
    pub time_range: Option<TimeRange>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOccupancyRequest {
    pub room: Option<String>,
    pub id: Option<i64>,
    pub time_range: Option<TimeRange>,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteOccupancyRequest {
    pub room: Option<String>,
    pub id: Option<i64>,
}

fn required<T>(
    value: Option<T>,
    parameter: &'static str,
    operation: &'static str,
) -> Result<T, Error> {
    value.ok_or(Error::RequiredParameter {
        parameter,
        operation,
    })
}

// ── Gateway ─────────────────────────────────────────────────────────

/// Async client for the roompla API, bound to one [`Configuration`].
///
/// Credentials are fixed for the lifetime of the client: to log in or out,
/// build a new one.
#[derive(Debug, Clone)]
pub struct RoomplaApi {
    executor: RequestExecutor,
}

impl RoomplaApi {
    pub fn new(config: Configuration) -> Self {
        Self {
            executor: RequestExecutor::new(config),
        }
    }

    pub fn configuration(&self) -> &Configuration {
        self.executor.configuration()
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Create a JWT for the credentials of an account.
    pub async fn login_raw(&self, params: LoginRequest) -> Result<ApiResponse<String>, Error> {
        let credentials = required(params.credentials, "credentials", "login")?;

        let spec = RequestSpec::new(Method::POST, "/login")
            .body(Credentials::to_wire(Some(&credentials)));
        Ok(self.executor.execute(spec).await?.text())
    }

    pub async fn login(&self, params: LoginRequest) -> Result<String, Error> {
        Ok(self.login_raw(params).await?.into_value())
    }

    // ── Rooms ────────────────────────────────────────────────────────

    /// Get all rooms in the system.
    pub async fn list_rooms_raw(&self) -> Result<ApiResponse<Vec<Room>>, Error> {
        let spec = RequestSpec::new(Method::GET, "/rooms");
        self.executor.execute(spec).await?.array()
    }

    pub async fn list_rooms(&self) -> Result<Vec<Room>, Error> {
        Ok(self.list_rooms_raw().await?.into_value())
    }

    // ── Occupancies ──────────────────────────────────────────────────

    /// Get all (possibly filtered) occupancies for the given room.
    pub async fn list_occupancies_raw(
        &self,
        params: ListOccupanciesRequest,
    ) -> Result<ApiResponse<Vec<Occupancy>>, Error> {
        let room = required(params.room, "room", "list_occupancies")?;

        let spec = RequestSpec::new(Method::GET, "/rooms/{room}/occupancies")
            .path_param("room", room)
            .query("start", params.start.as_deref())
            .query("end", params.end.as_deref());
        self.executor.execute(spec).await?.array()
    }

    pub async fn list_occupancies(
        &self,
        params: ListOccupanciesRequest,
    ) -> Result<Vec<Occupancy>, Error> {
        Ok(self.list_occupancies_raw(params).await?.into_value())
    }

    /// Add a new occupancy entry. The returned occupancy carries the
    /// requester identity as recorded by the server.
    pub async fn put_occupancy_raw(
        &self,
        params: PutOccupancyRequest,
    ) -> Result<ApiResponse<Occupancy>, Error> {
        let room = required(params.room, "room", "put_occupancy")?;
        let time_range = required(params.time_range, "time_range", "put_occupancy")?;

        let spec = RequestSpec::new(Method::PUT, "/rooms/{room}/occupancies")
            .path_param("room", room)
            .body(TimeRange::to_wire(Some(&time_range)));
        self.executor.execute(spec).await?.object()
    }

    pub async fn put_occupancy(&self, params: PutOccupancyRequest) -> Result<Occupancy, Error> {
        Ok(self.put_occupancy_raw(params).await?.into_value())
    }

    /// Move an existing occupancy to a new time range. The server only
    /// applies this to occupancies owned by the caller.
    pub async fn update_occupancy_raw(
        &self,
        params: UpdateOccupancyRequest,
    ) -> Result<ApiResponse<()>, Error> {
        let room = required(params.room, "room", "update_occupancy")?;
        let id = required(params.id, "id", "update_occupancy")?;
        let time_range = required(params.time_range, "time_range", "update_occupancy")?;

        let spec = RequestSpec::new(Method::PUT, "/rooms/{room}/occupancies/{id}")
            .path_param("room", room)
            .path_param("id", id)
            .body(TimeRange::to_wire(Some(&time_range)));
        Ok(self.executor.execute(spec).await?.void())
    }

    pub async fn update_occupancy(&self, params: UpdateOccupancyRequest) -> Result<(), Error> {
        self.update_occupancy_raw(params).await.map(ApiResponse::into_value)
    }

    /// Remove an occupancy owned by the caller.
    pub async fn delete_occupancy_raw(
        &self,
        params: DeleteOccupancyRequest,
    ) -> Result<ApiResponse<()>, Error> {
        let room = required(params.room, "room", "delete_occupancy")?;
        let id = required(params.id, "id", "delete_occupancy")?;

        let spec = RequestSpec::new(Method::DELETE, "/rooms/{room}/occupancies/{id}")
            .path_param("room", room)
            .path_param("id", id);
        Ok(self.executor.execute(spec).await?.void())
    }

    pub async fn delete_occupancy(&self, params: DeleteOccupancyRequest) -> Result<(), Error> {
        self.delete_occupancy_raw(params).await.map(ApiResponse::into_value)
    }
}
