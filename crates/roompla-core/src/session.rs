// ── Client session store ──
//
// One live gateway, the signed-in user id and the last room listing.
// Every mutation swaps in a whole new snapshot, so readers see either the
// state before or the state after, never a mix.

use std::sync::Arc;

use arc_swap::ArcSwap;
use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, info};

use roompla_api::{
    Configuration, Credentials, DeleteOccupancyRequest, ListOccupanciesRequest, LoginRequest,
    Occupancy, PutOccupancyRequest, Room, RoomplaApi, TimeRange, UpdateOccupancyRequest,
};

use crate::error::CoreError;
use crate::store::RoomMap;
use crate::stream::SessionStream;

// ── Snapshot ────────────────────────────────────────────────────────

/// Immutable view of the session at one point in time.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    api: Arc<RoomplaApi>,
    user_id: String,
    rooms: Arc<RoomMap>,
}

impl SessionSnapshot {
    /// The gateway bound to this snapshot's credentials.
    pub fn api(&self) -> &Arc<RoomplaApi> {
        &self.api
    }

    /// Empty when anonymous.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn is_signed_in(&self) -> bool {
        !self.user_id.is_empty()
    }

    pub fn rooms(&self) -> &Arc<RoomMap> {
        &self.rooms
    }
}

// ── Session ─────────────────────────────────────────────────────────

/// Shared client state: gateway, user id and rooms.
///
/// Changed only by [`login`](Self::login), [`logout`](Self::logout) and
/// [`refresh_rooms`](Self::refresh_rooms) (and the flows built on them).
/// Share it by reference or behind an `Arc`.
#[derive(Debug)]
pub struct Session {
    /// Configuration used for every gateway, minus the access token.
    anonymous: Configuration,
    current: ArcSwap<SessionSnapshot>,
    changes: watch::Sender<Arc<SessionSnapshot>>,
}

impl Session {
    /// Anonymous session against `base_path` with no rooms.
    pub fn new(base_path: impl Into<String>) -> Self {
        Self::with_configuration(Configuration::new(base_path))
    }

    /// Anonymous session reusing `config`'s base path, headers and HTTP
    /// client. Any access token on `config` is dropped.
    pub fn with_configuration(config: Configuration) -> Self {
        let anonymous = config.without_access_token();
        let initial = Arc::new(SessionSnapshot {
            api: Arc::new(RoomplaApi::new(anonymous.clone())),
            user_id: String::new(),
            rooms: Arc::new(RoomMap::new()),
        });
        let (changes, _) = watch::channel(Arc::clone(&initial));

        Self {
            anonymous,
            current: ArcSwap::new(initial),
            changes,
        }
    }

    pub fn base_path(&self) -> &str {
        self.anonymous.base_path()
    }

    // ── Readers ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.current.load_full()
    }

    pub fn api(&self) -> Arc<RoomplaApi> {
        Arc::clone(&self.current.load().api)
    }

    pub fn user_id(&self) -> String {
        self.current.load().user_id.clone()
    }

    pub fn rooms(&self) -> Arc<RoomMap> {
        Arc::clone(&self.current.load().rooms)
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> SessionStream {
        SessionStream::new(self.changes.subscribe())
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Bind a new gateway to `token` and record `user_id`. Rooms are kept.
    pub fn login(&self, token: SecretString, user_id: impl Into<String>) -> Arc<SessionSnapshot> {
        let user_id = user_id.into();
        let api = Arc::new(RoomplaApi::new(
            self.anonymous.clone().with_access_token(token),
        ));
        info!(user_id = %user_id, "session logged in");

        self.replace(|cur| SessionSnapshot {
            api,
            user_id,
            ..cur.clone()
        })
    }

    /// Bind a new anonymous gateway and clear the user id. Rooms are kept.
    pub fn logout(&self) -> Arc<SessionSnapshot> {
        let api = Arc::new(RoomplaApi::new(self.anonymous.clone()));
        info!("session logged out");

        self.replace(|cur| SessionSnapshot {
            api,
            user_id: String::new(),
            ..cur.clone()
        })
    }

    /// Replace the room map with one built from `rooms`.
    pub fn refresh_rooms(&self, rooms: Vec<Room>) -> Arc<RoomMap> {
        let map = Arc::new(RoomMap::from_rooms(rooms));
        debug!(rooms = map.len(), "room map refreshed");

        self.replace(|cur| SessionSnapshot {
            rooms: Arc::clone(&map),
            ..cur.clone()
        });
        map
    }

    fn replace<F>(&self, f: F) -> Arc<SessionSnapshot>
    where
        F: FnOnce(&SessionSnapshot) -> SessionSnapshot,
    {
        let applied = self.apply_if(|cur| Some(f(cur)));
        applied.unwrap_or_else(|| self.snapshot())
    }

    /// Swap in `f(current)` unless it returns `None`. Subscribers are
    /// notified only when something was swapped in.
    ///
    /// Runs under the watch channel's write lock, so the published value
    /// and the swapped-in snapshot always change together and in order.
    fn apply_if<F>(&self, f: F) -> Option<Arc<SessionSnapshot>>
    where
        F: FnOnce(&SessionSnapshot) -> Option<SessionSnapshot>,
    {
        let mut applied = None;
        self.changes.send_if_modified(|published| {
            let Some(next) = f(published.as_ref()) else {
                return false;
            };
            let next = Arc::new(next);
            self.current.store(Arc::clone(&next));
            *published = Arc::clone(&next);
            applied = Some(next);
            true
        });
        applied
    }

    // ── Flows ────────────────────────────────────────────────────────

    /// Exchange credentials for a token and log in as their username.
    ///
    /// If the session logged in or out while the login request was in
    /// flight, the token is dropped and [`CoreError::StaleSession`] is
    /// returned.
    pub async fn sign_in(&self, credentials: Credentials) -> Result<Arc<SessionSnapshot>, CoreError> {
        let user_id = credentials.username.clone().unwrap_or_default();
        let issued_under = self.api();
        let token = issued_under
            .login(LoginRequest {
                credentials: Some(credentials),
            })
            .await?;

        let api = Arc::new(RoomplaApi::new(
            self.anonymous
                .clone()
                .with_access_token(SecretString::from(token)),
        ));
        let applied = self.apply_if(|cur| {
            Arc::ptr_eq(&cur.api, &issued_under).then(|| SessionSnapshot {
                api,
                user_id,
                ..cur.clone()
            })
        });

        let Some(snap) = applied else {
            debug!("discarding login token from a replaced session");
            return Err(CoreError::StaleSession { operation: "sign_in" });
        };
        info!(user_id = %snap.user_id(), "session logged in");
        Ok(snap)
    }

    /// List rooms and refresh the room map.
    ///
    /// If the session logged in or out while the listing was in flight,
    /// the result is dropped and [`CoreError::StaleSession`] is returned.
    pub async fn sync_rooms(&self) -> Result<Arc<RoomMap>, CoreError> {
        let issued_under = self.api();
        let rooms = issued_under.list_rooms().await?;
        let map = Arc::new(RoomMap::from_rooms(rooms));

        let applied = self.apply_if(|cur| {
            Arc::ptr_eq(&cur.api, &issued_under).then(|| SessionSnapshot {
                rooms: Arc::clone(&map),
                ..cur.clone()
            })
        });

        if applied.is_none() {
            debug!("discarding room listing from a replaced session");
            return Err(CoreError::StaleSession {
                operation: "sync_rooms",
            });
        }
        debug!(rooms = map.len(), "room map refreshed");
        Ok(map)
    }

    /// Occupancies of `room`, optionally bounded by RFC 3339 instants.
    pub async fn occupancies(
        &self,
        room: impl Into<String>,
        start: Option<String>,
        end: Option<String>,
    ) -> Result<Vec<Occupancy>, CoreError> {
        let occupancies = self
            .api()
            .list_occupancies(ListOccupanciesRequest {
                room: Some(room.into()),
                start,
                end,
            })
            .await?;
        Ok(occupancies)
    }

    /// Book `room` for `range`.
    pub async fn book(&self, room: impl Into<String>, range: TimeRange) -> Result<Occupancy, CoreError> {
        ensure_hourly(&range)?;
        let occupancy = self
            .api()
            .put_occupancy(PutOccupancyRequest {
                room: Some(room.into()),
                time_range: Some(range),
            })
            .await?;
        Ok(occupancy)
    }

    /// Move occupancy `id` in `room` to `range`.
    pub async fn reschedule(
        &self,
        room: impl Into<String>,
        id: i64,
        range: TimeRange,
    ) -> Result<(), CoreError> {
        ensure_hourly(&range)?;
        self.api()
            .update_occupancy(UpdateOccupancyRequest {
                room: Some(room.into()),
                id: Some(id),
                time_range: Some(range),
            })
            .await?;
        Ok(())
    }

    pub async fn cancel(&self, room: impl Into<String>, id: i64) -> Result<(), CoreError> {
        self.api()
            .delete_occupancy(DeleteOccupancyRequest {
                room: Some(room.into()),
                id: Some(id),
            })
            .await?;
        Ok(())
    }
}

fn ensure_hourly(range: &TimeRange) -> Result<(), CoreError> {
    let (start, end) = range.bounds()?;
    if range.is_valid() {
        Ok(())
    } else {
        Err(CoreError::InvalidTimeRange {
            message: format!("{start} to {end} must be whole hours with start before end"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn room(id: Option<&str>) -> Room {
        Room {
            id: id.map(Into::into),
            max_occupancy: None,
        }
    }

    fn session() -> Session {
        Session::new("http://localhost:5050/roompla/v0")
    }

    #[test]
    fn starts_anonymous_and_empty() {
        let session = session();
        let snap = session.snapshot();
        assert_eq!(snap.user_id(), "");
        assert!(!snap.is_signed_in());
        assert!(snap.rooms().is_empty());
        assert!(snap.api().configuration().access_token().is_none());
    }

    #[test]
    fn refresh_rooms_skips_rooms_without_id() {
        let session = session();
        let map = session.refresh_rooms(vec![room(Some("A")), room(None), room(Some("B"))]);
        assert_eq!(map.len(), 2);
        assert!(map.contains("A") && map.contains("B"));
        assert_eq!(session.rooms().len(), 2);
    }

    #[test]
    fn login_then_logout_is_anonymous_again() {
        let session = session();
        session.login(SecretString::from("jwt".to_owned()), "u1");
        assert_eq!(session.user_id(), "u1");
        assert!(session.api().configuration().resolve_token().is_some());

        let snap = session.logout();
        assert_eq!(snap.user_id(), "");
        assert!(snap.api().configuration().authorization_header().unwrap().is_none());
    }

    #[test]
    fn login_replaces_gateway_and_keeps_rooms() {
        let session = session();
        session.refresh_rooms(vec![room(Some("A"))]);
        let before = session.snapshot();

        let after = session.login(SecretString::from("jwt".to_owned()), "u1");

        assert!(!Arc::ptr_eq(before.api(), after.api()));
        assert!(Arc::ptr_eq(before.rooms(), after.rooms()));
        // Old snapshots are untouched.
        assert_eq!(before.user_id(), "");
    }

    #[test]
    fn with_configuration_drops_token_and_keeps_base_path() {
        let config = Configuration::new("http://example.org/roompla/v0/").with_access_token("stale");
        let session = Session::with_configuration(config);
        assert_eq!(session.base_path(), "http://example.org/roompla/v0");
        assert!(session.api().configuration().access_token().is_none());
    }

    #[test]
    fn subscribers_see_every_mutation() {
        let session = session();
        let mut stream = session.subscribe();
        assert_eq!(stream.current().user_id(), "");

        session.login(SecretString::from("jwt".to_owned()), "u1");
        let snap = tokio_test::block_on(stream.changed()).unwrap();
        assert_eq!(snap.user_id(), "u1");

        session.refresh_rooms(vec![room(Some("A"))]);
        assert_eq!(stream.latest().rooms().len(), 1);
    }

    #[test]
    fn concurrent_mutations_publish_the_stored_snapshot() {
        let session = session();
        let subscriber = session.subscribe();

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let session = &session;
                scope.spawn(move || {
                    for n in 0..200 {
                        if n % 2 == 0 {
                            session.login(SecretString::from(format!("jwt-{worker}-{n}")), "u");
                        } else {
                            session.refresh_rooms(vec![room(Some("A"))]);
                        }
                    }
                });
            }
        });

        assert!(Arc::ptr_eq(&subscriber.latest(), &session.snapshot()));
    }

    #[test]
    fn hourly_check_rejects_misaligned_ranges() {
        let ok = TimeRange::new("2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z");
        assert!(ensure_hourly(&ok).is_ok());

        let half = TimeRange::new("2024-01-01T09:30:00Z", "2024-01-01T10:00:00Z");
        assert!(matches!(ensure_hourly(&half), Err(CoreError::InvalidTimeRange { .. })));

        let backwards = TimeRange::new("2024-01-01T10:00:00Z", "2024-01-01T09:00:00Z");
        assert!(matches!(ensure_hourly(&backwards), Err(CoreError::InvalidTimeRange { .. })));

        let garbage = TimeRange::new("soon", "later");
        assert!(matches!(ensure_hourly(&garbage), Err(CoreError::InvalidTimeRange { .. })));
    }
}
