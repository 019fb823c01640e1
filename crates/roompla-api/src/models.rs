// Wire models for the roompla API
//
// Every field is optional on the wire and stays optional here: an absent
// key decodes to `None`, never to an empty string or zero. Wire names are
// spelled out per field rather than derived by a case-conversion rule.

use std::fmt;

use chrono::{DateTime, DurationRound, SecondsFormat, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::Error;

// ── Codec ───────────────────────────────────────────────────────────

/// Bidirectional mapping between an entity and its JSON representation.
///
/// `null` passes through both directions: it decodes to `None` and `None`
/// encodes to `null`.
pub trait Wire: Serialize + DeserializeOwned {
    fn from_wire(json: Value) -> Result<Option<Self>, Error> {
        if json.is_null() {
            return Ok(None);
        }
        match serde_json::from_value(json.clone()) {
            Ok(entity) => Ok(Some(entity)),
            Err(e) => Err(Error::Decode {
                message: e.to_string(),
                body: json.to_string(),
            }),
        }
    }

    fn to_wire(value: Option<&Self>) -> Value {
        // Entities only hold strings and integers, which always serialize.
        value.map_or(Value::Null, |v| {
            serde_json::to_value(v).expect("wire entities always serialize")
        })
    }
}

// ── Credentials ─────────────────────────────────────────────────────

/// Login credentials. Only ever sent, never cached.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "username", default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(
        rename = "password",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "expose_password",
        deserialize_with = "secret_password"
    )]
    pub password: Option<SecretString>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(SecretString::from(password.into())),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}

impl Wire for Credentials {}

#[allow(clippy::ref_option)]
fn expose_password<S: Serializer>(
    password: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match password {
        Some(p) => serializer.serialize_some(p.expose_secret()),
        None => serializer.serialize_none(),
    }
}

fn secret_password<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

// ── Room ────────────────────────────────────────────────────────────

/// A bookable room. Created and edited server-side only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// ID/name of the room.
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Maximum number of occupants at the same time.
    #[serde(rename = "max_occupancy", default, skip_serializing_if = "Option::is_none")]
    pub max_occupancy: Option<u32>,
}

impl Wire for Room {}

// ── TimeRange ───────────────────────────────────────────────────────

/// RFC 3339 start/end pair at hourly precision.
///
/// The strings are carried exactly as given; use [`TimeRange::hourly`] to
/// build one from timestamps that may have sub-hour parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(rename = "start", default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(rename = "end", default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl TimeRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    /// Truncate both bounds to the full hour and check `start < end`.
    pub fn hourly(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, Error> {
        let start = truncate_to_hour(start)?;
        let end = truncate_to_hour(end)?;
        if end <= start {
            return Err(Error::InvalidTimeRange {
                message: format!("end ({end}) is not after start ({start}) at hourly precision"),
            });
        }
        Ok(Self::new(format_bound(start), format_bound(end)))
    }

    /// Parse both bounds back into UTC timestamps.
    pub fn bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), Error> {
        Ok((parse_bound("start", self.start.as_deref())?, parse_bound("end", self.end.as_deref())?))
    }

    /// `true` when both bounds parse, sit on full hours and `start < end`.
    pub fn is_valid(&self) -> bool {
        self.bounds().is_ok_and(|(start, end)| {
            start < end && is_hour_aligned(start) && is_hour_aligned(end)
        })
    }
}

impl Wire for TimeRange {}

fn truncate_to_hour(t: DateTime<Utc>) -> Result<DateTime<Utc>, Error> {
    t.duration_trunc(TimeDelta::hours(1))
        .map_err(|e| Error::InvalidTimeRange {
            message: format!("cannot truncate {t} to the hour: {e}"),
        })
}

fn is_hour_aligned(t: DateTime<Utc>) -> bool {
    truncate_to_hour(t).is_ok_and(|truncated| truncated == t)
}

fn format_bound(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_bound(name: &str, raw: Option<&str>) -> Result<DateTime<Utc>, Error> {
    let raw = raw.ok_or_else(|| Error::InvalidTimeRange {
        message: format!("{name} is not set"),
    })?;
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::InvalidTimeRange {
            message: format!("{name} `{raw}` is not RFC 3339: {e}"),
        })
}

// ── Occupancy ───────────────────────────────────────────────────────

/// A booked interval for a room: inclusive start, exclusive end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    /// Server-assigned; absent before creation.
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "start", default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(rename = "end", default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// The ID of the room that is occupied.
    #[serde(rename = "room", default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    /// The ID of the user that occupies this room.
    #[serde(rename = "user_id", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "user_name", default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(rename = "user_contact", default, skip_serializing_if = "Option::is_none")]
    pub user_contact: Option<String>,
}

impl Occupancy {
    /// The occupied interval as a [`TimeRange`].
    pub fn time_range(&self) -> TimeRange {
        TimeRange {
            start: self.start.clone(),
            end: self.end.clone(),
        }
    }
}

impl Wire for Occupancy {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn full_occupancy() -> Occupancy {
        Occupancy {
            id: Some(7),
            start: Some("2024-01-01T09:00:00Z".into()),
            end: Some("2024-01-01T11:00:00Z".into()),
            room: Some("R1".into()),
            user_id: Some("u1".into()),
            user_name: Some("Ada".into()),
            user_contact: Some("ada@example.org".into()),
        }
    }

    #[test]
    fn occupancy_uses_underscore_wire_names() {
        let wire = Occupancy::to_wire(Some(&full_occupancy()));
        assert_eq!(
            wire,
            json!({
                "id": 7,
                "start": "2024-01-01T09:00:00Z",
                "end": "2024-01-01T11:00:00Z",
                "room": "R1",
                "user_id": "u1",
                "user_name": "Ada",
                "user_contact": "ada@example.org"
            })
        );
    }

    #[test]
    fn room_decodes_max_occupancy() {
        let room = Room::from_wire(json!({ "id": "A", "max_occupancy": 4 }))
            .unwrap()
            .unwrap();
        assert_eq!(room.id.as_deref(), Some("A"));
        assert_eq!(room.max_occupancy, Some(4));
    }

    #[test]
    fn absent_fields_stay_unset() {
        let occ = Occupancy::from_wire(json!({ "room": "R1" })).unwrap().unwrap();
        assert_eq!(occ.room.as_deref(), Some("R1"));
        assert_eq!(occ.id, None);
        assert_eq!(occ.user_id, None);
        assert_eq!(occ.user_contact, None);

        let room = Room::from_wire(json!({})).unwrap().unwrap();
        assert_eq!(room, Room::default());
    }

    #[test]
    fn explicit_null_field_is_unset() {
        let room = Room::from_wire(json!({ "id": null, "max_occupancy": 2 }))
            .unwrap()
            .unwrap();
        assert_eq!(room.id, None);
    }

    #[test]
    fn unset_fields_are_not_encoded() {
        let wire = TimeRange::to_wire(Some(&TimeRange {
            start: Some("2024-01-01T09:00:00Z".into()),
            end: None,
        }));
        assert_eq!(wire, json!({ "start": "2024-01-01T09:00:00Z" }));
    }

    #[test]
    fn null_passes_through() {
        assert!(Room::from_wire(Value::Null).unwrap().is_none());
        assert!(Occupancy::from_wire(Value::Null).unwrap().is_none());
        assert!(TimeRange::from_wire(Value::Null).unwrap().is_none());
        assert!(Credentials::from_wire(Value::Null).unwrap().is_none());

        assert_eq!(Room::to_wire(None), Value::Null);
        assert_eq!(Occupancy::to_wire(None), Value::Null);
        assert_eq!(TimeRange::to_wire(None), Value::Null);
        assert_eq!(Credentials::to_wire(None), Value::Null);
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let partial = Occupancy {
            id: None,
            user_name: None,
            ..full_occupancy()
        };
        for occ in [full_occupancy(), partial, Occupancy::default()] {
            let back = Occupancy::from_wire(Occupancy::to_wire(Some(&occ))).unwrap();
            assert_eq!(back, Some(occ));
        }

        for room in [
            Room { id: Some("A".into()), max_occupancy: Some(0) },
            Room { id: None, max_occupancy: Some(3) },
            Room::default(),
        ] {
            assert_eq!(Room::from_wire(Room::to_wire(Some(&room))).unwrap(), Some(room));
        }

        let range = TimeRange::new("2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z");
        assert_eq!(
            TimeRange::from_wire(TimeRange::to_wire(Some(&range))).unwrap(),
            Some(range)
        );
    }

    #[test]
    fn wrong_type_is_a_decode_error() {
        let err = Room::from_wire(json!({ "id": "A", "max_occupancy": "four" })).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }), "got {err:?}");

        let err = Room::from_wire(json!({ "max_occupancy": -1 })).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }), "got {err:?}");
    }

    #[test]
    fn credentials_encode_password_but_hide_it_in_debug() {
        let creds = Credentials::new("ada", "hunter2");
        assert_eq!(
            Credentials::to_wire(Some(&creds)),
            json!({ "username": "ada", "password": "hunter2" })
        );
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[test]
    fn hourly_truncates_sub_hour_parts() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 45, 12).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 11, 5, 0).unwrap();
        let range = TimeRange::hourly(start, end).unwrap();
        assert_eq!(range.start.as_deref(), Some("2024-01-01T09:00:00Z"));
        assert_eq!(range.end.as_deref(), Some("2024-01-01T11:00:00Z"));
        assert!(range.is_valid());
    }

    #[test]
    fn hourly_rejects_empty_range_after_truncation() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 10, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 9, 50, 0).unwrap();
        let err = TimeRange::hourly(start, end).unwrap_err();
        assert!(matches!(err, Error::InvalidTimeRange { .. }));
    }

    #[test]
    fn codec_keeps_sub_hour_strings_verbatim() {
        let raw = json!({ "start": "2024-01-01T09:30:00+01:00", "end": "2024-01-01T10:00:00Z" });
        let range = TimeRange::from_wire(raw.clone()).unwrap().unwrap();
        assert_eq!(range.start.as_deref(), Some("2024-01-01T09:30:00+01:00"));
        assert!(!range.is_valid());
        assert_eq!(TimeRange::to_wire(Some(&range)), raw);
    }
}
