//! Core value types shared by every warpzone crate.
//!
//! Nothing here knows about areas, countdowns, or ticks. These are the
//! nouns the lobby core speaks in when it talks to the outside world.

// Serde is Rust's standard library for **ser**ializing and
// **de**serializing data. `Serialize` means "I can be turned INTO bytes",
// `Deserialize` means "I can be created FROM bytes".
use serde::{Deserialize, Serialize};

use std::fmt;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique handle for a participant.
///
/// A "newtype wrapper" around `u64`: you can't accidentally pass an
/// arbitrary number where a participant is expected, and signatures like
/// `fn request_leave(player: PlayerId)` document themselves.
///
/// `#[serde(transparent)]` serializes `PlayerId(42)` as plain `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

/// `tracing::info!(%player_id, "entered")` prints "P-42".
impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The unique key of a waiting area: its name.
///
/// Areas are discovered once at startup from a static scan, so the name
/// is the identity. Cloning is a string copy; areas are few and cloning
/// only happens on registration, logging, and notification addressing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaId(pub String);

impl AreaId {
    /// Creates an area id from anything string-like.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The area's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AreaId {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for AreaId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A position in world space.
///
/// The core never does geometry. It only needs to hand a destination to
/// whoever owns participant positions, lifted clear of the floor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Returns this position raised by `height` along the up (+y) axis.
    pub fn lifted(self, height: f32) -> Self {
        Self {
            y: self.y + height,
            ..self
        }
    }
}

// ---------------------------------------------------------------------------
// Recipient: who should receive a notification?
// ---------------------------------------------------------------------------

/// Addresses an outbound notification.
///
/// Per-participant UI (join prompt, leave button, arrival effect) goes to
/// one [`Recipient::Player`]. Area-wide cues (billboard text, countdown
/// pulses) go to the area's display via [`Recipient::Area`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recipient {
    /// One participant's client.
    Player(PlayerId),

    /// The visual/audio collaborator attached to an area.
    Area(AreaId),
}

// ---------------------------------------------------------------------------
// Notification: outbound intents
// ---------------------------------------------------------------------------

/// Intents the lobby core emits for its UI, audio, and visual
/// collaborators.
///
/// The core never owns an effect's lifetime. It says *what* should be
/// shown; collaborators decide how and for how long.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
/// `{ "type": "TickPulse", "area": "Alpha", "remaining_secs": 3 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    /// Sent to the first entrant when an area goes from empty to occupied.
    ShowJoinUi { area: AreaId },

    /// The participant may now leave a forming group.
    ShowLeaveOption,

    /// The participant's leave button should disappear.
    HideLeaveOption,

    /// Billboard refresh.
    ///
    /// `remaining_secs` is the ceiling of the countdown's remaining time,
    /// or `None` while the area is idle and only shows its waiting count.
    /// `capacity` is the effective capacity: the captured party size while
    /// running, the area's default otherwise.
    DisplayUpdate {
        area: AreaId,
        remaining_secs: Option<u32>,
        count: usize,
        capacity: usize,
    },

    /// Fired once per countdown, a few seconds before relocation.
    PreTeleportEffect { area: AreaId },

    /// Fired once per distinct whole second in the final stretch.
    TickPulse { area: AreaId, remaining_secs: u32 },

    /// A participant arrived at its relocation destination.
    ArrivalEffect { player: PlayerId },
}

// ---------------------------------------------------------------------------
// ClientRequest: inbound
// ---------------------------------------------------------------------------

/// Requests a participant's client can make.
///
/// The sender's identity comes from whoever delivered the bytes, never
/// from the payload. It is used only for addressing and logging, not for
/// authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientRequest {
    /// "Get me out of here." Moves the sender to the fallback location.
    Leave,

    /// "We're ready, start the countdown for this area."
    ///
    /// `party_size` is untrusted client input.
    StartCountdown { area: AreaId, party_size: usize },
}

impl ClientRequest {
    /// Rejects requests that decode fine but can never be valid.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::Leave => Ok(()),
            Self::StartCountdown { area, .. } if area.as_str().is_empty() => Err(
                ProtocolError::InvalidRequest("area name must not be empty".into()),
            ),
            Self::StartCountdown { .. } => Ok(()),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Client SDKs parse these shapes by hand, so the serde attributes
    //! are part of the contract.

    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_area_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&AreaId::new("Alpha")).unwrap();
        assert_eq!(json, "\"Alpha\"");
        assert_eq!(AreaId::from("Alpha").to_string(), "Alpha");
    }

    #[test]
    fn test_vec3_lifted_only_moves_up() {
        let p = Vec3::new(1.0, 2.0, 3.0).lifted(3.0);
        assert_eq!(p, Vec3::new(1.0, 5.0, 3.0));
    }

    #[test]
    fn test_display_update_json_format() {
        let n = Notification::DisplayUpdate {
            area: "Alpha".into(),
            remaining_secs: Some(12),
            count: 3,
            capacity: 3,
        };
        let json: serde_json::Value = serde_json::to_value(&n).unwrap();

        assert_eq!(json["type"], "DisplayUpdate");
        assert_eq!(json["area"], "Alpha");
        assert_eq!(json["remaining_secs"], 12);
        assert_eq!(json["count"], 3);
    }

    #[test]
    fn test_idle_display_update_has_null_remaining() {
        let n = Notification::DisplayUpdate {
            area: "Alpha".into(),
            remaining_secs: None,
            count: 0,
            capacity: 4,
        };
        let json: serde_json::Value = serde_json::to_value(&n).unwrap();
        assert!(json["remaining_secs"].is_null());
    }

    #[test]
    fn test_unit_notification_is_just_a_tag() {
        let json: serde_json::Value =
            serde_json::to_value(&Notification::ShowLeaveOption).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "ShowLeaveOption" }));
    }

    #[test]
    fn test_start_countdown_parses_from_client_json() {
        let req: ClientRequest = serde_json::from_str(
            r#"{ "type": "StartCountdown", "area": "Alpha", "party_size": 3 }"#,
        )
        .unwrap();
        assert_eq!(
            req,
            ClientRequest::StartCountdown {
                area: "Alpha".into(),
                party_size: 3
            }
        );
    }

    #[test]
    fn test_negative_party_size_is_a_decode_error() {
        let req = serde_json::from_str::<ClientRequest>(
            r#"{ "type": "StartCountdown", "area": "Alpha", "party_size": -1 }"#,
        );
        assert!(req.is_err());
    }

    #[test]
    fn test_validate_rejects_empty_area_name() {
        let req = ClientRequest::StartCountdown {
            area: AreaId::new(""),
            party_size: 2,
        };
        assert!(matches!(
            req.validate(),
            Err(ProtocolError::InvalidRequest(_))
        ));
        assert!(ClientRequest::Leave.validate().is_ok());
    }
}
