use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single room event in its associated-array wire form.
///
/// The `content` payload is opaque to the timeline engine; the
/// formatting collaborator is responsible for turning it into visual
/// text. Mutating events (reactions and other annotations) carry the
/// identifier of the event they reference in `relates_to`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomEvent {
    /// Server-issued unique identifier for the event.
    pub event_id: String,

    /// Wire event type, e.g. `m.room.message` or `m.reaction`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Identifier of the user who sent the event.
    pub sender_id: String,

    /// Origin timestamp in milliseconds since the Unix epoch.
    pub timestamp_ms: i64,

    /// Opaque event content, passed through to the renderer.
    pub content: Value,

    /// Identifier of the event this one mutates, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relates_to: Option<String>,
}

impl RoomEvent {
    /// Returns `true` if this event mutates another event rather than
    /// occupying its own place in the timeline.
    #[must_use]
    pub const fn is_annotation(&self) -> bool {
        self.relates_to.is_some()
    }
}

/// The temporal direction of a history page request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Older events, paging away from the live edge.
    Backwards,
    /// Newer events, paging toward the live edge.
    Forwards,
}

impl Direction {
    /// The single-letter wire form used in pagination requests.
    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Backwards => "b",
            Self::Forwards => "f",
        }
    }
}

impl TryFrom<&str> for Direction {
    type Error = &'static str;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "b" => Ok(Self::Backwards),
            "f" => Ok(Self::Forwards),
            _ => Err("invalid pagination direction"),
        }
    }
}

/// A page of events returned by the protocol collaborator.
///
/// For `Direction::Backwards` pages the server returns events
/// newest-first; the timeline reverses them before insertion so that
/// processing order is always oldest-first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventBatch {
    /// The events in this page, in server wire order.
    pub events: Vec<RoomEvent>,

    /// Pagination cursor for requesting the page beyond this one, or
    /// `None` when the room's history is exhausted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    /// The direction this page was fetched in.
    pub direction: Direction,
}
