//! Display node variants and the pure classifier layer over them.

use serde_json::Value;
use shared::models::RoomEvent;

/// A chat event occupying its own row in the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventNode {
    /// Server-issued event identifier, the key of the cross-reference
    /// index.
    pub id: String,

    /// Identifier of the sending user.
    pub sender_id: String,

    /// Origin timestamp in milliseconds since the Unix epoch.
    pub timestamp_ms: i64,

    /// Opaque content payload, rendered by the formatting
    /// collaborator.
    pub payload: Value,

    /// Mutating events that reference this one (reactions and the
    /// like), in arrival order.
    pub annotations: Vec<RoomEvent>,
}

impl From<RoomEvent> for EventNode {
    fn from(event: RoomEvent) -> Self {
        Self {
            id: event.event_id,
            sender_id: event.sender_id,
            timestamp_ms: event.timestamp_ms,
            payload: event.content,
            annotations: Vec::new(),
        }
    }
}

/// One visual row unit in the ordered timeline.
///
/// A closed union: the renderer and the classifier both match it
/// exhaustively, so adding a variant flags every match site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayNode {
    /// A chat event.
    Event(EventNode),

    /// Marks the start of a run of consecutive events from one
    /// sender.
    SenderHeader {
        /// The sender whose run this header introduces.
        sender_id: String,
    },

    /// Marks a temporal gap between two adjacent events, or a date
    /// change.
    TimeHeader {
        /// Timestamp of the later event of the pair, in seconds.
        timestamp_s: i64,
        /// `true` when the two events fall on different calendar
        /// dates.
        shows_date: bool,
    },
}

impl DisplayNode {
    /// Returns `true` for the [`DisplayNode::Event`] variant.
    #[must_use]
    pub const fn is_event(&self) -> bool {
        matches!(self, Self::Event(_))
    }

    /// Borrows the event node, if this is one.
    #[must_use]
    pub const fn as_event(&self) -> Option<&EventNode> {
        match self {
            Self::Event(event) => Some(event),
            Self::SenderHeader { .. } | Self::TimeHeader { .. } => None,
        }
    }

    /// Mutably borrows the event node, if this is one.
    pub fn as_event_mut(&mut self) -> Option<&mut EventNode> {
        match self {
            Self::Event(event) => Some(event),
            Self::SenderHeader { .. } | Self::TimeHeader { .. } => None,
        }
    }

    /// The comparison timestamp of an event node; headers have none.
    #[must_use]
    pub const fn timestamp_ms(&self) -> Option<i64> {
        match self {
            Self::Event(event) => Some(event.timestamp_ms),
            Self::SenderHeader { .. } | Self::TimeHeader { .. } => None,
        }
    }

    /// The sender identity this node carries: its own for events and
    /// sender headers, none for time headers.
    #[must_use]
    pub fn sender_id(&self) -> Option<&str> {
        match self {
            Self::Event(event) => Some(&event.sender_id),
            Self::SenderHeader { sender_id } => Some(sender_id),
            Self::TimeHeader { .. } => None,
        }
    }

    /// Returns `true` if this is a sender header for `sender`.
    #[must_use]
    pub fn is_sender_header_for(&self, sender: &str) -> bool {
        matches!(self, Self::SenderHeader { sender_id } if sender_id == sender)
    }

    /// Returns `true` for the [`DisplayNode::TimeHeader`] variant.
    #[must_use]
    pub const fn is_time_header(&self) -> bool {
        matches!(self, Self::TimeHeader { .. })
    }
}
