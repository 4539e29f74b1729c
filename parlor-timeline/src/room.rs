//! Room state: one timeline, the member display-name map, and the
//! history-retrieval orchestration.

use std::collections::HashMap;

use async_trait::async_trait;
use shared::config::TimelineConfig;
use shared::models::{Direction, EventBatch, HistoryError, RoomEvent, RoomMember};
use tracing::{debug, instrument};

use crate::timeline::{BatchOutcome, Timeline};

/// The protocol collaborator seam for retrieving older history pages.
///
/// Implemented over HTTP by the `client` crate; tests substitute a
/// stub.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetches the page of events older than `from` (or the newest
    /// page when `from` is `None`), at most `limit` events.
    ///
    /// # Errors
    /// Returns [`HistoryError::FetchFailed`] when the request fails or
    /// times out.
    async fn fetch_older(
        &self,
        room_id: &str,
        from: Option<&str>,
        limit: u32,
    ) -> Result<EventBatch, HistoryError>;
}

/// Result of a [`Room::fetch_older`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was retrieved and inserted.
    Fetched(BatchOutcome),
    /// Another fetch was already outstanding; this request was
    /// silently ignored, not queued.
    AlreadyInFlight,
}

/// A single chat room: its timeline, known members, and the
/// outstanding-history-request flag that serialises retro-fetches.
#[derive(Debug)]
pub struct Room {
    room_id: String,
    timeline: Timeline,
    members: HashMap<String, RoomMember>,
    history_request_outstanding: bool,
}

impl Room {
    /// Creates a room with an empty timeline.
    pub fn new(room_id: impl Into<String>, config: TimelineConfig) -> Self {
        Self {
            room_id: room_id.into(),
            timeline: Timeline::new(config),
            members: HashMap::new(),
            history_request_outstanding: false,
        }
    }

    /// The room identifier.
    #[must_use]
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Borrows the room's timeline.
    #[must_use]
    pub const fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Mutably borrows the room's timeline, e.g. for the view
    /// collaborator to report its anchor.
    pub const fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    /// Records or updates a member's display-name mapping.
    pub fn upsert_member(&mut self, member: RoomMember) {
        self.members.insert(member.user_id.clone(), member);
    }

    /// The name to display for `user_id`: the member's display name
    /// when known, the raw id otherwise.
    #[must_use]
    pub fn member_name<'a>(&'a self, user_id: &'a str) -> &'a str {
        self.members
            .get(user_id)
            .map_or(user_id, RoomMember::visible_name)
    }

    /// Whether a history fetch is currently outstanding.
    #[must_use]
    pub const fn is_fetching_history(&self) -> bool {
        self.history_request_outstanding
    }

    /// Applies a batch of live events, assumed strictly serialised and
    /// chronologically ordered by the upstream sync mechanism.
    pub fn handle_live_events(&mut self, events: Vec<RoomEvent>) -> BatchOutcome {
        self.timeline.insert_batch(events, false)
    }

    /// Requests and inserts the next page of older history.
    ///
    /// At most one fetch may be outstanding per room; a second request
    /// while one is in flight returns
    /// [`FetchOutcome::AlreadyInFlight`] without touching the source.
    /// A failed fetch clears the flag and inserts nothing.
    ///
    /// # Errors
    /// Propagates [`HistoryError::FetchFailed`] from the source.
    #[instrument(skip(self, source), fields(room_id = %self.room_id))]
    pub async fn fetch_older(
        &mut self,
        source: &dyn HistorySource,
    ) -> Result<FetchOutcome, HistoryError> {
        if self.history_request_outstanding {
            debug!("history fetch already outstanding; ignoring request");
            return Ok(FetchOutcome::AlreadyInFlight);
        }

        self.history_request_outstanding = true;
        let result = source
            .fetch_older(
                &self.room_id,
                self.timeline.prev_batch(),
                self.timeline.config().history_page_size,
            )
            .await;
        self.history_request_outstanding = false;

        let batch = result?;
        self.timeline.set_prev_batch(batch.end.clone());

        let mut events = batch.events;
        if batch.direction == Direction::Backwards {
            // Backwards pages arrive newest-first; processing order is
            // always oldest-first.
            events.reverse();
        }
        Ok(FetchOutcome::Fetched(self.timeline.insert_batch(events, true)))
    }

    #[cfg(test)]
    pub(crate) const fn set_history_request_outstanding(&mut self, outstanding: bool) {
        self.history_request_outstanding = outstanding;
    }
}
