//! The timeline: one room's ordered node store, cross-reference
//! index, and batch insertion orchestration.

use std::collections::HashMap;

use shared::config::TimelineConfig;
use shared::models::RoomEvent;
use tracing::{debug, instrument, trace};

use crate::gaps::refresh_gap_headers;
use crate::grouping::insert_event_grouped;
use crate::node::{DisplayNode, EventNode};
use crate::placement::{SearchOrigin, find_event_before};
use crate::store::{NodeHandle, OrderedNodeStore};
use crate::viewport::ViewportAnchor;

/// Counters and the viewport anchor produced by one batch insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    /// Events placed into the store.
    pub inserted: usize,

    /// Mutating events applied to an already-displayed event.
    pub annotated: usize,

    /// Mutating events dropped because their target is not in memory.
    pub dropped: usize,

    /// The viewport anchor captured before the insertion; the view
    /// collaborator scrolls this node back to the top.
    pub anchor: ViewportAnchor,
}

/// The ordered timeline of a single room.
///
/// Owns the node store, the event-id cross-reference index, and the
/// pagination cursor for requesting older history. All mutation
/// happens through [`Timeline::insert_batch`]; nodes are never
/// removed, so every handle handed out stays valid for the life of
/// the timeline.
#[derive(Debug)]
pub struct Timeline {
    store: OrderedNodeStore<DisplayNode>,
    index: HashMap<String, NodeHandle>,
    prev_batch: Option<String>,
    viewport_top: Option<NodeHandle>,
    config: TimelineConfig,
}

impl Timeline {
    /// Creates an empty timeline with the given engine settings.
    #[must_use]
    pub fn new(config: TimelineConfig) -> Self {
        Self {
            store: OrderedNodeStore::new(),
            index: HashMap::new(),
            prev_batch: None,
            viewport_top: None,
            config,
        }
    }

    /// Borrows the ordered node store for traversal and rendering.
    #[must_use]
    pub const fn store(&self) -> &OrderedNodeStore<DisplayNode> {
        &self.store
    }

    /// The engine settings this timeline runs with.
    #[must_use]
    pub const fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// The cursor for requesting the history page older than anything
    /// retrieved so far, or `None` before the first fetch.
    #[must_use]
    pub fn prev_batch(&self) -> Option<&str> {
        self.prev_batch.as_deref()
    }

    /// Records the pagination cursor returned by a history fetch.
    pub fn set_prev_batch(&mut self, cursor: Option<String>) {
        self.prev_batch = cursor;
    }

    /// Looks up the node displaying the event with `event_id`.
    #[must_use]
    pub fn node_for_event(&self, event_id: &str) -> Option<NodeHandle> {
        self.index.get(event_id).copied()
    }

    /// Reports which node currently sits at the top of the view, so
    /// the next batch insertion can anchor to it.
    pub fn set_viewport_top(&mut self, top: Option<NodeHandle>) {
        self.viewport_top = top;
    }

    /// Drains the handles of nodes invalidated since the last drain,
    /// in store order, for the renderer to repaint.
    pub fn take_dirty(&mut self) -> Vec<NodeHandle> {
        self.store.take_dirty()
    }

    /// Inserts a batch of events.
    ///
    /// `events` must be in oldest-first processing order; callers
    /// reverse backwards-paginated pages before handing them over.
    /// Non-mutating events are placed chronologically and grouped;
    /// mutating events are routed to their target via the
    /// cross-reference index. One gap header pass runs afterwards:
    /// over the whole store for live batches, or over just the newly
    /// prepended prefix for historical ones.
    #[instrument(skip(self, events), fields(batch_len = events.len(), is_historical))]
    pub fn insert_batch(&mut self, events: Vec<RoomEvent>, is_historical: bool) -> BatchOutcome {
        let anchor = ViewportAnchor::capture(self.viewport_top);
        // The bound must be an event node: prepended events can land
        // under a reused leading sender header, and the pass only
        // terminates once it has processed the bound pair's later
        // event.
        let previous_first = if is_historical {
            self.first_event_node()
        } else {
            None
        };
        let origin = if is_historical {
            SearchOrigin::Oldest
        } else {
            SearchOrigin::Newest
        };

        let mut outcome = BatchOutcome {
            anchor,
            ..BatchOutcome::default()
        };
        for event in events {
            if event.is_annotation() {
                if self.apply_annotation(event) {
                    outcome.annotated += 1;
                } else {
                    outcome.dropped += 1;
                }
            } else {
                self.insert_event(event, origin);
                outcome.inserted += 1;
            }
        }

        // Historical pages only need the prepended prefix checked
        // against its new neighbour; live events can land anywhere.
        refresh_gap_headers(&mut self.store, &self.config, None, previous_first);

        trace!(
            inserted = outcome.inserted,
            annotated = outcome.annotated,
            dropped = outcome.dropped,
            "batch applied"
        );
        outcome
    }

    /// Places one event into the store and indexes it.
    fn insert_event(&mut self, event: RoomEvent, origin: SearchOrigin) -> NodeHandle {
        let node = EventNode::from(event);
        let event_id = node.id.clone();
        let anchor = find_event_before(&self.store, node.timestamp_ms, origin);
        let handle = insert_event_grouped(
            &mut self.store,
            node,
            anchor,
            self.config.group_by_sender,
            self.config.gap_threshold_ms(),
        );
        self.index.insert(event_id, handle);
        handle
    }

    /// The first event node in the store, skipping leading headers.
    fn first_event_node(&self) -> Option<NodeHandle> {
        let mut cursor = self.store.first();
        while let Some(handle) = cursor {
            if self.store.data(handle).is_event() {
                return Some(handle);
            }
            cursor = self.store.next(handle);
        }
        None
    }

    /// Applies a mutating event to the node it references. Returns
    /// `false` when the referenced event is not in memory, in which
    /// case the event is discarded. Accepted data loss, not an error.
    fn apply_annotation(&mut self, event: RoomEvent) -> bool {
        let Some(target_id) = event.relates_to.as_deref() else {
            return false;
        };
        let Some(handle) = self.index.get(target_id).copied() else {
            debug!(
                event_id = %event.event_id,
                target_id,
                "dropping annotation referencing an event not in memory"
            );
            return false;
        };
        let Some(target) = self.store.data_mut(handle).as_event_mut() else {
            return false;
        };
        target.annotations.push(event);
        self.store.invalidate(handle);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(id: &str, sender: &str, ts: i64) -> RoomEvent {
        RoomEvent {
            event_id: id.to_string(),
            event_type: "m.room.message".to_string(),
            sender_id: sender.to_string(),
            timestamp_ms: ts,
            content: json!({"body": format!("message {id}")}),
            relates_to: None,
        }
    }

    fn reaction(id: &str, sender: &str, ts: i64, target: &str) -> RoomEvent {
        RoomEvent {
            event_id: id.to_string(),
            event_type: "m.reaction".to_string(),
            sender_id: sender.to_string(),
            timestamp_ms: ts,
            content: json!({"key": "👍"}),
            relates_to: Some(target.to_string()),
        }
    }

    fn timeline() -> Timeline {
        Timeline::new(TimelineConfig::default())
    }

    fn shape(timeline: &Timeline) -> Vec<String> {
        timeline
            .store()
            .iter()
            .map(|(_, node)| match node {
                DisplayNode::Event(event) => format!("E({},{})", event.sender_id, event.timestamp_ms),
                DisplayNode::SenderHeader { sender_id } => format!("H({sender_id})"),
                DisplayNode::TimeHeader { shows_date, .. } => {
                    if *shows_date {
                        "D".to_string()
                    } else {
                        "T".to_string()
                    }
                }
            })
            .collect()
    }

    fn event_timestamps(timeline: &Timeline) -> Vec<i64> {
        timeline
            .store()
            .iter()
            .filter_map(|(_, node)| node.timestamp_ms())
            .collect()
    }

    /// Asserts the three structural invariants over the whole store.
    fn assert_invariants(timeline: &Timeline) {
        let config = timeline.config().clone();
        let mut previous: Option<(i64, String)> = None;
        let mut run_sender: Option<String> = None;

        for (handle, node) in timeline.store() {
            match node {
                DisplayNode::Event(event) => {
                    if let Some((previous_ts, _)) = &previous {
                        assert!(
                            event.timestamp_ms >= *previous_ts,
                            "ordering violated at {handle:?}"
                        );
                        let gap = event.timestamp_ms - previous_ts;
                        if gap >= config.gap_threshold_ms() {
                            // A time header must sit somewhere in the
                            // slot between the pair.
                            let mut cursor = timeline.store().prev(handle);
                            let mut found = false;
                            while let Some(between) = cursor {
                                if timeline.store().data(between).is_event() {
                                    break;
                                }
                                if timeline.store().data(between).is_time_header() {
                                    found = true;
                                }
                                cursor = timeline.store().prev(between);
                            }
                            assert!(found, "missing gap header before {handle:?}");
                        }
                    }
                    assert_eq!(
                        run_sender.as_deref(),
                        Some(event.sender_id.as_str()),
                        "event at {handle:?} not covered by its sender header"
                    );
                    previous = Some((event.timestamp_ms, event.sender_id.clone()));
                }
                DisplayNode::SenderHeader { sender_id } => {
                    // Mid-run insertions can leave two adjacent runs
                    // of the same sender, each with its own header, so
                    // only coverage is checked, not header minimality.
                    run_sender = Some(sender_id.clone());
                }
                DisplayNode::TimeHeader { .. } => {}
            }
        }
    }

    #[test]
    fn test_live_batch_groups_by_sender() {
        let mut timeline = timeline();
        let outcome = timeline.insert_batch(
            vec![
                message("$1", "a", 100_000),
                message("$2", "a", 105_000),
                message("$3", "b", 110_000),
            ],
            false,
        );

        assert_eq!(outcome.inserted, 3);
        assert_eq!(
            shape(&timeline),
            vec![
                "H(a)",
                "E(a,100000)",
                "E(a,105000)",
                "H(b)",
                "E(b,110000)"
            ]
        );
        assert_invariants(&timeline);
    }

    #[test]
    fn test_gap_and_sender_flip_after_quiet_period() {
        let mut timeline = timeline();
        timeline.insert_batch(
            vec![
                message("$1", "a", 100_000),
                message("$2", "a", 105_000),
                message("$3", "b", 110_000),
            ],
            false,
        );
        // 690s after the b event: gap header plus a fresh a header.
        timeline.insert_batch(vec![message("$4", "a", 800_000)], false);

        assert_eq!(
            shape(&timeline),
            vec![
                "H(a)",
                "E(a,100000)",
                "E(a,105000)",
                "H(b)",
                "E(b,110000)",
                "T",
                "H(a)",
                "E(a,800000)"
            ]
        );
        assert_invariants(&timeline);
    }

    #[test]
    fn test_historical_batch_prepends_with_anchor_preserved() {
        let mut timeline = timeline();
        timeline.insert_batch(
            vec![
                message("$1", "a", 100_000),
                message("$2", "a", 105_000),
                message("$3", "b", 110_000),
            ],
            false,
        );
        let anchored = timeline
            .node_for_event("$1")
            .expect("inserted event is indexed");
        timeline.set_viewport_top(Some(anchored));

        let outcome = timeline.insert_batch(vec![message("$0", "c", 10_000)], true);

        assert_eq!(outcome.anchor.top(), Some(anchored));
        assert_eq!(
            timeline.store().data(anchored).timestamp_ms(),
            Some(100_000),
            "anchored node must still name the same event"
        );
        let rendered = shape(&timeline);
        assert_eq!(rendered[0], "H(c)");
        assert_eq!(rendered[1], "E(c,10000)");
        assert_invariants(&timeline);
    }

    #[test]
    fn test_interleaved_batches_keep_order_non_decreasing() {
        let mut timeline = timeline();
        timeline.insert_batch(
            vec![message("$5", "a", 500_000), message("$6", "b", 600_000)],
            false,
        );
        timeline.insert_batch(
            vec![message("$1", "c", 100_000), message("$2", "a", 200_000)],
            true,
        );
        timeline.insert_batch(vec![message("$7", "a", 650_000)], false);
        timeline.insert_batch(vec![message("$3", "b", 300_000)], true);

        let timestamps = event_timestamps(&timeline);
        let mut sorted = timestamps.clone();
        sorted.sort_unstable();
        assert_eq!(timestamps, sorted);
        assert_eq!(timestamps.len(), 6);
        assert_invariants(&timeline);
    }

    #[test]
    fn test_equal_timestamps_keep_arrival_order() {
        let mut timeline = timeline();
        timeline.insert_batch(vec![message("$1", "a", 100_000)], false);
        timeline.insert_batch(vec![message("$2", "b", 100_000)], false);

        let order: Vec<String> = timeline
            .store()
            .iter()
            .filter_map(|(_, node)| node.as_event().map(|event| event.id.clone()))
            .collect();
        assert_eq!(order, vec!["$1", "$2"]);
        assert_invariants(&timeline);
    }

    #[test]
    fn test_annotation_invalidates_target_exactly_once() {
        let mut timeline = timeline();
        timeline.insert_batch(vec![message("$1", "a", 100_000)], false);
        assert!(timeline.take_dirty().is_empty());

        let outcome =
            timeline.insert_batch(vec![reaction("$r", "b", 101_000, "$1")], false);
        assert_eq!(outcome.annotated, 1);
        assert_eq!(outcome.inserted, 0);

        let target = timeline.node_for_event("$1").expect("indexed");
        let dirty = timeline.take_dirty();
        assert_eq!(dirty, vec![target]);

        let annotations = &timeline
            .store()
            .data(target)
            .as_event()
            .expect("event node")
            .annotations;
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].event_id, "$r");
    }

    #[test]
    fn test_annotation_for_unknown_target_is_dropped() {
        let mut timeline = timeline();
        timeline.insert_batch(vec![message("$1", "a", 100_000)], false);
        let before = shape(&timeline);

        let outcome =
            timeline.insert_batch(vec![reaction("$r", "b", 101_000, "$missing")], false);
        assert_eq!(outcome.dropped, 1);
        assert_eq!(outcome.annotated, 0);
        assert_eq!(shape(&timeline), before);
        assert!(timeline.take_dirty().is_empty());
    }

    #[test]
    fn test_historical_prepend_keeps_suffix_headers() {
        let mut timeline = timeline();
        timeline.insert_batch(
            vec![message("$3", "a", 300_000), message("$4", "b", 400_000)],
            false,
        );
        // Page of strictly older events, reversed to oldest-first by
        // the room before insertion.
        timeline.insert_batch(
            vec![message("$1", "b", 100_000), message("$2", "b", 150_000)],
            true,
        );

        assert_eq!(
            shape(&timeline),
            vec![
                "H(b)",
                "E(b,100000)",
                "E(b,150000)",
                "H(a)",
                "E(a,300000)",
                "H(b)",
                "E(b,400000)"
            ]
        );
        assert_invariants(&timeline);
    }

    #[test]
    fn test_historical_prepend_under_reused_header_gets_gap_header() {
        let mut timeline = timeline();
        timeline.insert_batch(vec![message("$2", "a", 1_000_000)], false);
        // Same sender: the prepended event slots under the existing
        // leading header, 990s before its neighbour.
        timeline.insert_batch(vec![message("$1", "a", 10_000)], true);

        assert_eq!(
            shape(&timeline),
            vec!["H(a)", "E(a,10000)", "T", "E(a,1000000)"]
        );
        assert_invariants(&timeline);
    }

    #[test]
    fn test_out_of_order_live_event_keeps_gap_header_fresh() {
        let mut timeline = timeline();
        timeline.insert_batch(
            vec![message("$1", "a", 100_000), message("$2", "b", 800_000)],
            false,
        );
        // Lands inside the 700s gap, 50s before the b event: the
        // header moves with the pair that still spans the threshold
        // and is refreshed to the new later endpoint.
        timeline.insert_batch(vec![message("$3", "c", 750_000)], false);

        assert_eq!(
            shape(&timeline),
            vec![
                "H(a)",
                "E(a,100000)",
                "T",
                "H(c)",
                "E(c,750000)",
                "H(b)",
                "E(b,800000)"
            ]
        );
        let header_seconds: Vec<i64> = timeline
            .store()
            .iter()
            .filter_map(|(_, node)| match node {
                DisplayNode::TimeHeader { timestamp_s, .. } => Some(*timestamp_s),
                _ => None,
            })
            .collect();
        assert_eq!(header_seconds, vec![750]);
        assert_invariants(&timeline);
    }

    #[test]
    fn test_grouping_disabled_by_config() {
        let config = TimelineConfig {
            group_by_sender: false,
            ..TimelineConfig::default()
        };
        let mut timeline = Timeline::new(config);
        timeline.insert_batch(
            vec![message("$1", "a", 100_000), message("$2", "b", 105_000)],
            false,
        );
        assert_eq!(shape(&timeline), vec!["E(a,100000)", "E(b,105000)"]);
    }

    #[test]
    fn test_prev_batch_cursor_round_trip() {
        let mut timeline = timeline();
        assert_eq!(timeline.prev_batch(), None);
        timeline.set_prev_batch(Some("token-1".to_string()));
        assert_eq!(timeline.prev_batch(), Some("token-1"));
    }
}
