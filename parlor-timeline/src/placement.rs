//! Chronological placement: finding where a new event belongs in the
//! ordered node store.

use crate::node::DisplayNode;
use crate::store::{NodeHandle, OrderedNodeStore};

/// Which end of the store a placement search starts from.
///
/// Most insertions are live events arriving in near-sorted order, so
/// searching backwards from the newest node usually terminates in one
/// or two steps. Historical pages are older than everything shown and
/// should search forwards from the oldest node instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrigin {
    /// Start at the last node and walk backwards (live default).
    Newest,
    /// Start at the first node and walk forwards (historical pages).
    Oldest,
}

/// Finds the last existing event node whose timestamp is `<=`
/// `timestamp_ms`, i.e. the node the new event belongs immediately
/// after.
///
/// Header nodes are skipped; the result is always an event handle.
/// `None` means no such event exists and the new event belongs at the
/// front of the store.
///
/// Tie-break: an equal timestamp compares as "before", so a new event
/// lands after existing events with the same timestamp, preserving
/// arrival order among equal stamps.
#[must_use]
pub fn find_event_before(
    store: &OrderedNodeStore<DisplayNode>,
    timestamp_ms: i64,
    origin: SearchOrigin,
) -> Option<NodeHandle> {
    match origin {
        SearchOrigin::Newest => search_backwards(store, timestamp_ms),
        SearchOrigin::Oldest => search_forwards(store, timestamp_ms),
    }
}

fn search_backwards(
    store: &OrderedNodeStore<DisplayNode>,
    timestamp_ms: i64,
) -> Option<NodeHandle> {
    let mut cursor = store.last();
    while let Some(handle) = cursor {
        if let Some(node_ts) = store.data(handle).timestamp_ms()
            && node_ts <= timestamp_ms
        {
            return Some(handle);
        }
        cursor = store.prev(handle);
    }
    None
}

fn search_forwards(
    store: &OrderedNodeStore<DisplayNode>,
    timestamp_ms: i64,
) -> Option<NodeHandle> {
    let mut best = None;
    let mut cursor = store.first();
    while let Some(handle) = cursor {
        if let Some(node_ts) = store.data(handle).timestamp_ms() {
            if node_ts > timestamp_ms {
                break;
            }
            best = Some(handle);
        }
        cursor = store.next(handle);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::EventNode;
    use serde_json::json;
    use test_case::test_case;

    fn event(id: &str, ts: i64) -> DisplayNode {
        DisplayNode::Event(EventNode {
            id: id.to_string(),
            sender_id: "@alice:example.org".to_string(),
            timestamp_ms: ts,
            payload: json!({}),
            annotations: Vec::new(),
        })
    }

    /// Store with events at t=100, 200, 300, interleaved with headers.
    fn store_with_headers() -> (OrderedNodeStore<DisplayNode>, Vec<NodeHandle>) {
        let mut store = OrderedNodeStore::new();
        store.insert_last(DisplayNode::SenderHeader {
            sender_id: "@alice:example.org".to_string(),
        });
        let a = store.insert_last(event("$a", 100));
        store.insert_last(DisplayNode::TimeHeader {
            timestamp_s: 0,
            shows_date: false,
        });
        let b = store.insert_last(event("$b", 200));
        let c = store.insert_last(event("$c", 300));
        (store, vec![a, b, c])
    }

    #[test]
    fn test_empty_store_places_at_front() {
        let store = OrderedNodeStore::new();
        assert_eq!(find_event_before(&store, 100, SearchOrigin::Newest), None);
        assert_eq!(find_event_before(&store, 100, SearchOrigin::Oldest), None);
    }

    #[test_case(SearchOrigin::Newest; "from newest")]
    #[test_case(SearchOrigin::Oldest; "from oldest")]
    fn test_older_than_everything_places_at_front(origin: SearchOrigin) {
        let (store, _) = store_with_headers();
        assert_eq!(find_event_before(&store, 50, origin), None);
    }

    #[test_case(SearchOrigin::Newest; "from newest")]
    #[test_case(SearchOrigin::Oldest; "from oldest")]
    fn test_newer_than_everything_places_after_last(origin: SearchOrigin) {
        let (store, handles) = store_with_headers();
        assert_eq!(find_event_before(&store, 400, origin), Some(handles[2]));
    }

    #[test_case(SearchOrigin::Newest; "from newest")]
    #[test_case(SearchOrigin::Oldest; "from oldest")]
    fn test_midpoint_placement(origin: SearchOrigin) {
        let (store, handles) = store_with_headers();
        assert_eq!(find_event_before(&store, 250, origin), Some(handles[1]));
    }

    #[test_case(SearchOrigin::Newest; "from newest")]
    #[test_case(SearchOrigin::Oldest; "from oldest")]
    fn test_equal_timestamp_compares_as_before(origin: SearchOrigin) {
        let (store, handles) = store_with_headers();
        // A new event at exactly t=200 belongs after the existing
        // t=200 node, preserving arrival order.
        assert_eq!(find_event_before(&store, 200, origin), Some(handles[1]));
    }

    #[test]
    fn test_search_never_returns_header() {
        let (store, _) = store_with_headers();
        for ts in [50, 100, 150, 200, 250, 300, 350] {
            for origin in [SearchOrigin::Newest, SearchOrigin::Oldest] {
                if let Some(handle) = find_event_before(&store, ts, origin) {
                    assert!(store.data(handle).is_event());
                }
            }
        }
    }

    #[test]
    fn test_directions_agree() {
        let (store, _) = store_with_headers();
        for ts in [0, 99, 100, 101, 200, 299, 300, 1_000] {
            assert_eq!(
                find_event_before(&store, ts, SearchOrigin::Newest),
                find_event_before(&store, ts, SearchOrigin::Oldest),
                "directions disagree at t={ts}"
            );
        }
    }
}
