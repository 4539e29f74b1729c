//! Gap header pass: inserts and refreshes time-gap headers between
//! consecutive events.
//!
//! Arrival order is not sorted across a whole batch, so the pass runs
//! over the full affected range after every batch insertion rather
//! than just at the insertion points. It is idempotent: an existing
//! header in the right slot is left alone (or refreshed in place),
//! never duplicated.

use chrono::DateTime;
use shared::config::TimelineConfig;

use crate::node::DisplayNode;
use crate::store::{NodeHandle, OrderedNodeStore};

/// Walks consecutive event pairs in `[start, end]` (defaulting to the
/// whole store) and ensures a [`DisplayNode::TimeHeader`] sits between
/// every pair whose timestamps differ by at least the configured gap
/// threshold.
///
/// The header occupies the slot immediately after the earlier event of
/// the pair; that slot is also where an existing header is looked for,
/// which is what makes repeated passes safe. `shows_date` is set when
/// the two events fall on different UTC calendar dates.
///
/// The walk runs through the first event at or beyond `end`, so the
/// pair spanning the range edge is always checked even when `end`
/// names a header node.
pub fn refresh_gap_headers(
    store: &mut OrderedNodeStore<DisplayNode>,
    config: &TimelineConfig,
    start: Option<NodeHandle>,
    end: Option<NodeHandle>,
) {
    let threshold_ms = config.gap_threshold_ms();
    let mut previous: Option<(NodeHandle, i64)> = None;
    let mut past_end = false;
    let mut cursor = start.or_else(|| store.first());

    while let Some(handle) = cursor {
        let mut processed_event = false;
        if let Some(timestamp_ms) = store.data(handle).timestamp_ms() {
            if let Some((previous_handle, previous_ms)) = previous
                && timestamp_ms - previous_ms >= threshold_ms
            {
                ensure_header_after(store, previous_handle, previous_ms, timestamp_ms);
            }
            previous = Some((handle, timestamp_ms));
            processed_event = true;
        }
        if Some(handle) == end {
            past_end = true;
        }
        if past_end && processed_event {
            break;
        }
        cursor = store.next(handle);
    }
}

/// Ensures the slot immediately after `earlier` holds a correct time
/// header for the `earlier_ms`/`later_ms` pair.
fn ensure_header_after(
    store: &mut OrderedNodeStore<DisplayNode>,
    earlier: NodeHandle,
    earlier_ms: i64,
    later_ms: i64,
) {
    let timestamp_s = later_ms / 1_000;
    let shows_date = crosses_date_boundary(earlier_ms, later_ms);

    if let Some(slot) = store.next(earlier)
        && store.data(slot).is_time_header()
    {
        let refreshed = DisplayNode::TimeHeader {
            timestamp_s,
            shows_date,
        };
        if *store.data(slot) != refreshed {
            *store.data_mut(slot) = refreshed;
            store.invalidate(slot);
        }
        return;
    }

    store.insert_after(
        earlier,
        DisplayNode::TimeHeader {
            timestamp_s,
            shows_date,
        },
    );
}

/// `true` when the two instants fall on different UTC calendar dates.
fn crosses_date_boundary(earlier_ms: i64, later_ms: i64) -> bool {
    match (
        DateTime::from_timestamp_millis(earlier_ms),
        DateTime::from_timestamp_millis(later_ms),
    ) {
        (Some(earlier), Some(later)) => earlier.date_naive() != later.date_naive(),
        _ => false,
    }
}
