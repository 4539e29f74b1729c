//! Grouping maintainer: restores the sender-header invariant around a
//! freshly placed event.
//!
//! The repair is strictly local: it only ever touches nodes adjacent
//! to the insertion point, never rescanning the sequence, so it is
//! O(1) amortised per insertion.

use crate::node::{DisplayNode, EventNode};
use crate::store::{NodeHandle, OrderedNodeStore};

/// Inserts `event` adjacent to the placement anchor and repairs the
/// sender-header structure around it.
///
/// `anchor` is the result of
/// [`find_event_before`](crate::placement::find_event_before): the
/// event node the new one belongs immediately after, or `None` for
/// insertion at the front of the store. When `group_by_sender` is
/// false no header nodes are created or consulted.
///
/// `gap_threshold_ms` decides which side of an existing time header
/// the event lands on; see [`insertion_slot`].
///
/// Returns the handle of the inserted event node.
pub fn insert_event_grouped(
    store: &mut OrderedNodeStore<DisplayNode>,
    event: EventNode,
    anchor: Option<NodeHandle>,
    group_by_sender: bool,
    gap_threshold_ms: i64,
) -> NodeHandle {
    match anchor {
        None => insert_at_front(store, event, group_by_sender),
        Some(anchor) => insert_after_anchor(store, event, anchor, group_by_sender, gap_threshold_ms),
    }
}

fn insert_at_front(
    store: &mut OrderedNodeStore<DisplayNode>,
    event: EventNode,
    group_by_sender: bool,
) -> NodeHandle {
    // If the store already starts with a header for this sender, slot
    // the event under it instead of minting a second one.
    if group_by_sender
        && let Some(first) = store.first()
        && store.data(first).is_sender_header_for(&event.sender_id)
    {
        return store.insert_after(first, DisplayNode::Event(event));
    }

    let sender_id = event.sender_id.clone();
    let handle = store.insert_first(DisplayNode::Event(event));
    if group_by_sender {
        store.insert_before(handle, DisplayNode::SenderHeader { sender_id });
    }
    handle
}

fn insert_after_anchor(
    store: &mut OrderedNodeStore<DisplayNode>,
    event: EventNode,
    anchor: NodeHandle,
    group_by_sender: bool,
    gap_threshold_ms: i64,
) -> NodeHandle {
    let sender_id = event.sender_id.clone();
    let slot = insertion_slot(store, anchor, event.timestamp_ms, gap_threshold_ms);
    let handle = store.insert_after(slot, DisplayNode::Event(event));
    if !group_by_sender {
        return handle;
    }

    let anchor_sender = store.data(anchor).sender_id().map(str::to_owned);
    if anchor_sender.as_deref() == Some(sender_id.as_str()) {
        // Same sender: the run simply grows.
        return handle;
    }

    // Different sender: the new event starts its own run.
    store.insert_before(
        handle,
        DisplayNode::SenderHeader {
            sender_id: sender_id.clone(),
        },
    );

    // The insertion may have broken what was previously a single
    // contiguous run: if an un-headed event of another sender now
    // follows the new one, give it a corrective header.
    if let Some(follower) = first_event_follower(store, handle) {
        let follower_sender = store
            .data(follower)
            .as_event()
            .map(|event| event.sender_id.clone());
        if let Some(follower_sender) = follower_sender
            && follower_sender != sender_id
        {
            store.insert_before(
                follower,
                DisplayNode::SenderHeader {
                    sender_id: follower_sender,
                },
            );
        }
    }

    handle
}

/// The node the new event goes immediately after. Usually the anchor
/// itself, but a time header directly after the anchor describes the
/// gap the anchor formed with its old follower: when the new event is
/// at least the threshold away from the anchor, that gap now ends at
/// the new event, so the event must land past the header for the gap
/// pass to refresh it in place. When the new event sits close to the
/// anchor the header still describes the later pair and the event
/// stays before it.
fn insertion_slot(
    store: &OrderedNodeStore<DisplayNode>,
    anchor: NodeHandle,
    timestamp_ms: i64,
    gap_threshold_ms: i64,
) -> NodeHandle {
    if let Some(next) = store.next(anchor)
        && store.data(next).is_time_header()
        && store
            .data(anchor)
            .timestamp_ms()
            .is_some_and(|anchor_ms| timestamp_ms - anchor_ms >= gap_threshold_ms)
    {
        return next;
    }
    anchor
}

/// Walks forward from `handle` to the next event node, looking
/// through time headers (they carry no sender identity) but stopping
/// at a sender header, since a headed run needs no repair.
fn first_event_follower(
    store: &OrderedNodeStore<DisplayNode>,
    handle: NodeHandle,
) -> Option<NodeHandle> {
    let mut cursor = store.next(handle);
    while let Some(next) = cursor {
        match store.data(next) {
            DisplayNode::Event(_) => return Some(next),
            DisplayNode::SenderHeader { .. } => return None,
            DisplayNode::TimeHeader { .. } => cursor = store.next(next),
        }
    }
    None
}
