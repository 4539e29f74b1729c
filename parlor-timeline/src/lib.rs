#![cfg_attr(not(test), forbid(unsafe_code))]
#![deny(warnings, clippy::pedantic)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

//! Parlor's timeline view engine.
//!
//! The engine maintains an ordered sequence of display nodes (chat
//! events, sender-group headers, and time-gap headers) derived from an
//! out-of-order stream of incoming events: live events, retro fetched
//! history pages, and mutating side-events such as reactions. Updates
//! are incremental and never move existing nodes, so a view anchored
//! to a node stays anchored across any batch insertion.
//!
//! Data flow: batches enter at [`Timeline::insert_batch`]; each event
//! is classified, placed chronologically into the
//! [`store::OrderedNodeStore`], and repaired locally by the grouping
//! maintainer. Once per batch, an idempotent gap header pass runs over
//! the affected range. Mutating events consult the cross-reference
//! index instead of being placed.

pub mod gaps;
pub mod grouping;
pub mod node;
pub mod placement;
pub mod room;
pub mod store;
pub mod timeline;
pub mod viewport;

pub use node::{DisplayNode, EventNode};
pub use placement::SearchOrigin;
pub use room::{FetchOutcome, HistorySource, Room};
pub use store::{NodeHandle, OrderedNodeStore};
pub use timeline::{BatchOutcome, Timeline};
pub use viewport::ViewportAnchor;
