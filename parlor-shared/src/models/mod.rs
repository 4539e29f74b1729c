//! Wire-level data models shared between the timeline engine, the
//! protocol client, and the CLI.

pub mod errors;
pub mod event;
pub mod member;

pub use errors::HistoryError;
pub use event::{Direction, EventBatch, RoomEvent};
pub use member::RoomMember;
