//! Protocol plumbing for the Parlor chat client: history paging over
//! HTTP and live events over Server-Sent Events.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![deny(warnings, clippy::pedantic)]
#![allow(clippy::multiple_crate_versions)]

pub mod error;
pub mod follow;
pub mod history;
pub mod sse;

pub use error::ClientError;
pub use follow::follow_room;
pub use history::HttpHistorySource;
pub use sse::{SseFrame, SseParser};
