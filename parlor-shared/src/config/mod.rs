//! Configuration loading for the Parlor client.

pub mod client;
pub mod timeline;

pub use client::Config;
pub use timeline::TimelineConfig;
