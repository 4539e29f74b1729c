//! Subcommand handlers for the Parlor CLI.

pub mod config;
pub mod replay;
pub mod view;
