#![cfg_attr(not(test), forbid(unsafe_code))]
#![deny(warnings, clippy::pedantic)]
#![allow(clippy::multiple_crate_versions)]

//! Shared wire models, configuration, and error types for Parlor.

pub mod config;
pub mod models;
