//! Terminal rendering of timeline nodes.

pub mod colors;
pub mod markup;
pub mod rows;
