//! Deterministic sender colouring.

use colored::Color;

const PALETTE: [Color; 8] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
    Color::Red,
    Color::BrightCyan,
    Color::BrightGreen,
];

/// Assigns a palette colour to a sender id, stable across runs.
#[must_use]
pub fn sender_color(sender_id: &str) -> Color {
    let hash = sender_id
        .bytes()
        .fold(0usize, |acc, byte| acc.wrapping_mul(31).wrapping_add(usize::from(byte)));
    PALETTE[hash % PALETTE.len()]
}
