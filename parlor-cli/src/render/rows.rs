//! One display row per timeline node.

use std::fmt::Write as _;

use chrono::DateTime;
use colored::Colorize;
use timeline::{DisplayNode, Room};

use super::{colors, markup};

/// Renders a single timeline node as a terminal row.
#[must_use]
pub fn render_row(node: &DisplayNode, room: &Room) -> String {
    match node {
        DisplayNode::Event(event) => {
            let clock = format_clock(event.timestamp_ms);
            let body = event
                .payload
                .get("body")
                .and_then(serde_json::Value::as_str)
                .map_or_else(String::new, markup::to_plain);
            let mut row = format!("  [{clock}] {body}");

            if !event.annotations.is_empty() {
                let keys: Vec<&str> = event
                    .annotations
                    .iter()
                    .filter_map(|annotation| {
                        annotation.content.get("key").and_then(serde_json::Value::as_str)
                    })
                    .collect();
                if keys.is_empty() {
                    let _ = write!(row, " [{} reactions]", event.annotations.len());
                } else {
                    let _ = write!(row, " [{}]", keys.join(" "));
                }
            }
            row
        }
        DisplayNode::SenderHeader { sender_id } => {
            let name = room.member_name(sender_id);
            name.color(colors::sender_color(sender_id)).bold().to_string()
        }
        DisplayNode::TimeHeader {
            timestamp_s,
            shows_date,
        } => {
            let label = DateTime::from_timestamp(*timestamp_s, 0).map_or_else(
                || timestamp_s.to_string(),
                |at| {
                    if *shows_date {
                        at.format("%Y-%m-%d %H:%M").to_string()
                    } else {
                        at.format("%H:%M").to_string()
                    }
                },
            );
            format!("--- {label} ---").dimmed().to_string()
        }
    }
}

fn format_clock(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map_or_else(|| "??:??".to_string(), |at| at.format("%H:%M").to_string())
}
