use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use shared::config::TimelineConfig;
use shared::models::RoomEvent;
use timeline::Room;

use crate::render::rows::render_row;

#[derive(Args, Debug)]
#[command(about = "Replay a recorded transcript of event batches and print the final timeline")]
pub struct ReplayArgs {
    /// Path to the transcript file (a JSON list of event batches)
    pub transcript: PathBuf,

    /// Gap threshold in seconds between events that produces a time header
    #[arg(long)]
    pub gap_threshold: Option<u32>,
}

/// One recorded batch: a page of events plus whether it arrived as a
/// historical (retro-fetched) page or as live events.
#[derive(Debug, Deserialize)]
struct TranscriptBatch {
    #[serde(default)]
    historical: bool,
    events: Vec<RoomEvent>,
}

/// Runs every batch of the transcript through the engine and prints
/// the resulting timeline.
///
/// # Errors
/// Returns an error when the transcript cannot be read or is not
/// valid JSON.
pub fn handle_replay(args: &ReplayArgs) -> Result<()> {
    let content = fs::read_to_string(&args.transcript)
        .with_context(|| format!("failed to read transcript {}", args.transcript.display()))?;
    let batches: Vec<TranscriptBatch> =
        serde_json::from_str(&content).context("transcript is not a valid JSON batch list")?;

    let mut config = TimelineConfig::default();
    if let Some(threshold) = args.gap_threshold {
        config.gap_threshold_seconds = threshold;
    }

    let mut room = Room::new("replay", config);
    for batch in batches {
        room.timeline_mut().insert_batch(batch.events, batch.historical);
    }

    for (_, node) in room.timeline().store().iter() {
        println!("{}", render_row(node, &room));
    }

    Ok(())
}
