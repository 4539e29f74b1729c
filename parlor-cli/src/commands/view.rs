use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Args;
use client::{HttpHistorySource, follow_room};
use shared::config::Config;
use shared::models::RoomEvent;
use timeline::{FetchOutcome, Room};
use tracing::debug;

use crate::render::rows::render_row;

#[derive(Args, Debug)]
#[command(about = "Fetch recent history for a room, print it, then follow live events")]
pub struct ViewArgs {
    /// Room identifier to view
    #[arg(long)]
    pub room: String,

    /// Parlor server base URL (overrides configuration)
    #[arg(long)]
    pub server: Option<String>,

    /// Path to the configuration file (optional)
    #[arg(
        long,
        short,
        help = "Path to the configuration file (e.g., config.yaml or config.json). If not provided, defaults will be used."
    )]
    pub config: Option<PathBuf>,
}

/// Loads configuration, backfills one history page, prints the
/// timeline, then follows the room's live event stream.
///
/// # Errors
/// Returns an error when configuration loading, the initial history
/// fetch, or the stream endpoint construction fails.
pub async fn handle_view(args: ViewArgs) -> Result<()> {
    let config = Config::load_config(args.config, args.server)
        .map_err(|err| anyhow!("failed to load configuration: {err}"))?;
    crate::init_logging(&config.log_level);

    let source = HttpHistorySource::new(&config.server_url)?;
    let mut room = Room::new(args.room.clone(), config.timeline);

    if let FetchOutcome::Fetched(outcome) = room.fetch_older(&source).await? {
        debug!(inserted = outcome.inserted, "loaded initial history page");
    }
    room.timeline_mut().take_dirty();

    for (_, node) in room.timeline().store().iter() {
        println!("{}", render_row(node, &room));
    }

    println!("Following {}... (press Ctrl+C to stop)", args.room);
    follow_room(&source, &args.room, |events| {
        print_live_batch(&mut room, events);
    })
    .await?;

    Ok(())
}

/// Inserts a live batch and prints what changed: every node the batch
/// added, wherever it landed in the sequence, then re-rendered rows
/// for nodes the engine invalidated.
fn print_live_batch(room: &mut Room, events: Vec<RoomEvent>) {
    let watermark = room.timeline().store().len();
    room.handle_live_events(events);
    let dirty = room.timeline_mut().take_dirty();

    let added = room.timeline().store().added_since(watermark);
    for handle in &added {
        println!(
            "{}",
            render_row(room.timeline().store().data(*handle), room)
        );
    }

    for handle in dirty {
        if !added.contains(&handle) {
            println!(
                "(updated) {}",
                render_row(room.timeline().store().data(handle), room)
            );
        }
    }
}
