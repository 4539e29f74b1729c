//! Reconnecting live-event follow loop.

use futures_util::StreamExt;
use shared::models::RoomEvent;
use tokio::time::{Duration, sleep};
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::history::HttpHistorySource;
use crate::sse::SseParser;

/// Follows a room's SSE stream, handing each decoded batch of live
/// events to `on_events`.
///
/// Reconnects after transport errors with a one-second pause, resuming
/// from the last seen event id via `Last-Event-ID`. Returns when the
/// server closes a stream that never produced an event id, which is
/// how it signals the room is gone.
///
/// # Errors
/// Returns [`ClientError::InvalidUrl`] when the stream endpoint cannot
/// be constructed. Transport errors are retried, not returned.
pub async fn follow_room<F>(
    source: &HttpHistorySource,
    room_id: &str,
    mut on_events: F,
) -> Result<(), ClientError>
where
    F: FnMut(Vec<RoomEvent>),
{
    let stream_url = source.stream_url(room_id)?;
    let mut last_event_id: Option<String> = None;

    loop {
        let mut request = source.http().get(stream_url.clone());
        if let Some(id) = &last_event_id {
            request = request.header("Last-Event-ID", id);
        }

        let response = match request.send().await {
            Ok(resp) => match resp.error_for_status() {
                Ok(ok) => ok,
                Err(err) => {
                    warn!(room_id, "stream request rejected: {err}");
                    sleep(Duration::from_secs(1)).await;
                    continue;
                }
            },
            Err(err) => {
                warn!(room_id, "stream connection failed: {err}");
                sleep(Duration::from_secs(1)).await;
                continue;
            }
        };

        let mut stream = response.bytes_stream();
        let mut parser = SseParser::new();

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(room_id, "stream chunk error: {err}");
                    break;
                }
            };

            for frame in parser.push(&String::from_utf8_lossy(&bytes)) {
                if let Some(id) = frame.id {
                    last_event_id = Some(id);
                }
                match decode_events(&frame.data) {
                    Some(events) => on_events(events),
                    None => debug!(room_id, data = %frame.data, "unparsed stream frame"),
                }
            }
        }

        if last_event_id.is_none() {
            return Ok(());
        }

        sleep(Duration::from_secs(1)).await;
    }
}

/// Accepts either a JSON array of events or a single event object.
fn decode_events(data: &str) -> Option<Vec<RoomEvent>> {
    if let Ok(events) = serde_json::from_str::<Vec<RoomEvent>>(data) {
        return Some(events);
    }
    serde_json::from_str::<RoomEvent>(data)
        .ok()
        .map(|event| vec![event])
}
