//! Incremental Server-Sent Events framing.
//!
//! Network chunks do not align with line or frame boundaries, so the
//! parser keeps a partial-line buffer between `push` calls and emits a
//! frame only when the terminating blank line has been seen.

/// One complete SSE frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, when present.
    pub event: Option<String>,
    /// Concatenated `data:` field values.
    pub data: String,
    /// Value of the `id:` field, when present.
    pub id: Option<String>,
}

/// Incremental parser for `event:` / `data:` / `id:` frames.
#[derive(Debug, Default)]
pub struct SseParser {
    line_buffer: String,
    event_name: Option<String>,
    data_buffer: String,
    event_id: Option<String>,
}

impl SseParser {
    /// Creates an empty parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk of stream text and returns every frame it
    /// completed.
    pub fn push(&mut self, chunk: &str) -> Vec<SseFrame> {
        let mut frames = Vec::new();
        self.line_buffer.push_str(chunk);

        while let Some(newline) = self.line_buffer.find('\n') {
            let line: String = self.line_buffer.drain(..=newline).collect();
            self.accept_line(line.trim_end_matches(['\n', '\r']), &mut frames);
        }

        frames
    }

    fn accept_line(&mut self, line: &str, frames: &mut Vec<SseFrame>) {
        if let Some(value) = line.strip_prefix("event:") {
            self.event_name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            self.data_buffer.push_str(value.trim());
        } else if let Some(value) = line.strip_prefix("id:") {
            self.event_id = Some(value.trim().to_string());
        } else if line.is_empty() {
            if !self.data_buffer.is_empty() {
                frames.push(SseFrame {
                    event: self.event_name.take(),
                    data: std::mem::take(&mut self.data_buffer),
                    id: self.event_id.take(),
                });
            }
            self.event_name = None;
            self.event_id = None;
        }
        // Comment lines and unknown fields are ignored.
    }
}
