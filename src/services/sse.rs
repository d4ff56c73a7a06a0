//! Incremental parser for the Server-Sent Events wire format.
//!
//! The transport hands us arbitrary byte chunks; frames regularly straddle
//! chunk boundaries, so the parser buffers until a complete line is available
//! and emits a frame for every blank-line record terminator.

/// One complete SSE record: an optional event name and the joined data body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, when present.
    pub event: Option<String>,
    /// All `data:` lines of the record, joined with `\n`.
    pub data: String,
}

/// Stateful SSE decoder fed from the raw byte stream.
#[derive(Debug, Default)]
pub struct SseParser {
    buf: Vec<u8>,
    pending_event: Option<String>,
    pending_data: Vec<String>,
}

impl SseParser {
    /// Fresh parser with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk; returns every frame completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buf.iter().position(|byte| *byte == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            if let Some(frame) = self.consume_line(line.trim_end_matches(['\n', '\r'])) {
                frames.push(frame);
            }
        }
        frames
    }

    fn consume_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.finish_record();
        }
        // Lines starting with a colon are comments (keep-alives).
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.pending_event = Some(value.to_string()),
            "data" => self.pending_data.push(value.to_string()),
            // `id` and `retry` carry no meaning for this console.
            _ => {}
        }
        None
    }

    fn finish_record(&mut self) -> Option<SseFrame> {
        let event = self.pending_event.take();
        let data_lines = std::mem::take(&mut self.pending_data);
        if data_lines.is_empty() {
            // A record without data (event name alone, or pure comments)
            // dispatches nothing per the SSE processing model.
            return None;
        }
        Some(SseFrame {
            event,
            data: data_lines.join("\n"),
        })
    }
}
