// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Event Stream Parser
//
// Restartable line accumulator over raw body chunks. Bytes are buffered
// (not text) so a multi-byte character split across two chunks decodes
// intact once its line is complete.

use crate::events::{decode_payload, AgentEvent};

pub const DATA_PREFIX: &str = "data:";
pub const DONE_SENTINEL: &str = "[DONE]";

/// Payload of one complete `data:` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLine {
    pub data: String,
}

impl StreamLine {
    /// Decoded event, or `None` for malformed payloads
    pub fn event(&self) -> Option<AgentEvent> {
        decode_payload(&self.data)
    }
}

#[derive(Debug, Default)]
pub struct EventStreamParser {
    buffer: Vec<u8>,
}

impl EventStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk; returns every `data:` line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamLine> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            if let Some(line) = parse_line(&self.buffer[start..end]) {
                lines.push(line);
            }
            start = end + 1;
        }
        self.buffer.drain(..start);
        lines
    }

    /// Flush an unterminated final line at end of stream.
    pub fn finish(&mut self) -> Option<StreamLine> {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&rest)
    }

    /// Bytes held back waiting for a newline
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn parse_line(raw: &[u8]) -> Option<StreamLine> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = String::from_utf8_lossy(raw);
    let data = line.strip_prefix(DATA_PREFIX)?;
    let data = data.strip_prefix(' ').unwrap_or(data);

    if data == DONE_SENTINEL {
        return None;
    }
    Some(StreamLine {
        data: data.to_string(),
    })
}
