use super::protocol::NavMessage;
use crate::debugger::LocationUpdate;
use crate::error::FilterError;
use std::io::{BufRead, Read, Write};

/// Writes `Content-Length`-framed JSON location events.
#[derive(Debug)]
pub struct NavEmitter<W: Write> {
    seq: u64,
    out: W,
}

impl<W: Write> NavEmitter<W> {
    pub fn new(out: W) -> Self {
        Self { seq: 0, out }
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    pub fn send(&mut self, update: &LocationUpdate) -> Result<(), FilterError> {
        let seq = self.next_seq();
        let msg = NavMessage::from_update(seq, update);
        let json = serde_json::to_string(&msg)?;

        write!(self.out, "Content-Length: {}\r\n\r\n{}", json.len(), json)?;
        self.out.flush()?;
        tracing::debug!(seq, event = %msg.event, location = %update.location, "navigation event sent");
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Read one framed message. `Ok(None)` at end of input.
pub fn read_message<R: BufRead>(input: &mut R) -> Result<Option<NavMessage>, FilterError> {
    let mut content_length = 0usize;
    let mut header = String::new();

    loop {
        header.clear();
        if input.read_line(&mut header)? == 0 {
            return Ok(None);
        }
        let line = header.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Content-Length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    let mut buffer = vec![0u8; content_length];
    input.read_exact(&mut buffer)?;
    let msg = serde_json::from_slice(&buffer)?;
    Ok(Some(msg))
}
