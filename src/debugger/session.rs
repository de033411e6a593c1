//! Per-session demultiplexing context.
//!
//! One [`FilterSession`] exists per debugger process. It owns every piece of
//! mutable state: the raw line accumulator, the block state machine and its
//! accumulator, and the last resolved location. Each call to
//! [`FilterSession::feed`] runs to completion and returns the display text it
//! produced.

use super::flusher::{self, LocationUpdate};
use super::location::LocationTracker;
use super::stepping::BlockState;
use crate::error::PatternError;
use crate::parser::{LineAssembler, PatternSet, SourceLocation};

/// Result of processing one chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutput {
    /// Display-ready text, in order.
    pub text: String,
    /// Locations resolved while processing the chunk, oldest first.
    pub updates: Vec<LocationUpdate>,
}

impl FilterOutput {
    /// The most recent location resolved by this chunk.
    pub fn location(&self) -> Option<&SourceLocation> {
        self.updates.last().map(|u| &u.location)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.updates.is_empty()
    }

    pub fn append(&mut self, other: FilterOutput) {
        self.text.push_str(&other.text);
        self.updates.extend(other.updates);
    }
}

#[derive(Debug)]
pub struct FilterSession {
    patterns: PatternSet,
    lines: LineAssembler,
    state: BlockState,
    block: String,
    /// True until something has been forwarded since the last block boundary.
    empty_block: bool,
    tracker: LocationTracker,
    /// An idle flush already printed a prompt; swallow the real one if it
    /// arrives before any other output.
    prompt_owed: bool,
}

impl FilterSession {
    pub fn new(patterns: PatternSet) -> Self {
        Self {
            patterns,
            lines: LineAssembler::new(),
            state: BlockState::Passthrough,
            block: String::new(),
            empty_block: true,
            tracker: LocationTracker::new(),
            prompt_owed: false,
        }
    }

    /// Session using the built-in lldb patterns.
    pub fn lldb() -> Result<Self, PatternError> {
        Ok(Self::new(PatternSet::lldb()?))
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn state(&self) -> BlockState {
        self.state
    }

    /// Last location resolved from any marker in this session.
    pub fn location(&self) -> Option<&SourceLocation> {
        self.tracker.current()
    }

    /// Text buffered for the current block.
    pub fn pending_block(&self) -> &str {
        &self.block
    }

    /// Unterminated input waiting for its line break.
    pub fn pending_partial(&self) -> &str {
        self.lines.partial()
    }

    /// Process one raw chunk of debugger output.
    pub fn feed(&mut self, chunk: impl AsRef<[u8]>) -> FilterOutput {
        let mut out = FilterOutput::default();
        for line in self.lines.feed(chunk.as_ref()) {
            self.process_line(&line, &mut out);
        }
        self.check_residual(&mut out);
        out
    }

    /// End of stream: flush whatever is pending and forward the partial line.
    pub fn finish(&mut self) -> FilterOutput {
        let mut out = FilterOutput::default();
        if self.state == BlockState::Buffering {
            tracing::debug!(len = self.block.len(), "end of stream, flushing pending block");
            self.flush(&mut out);
        }
        let rest = self.lines.take_all();
        self.forward(&rest, &mut out);
        out
    }

    /// Run one complete line, or a prompt-terminated fragment, through the
    /// state machine.
    fn process_line(&mut self, mut line: &str, out: &mut FilterOutput) {
        while !line.is_empty() {
            tracing::trace!(state = ?self.state, line = line.trim_end(), "line");

            let Some(prompt) = self.patterns.find_prompt(line) else {
                self.route(line, out);
                return;
            };

            let before = &line[..prompt.start];
            match self.state {
                BlockState::Buffering => {
                    self.block.push_str(before);
                    self.flush(out);
                }
                BlockState::Passthrough => self.forward(before, out),
            }
            self.empty_block = true;
            self.emit_prompt(&line[prompt.start..prompt.end], out);
            line = &line[prompt.end..];
        }
    }

    /// A prompt-free piece of text.
    fn route(&mut self, line: &str, out: &mut FilterOutput) {
        if self.state == BlockState::Buffering {
            self.block.push_str(line);
            return;
        }

        match self.patterns.marker_start(line) {
            Some(start) => {
                tracing::debug!(kind = ?start.kind, "marker start, buffering until prompt");
                self.forward(&line[..start.offset], out);
                self.block.push_str(&line[start.offset..]);
                self.state = BlockState::Buffering;
            }
            None => {
                self.forward(line, out);
                self.empty_block = false;
            }
        }
    }

    /// Residual checks once every complete line of a chunk is consumed.
    fn check_residual(&mut self, out: &mut FilterOutput) {
        if self.lines.is_empty() {
            let stop_finished = self.state == BlockState::Buffering
                && self.patterns.stop_terminator(&self.block).is_some();
            if stop_finished {
                tracing::debug!("stop event ended without a prompt, synthesizing one");
                self.flush(out);
                out.text.push_str(self.patterns.prompt_text());
                self.prompt_owed = true;
            }
            return;
        }

        if let Some(end) = self.patterns.last_prompt_end(self.lines.partial()) {
            let head = self.lines.take_partial(end);
            self.process_line(&head, out);
            return;
        }

        let partial_len = self.lines.partial().len();
        if self.patterns.is_confirmation(self.lines.partial()) {
            tracing::debug!("interactive query pending, forwarding it unterminated");
            if self.state == BlockState::Buffering {
                self.flush(out);
            }
            let query = self.lines.take_partial(partial_len);
            self.forward(&query, out);
        }
    }

    /// Render the buffered block and return to passthrough.
    fn flush(&mut self, out: &mut FilterOutput) {
        let block = std::mem::take(&mut self.block);
        self.state = BlockState::Passthrough;

        let rendered = flusher::render(&self.patterns, &block);
        if let Some(update) = rendered.update {
            self.tracker.update(update.location.clone());
            out.updates.push(update);
        }

        let mut text = rendered.text;
        if !text.is_empty() && !self.empty_block && !text.ends_with('\n') {
            text.push('\n');
        }
        self.empty_block = true;
        self.forward(&text, out);
    }

    fn forward(&mut self, text: &str, out: &mut FilterOutput) {
        if text.is_empty() {
            return;
        }
        self.prompt_owed = false;
        out.text.push_str(text);
    }

    fn emit_prompt(&mut self, prompt: &str, out: &mut FilterOutput) {
        if self.prompt_owed {
            tracing::trace!("prompt already synthesized, dropping duplicate");
            self.prompt_owed = false;
            return;
        }
        out.text.push_str(prompt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BREAKPOINT: &str = "Process 4242 stopped\n* thread #1, queue = 'com.apple.main-thread', stop reason = breakpoint 1.1\n    frame #0: 0x0000000100003f6f prog`main at /tmp/main.c:5:3\nTarget 0: (prog) stopped.\n";

    fn session() -> FilterSession {
        FilterSession::lldb().unwrap()
    }

    #[test]
    fn test_marker_line_starts_buffering() {
        let mut s = session();
        let out = s.feed("Process 4242 stopped\n* thread #1, stop reason = breakpoint 1.1\n");
        assert_eq!(out.text, "Process 4242 stopped\n");
        assert_eq!(s.state(), BlockState::Buffering);
        assert_eq!(s.pending_block(), "* thread #1, stop reason = breakpoint 1.1\n");
    }

    #[test]
    fn test_text_before_marker_is_forwarded() {
        let mut s = session();
        let out = s.feed("noise frame #1: 0x1 prog`f at /a.c:9\n");
        assert_eq!(out.text, "noise ");
        assert_eq!(s.pending_block(), "frame #1: 0x1 prog`f at /a.c:9\n");
    }

    #[test]
    fn test_prompt_flushes_block() {
        let mut s = session();
        let out = s.feed(format!("{BREAKPOINT}(lldb) "));
        assert!(out
            .text
            .contains("Target 0: (prog) stopped. - breakpoint 1.1.\n(lldb) "));
        assert_eq!(s.state(), BlockState::Passthrough);
        assert_eq!(s.location(), Some(&SourceLocation::new("/tmp/main.c", 5)));
        assert_eq!(out.updates.len(), 1);
        assert!(s.pending_partial().is_empty());
    }

    #[test]
    fn test_text_after_prompt_keeps_processing() {
        let mut s = session();
        let out = s.feed("(lldb) frame #0: 0x1 prog`main at /a.c:3\n(lldb) ");
        assert_eq!(out.text, "(lldb) frame #0: 0x1 prog`main at /a.c:3\n(lldb) ");
        assert_eq!(out.location(), Some(&SourceLocation::new("/a.c", 3)));
    }

    #[test]
    fn test_idle_flush_synthesizes_prompt_once() {
        let mut s = session();
        let first = s.feed(BREAKPOINT);
        assert!(first.text.ends_with("stopped. - breakpoint 1.1.\n(lldb) "));
        assert_eq!(s.state(), BlockState::Passthrough);

        let second = s.feed("(lldb) ");
        assert_eq!(second.text, "");

        let third = s.feed("(lldb) ");
        assert_eq!(third.text, "(lldb) ");
    }

    #[test]
    fn test_owed_prompt_cleared_by_output() {
        let mut s = session();
        s.feed(BREAKPOINT);
        let out = s.feed("Process 4242 exited with status = 0\n(lldb) ");
        assert_eq!(out.text, "Process 4242 exited with status = 0\n(lldb) ");
    }

    #[test]
    fn test_no_idle_flush_without_terminator() {
        let mut s = session();
        let out = s.feed("frame #2: 0x1 prog`f at /a.c:1\n");
        assert_eq!(out.text, "");
        assert_eq!(s.state(), BlockState::Buffering);
    }

    #[test]
    fn test_confirmation_query_is_forwarded() {
        let mut s = session();
        let out = s.feed("Quitting LLDB will kill one or more processes. Do you really want to proceed: [Y/n] ");
        assert!(out.text.ends_with("[Y/n] "));
        assert!(s.pending_partial().is_empty());
    }

    #[test]
    fn test_confirmation_flushes_pending_block() {
        let mut s = session();
        s.feed("frame #0: 0x1 prog`main at /a.c:3\n");
        let out = s.feed("Really? [y/N] ");
        assert_eq!(out.text, "frame #0: 0x1 prog`main at /a.c:3\nReally? [y/N] ");
        assert_eq!(s.state(), BlockState::Passthrough);
        assert_eq!(s.location(), Some(&SourceLocation::new("/a.c", 3)));
    }

    #[test]
    fn test_newline_synthesized_after_output() {
        let mut s = session();
        let out = s.feed("hello\nframe #0: 0x1 prog`main at /a.c:3\ntail(lldb) ");
        assert_eq!(out.text, "hello\nframe #0: 0x1 prog`main at /a.c:3\ntail\n(lldb) ");

        let mut s = session();
        let out = s.feed("frame #0: 0x1 prog`main at /a.c:3\ntail(lldb) ");
        assert_eq!(out.text, "frame #0: 0x1 prog`main at /a.c:3\ntail(lldb) ");
    }

    #[test]
    fn test_finish_drains_everything() {
        let mut s = session();
        s.feed("frame #0: 0x1 prog`main at /a.c:3\npartial");
        let out = s.finish();
        assert_eq!(out.text, "frame #0: 0x1 prog`main at /a.c:3\npartial");
        assert_eq!(out.updates.len(), 1);
        assert!(s.pending_block().is_empty());
        assert!(s.pending_partial().is_empty());
    }

    #[test]
    fn test_location_survives_unrelated_blocks() {
        let mut s = session();
        s.feed("frame #0: 0x1 prog`main at /a.c:3\n(lldb) ");
        s.feed("frame #1: 0x2 dyld`start + 2432\n(lldb) ");
        assert_eq!(s.location(), Some(&SourceLocation::new("/a.c", 3)));
    }
}
