//! Classification and rendering of a fully buffered block.

use crate::parser::{PatternSet, SourceLocation, ThreadStopMatch};
use serde::Serialize;
use std::ops::Range;

/// A location resolved while flushing a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationUpdate {
    pub location: SourceLocation,
    /// Stop reason for thread-stop markers, `None` for frame navigation.
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockClass {
    /// A finished stop event: thread-stop marker plus terminator line.
    Stop {
        stop: ThreadStopMatch,
        terminator: Range<usize>,
    },
    /// Thread-stop marker with a location but no terminator, e.g. `bt` output.
    UnterminatedStop,
    /// A frame marker with a location ends the block.
    Frame(SourceLocation),
    Unrecognized,
}

/// Final text for a block and the location it resolved, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub update: Option<LocationUpdate>,
}

/// First match wins: thread stop, then frame, then nothing.
pub fn classify(patterns: &PatternSet, block: &str) -> BlockClass {
    if let Some(stop) = patterns.thread_stop(block) {
        return match patterns.stop_terminator(block) {
            Some(terminator) => BlockClass::Stop { stop, terminator },
            None => BlockClass::UnterminatedStop,
        };
    }
    match patterns.frame_location(block) {
        Some(location) => BlockClass::Frame(location),
        None => BlockClass::Unrecognized,
    }
}

/// Single-step stops are the only ones hidden from the display.
pub fn is_step(reason: &str) -> bool {
    reason.starts_with("step")
}

pub fn render(patterns: &PatternSet, block: &str) -> Rendered {
    match classify(patterns, block) {
        BlockClass::Stop { stop, terminator } => {
            let text = if is_step(&stop.reason) {
                tracing::debug!(reason = %stop.reason, location = %stop.location, "suppressing step block");
                String::new()
            } else {
                tracing::debug!(reason = %stop.reason, location = %stop.location, "forwarding stop block");
                annotate_terminator(block, terminator.end, &stop.reason)
            };
            Rendered {
                text,
                update: Some(LocationUpdate {
                    location: stop.location,
                    reason: Some(stop.reason),
                }),
            }
        }
        BlockClass::UnterminatedStop => {
            tracing::debug!("thread marker without terminator, forwarding verbatim");
            Rendered {
                text: block.to_string(),
                update: None,
            }
        }
        BlockClass::Frame(location) => {
            tracing::debug!(%location, "frame block");
            Rendered {
                text: block.to_string(),
                update: Some(LocationUpdate {
                    location,
                    reason: None,
                }),
            }
        }
        BlockClass::Unrecognized => {
            tracing::trace!(len = block.len(), "unrecognized block, forwarding verbatim");
            Rendered {
                text: block.to_string(),
                update: None,
            }
        }
    }
}

/// `Target 0: (prog) stopped.` becomes `Target 0: (prog) stopped. - <reason>.`
fn annotate_terminator(block: &str, at: usize, reason: &str) -> String {
    let mut text = String::with_capacity(block.len() + reason.len() + 4);
    text.push_str(&block[..at]);
    text.push_str(" - ");
    text.push_str(reason);
    text.push('.');
    text.push_str(&block[at..]);
    text
}
