//! The fixed set of debugger output patterns.
//!
//! Every pattern is named by a [`PatternKind`] and carries a capture contract,
//! so a change in the debugger's output format is a change to
//! [`PatternConfig`] alone. The state machine only ever sees the typed results
//! returned from [`PatternSet`].

use super::types::{MarkerKind, MarkerStart, SourceLocation, ThreadStopMatch};
use crate::error::PatternError;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Version of the [`PatternConfig`] layout understood by this build.
pub const PATTERN_CONFIG_VERSION: u32 = 1;

/// The literal lldb prompt.
pub const LLDB_PROMPT: &str = "(lldb) ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// The REPL prompt, the universal block delimiter.
    Prompt,
    /// A bracketed multiple-choice query such as `[Y/n] `.
    Confirmation,
    /// Start of a thread-stop marker.
    ThreadStart,
    /// A thread-stop marker followed by a frame line with a location.
    ThreadStop,
    /// The `Target N: (name) stopped.` line that ends a stop event.
    ThreadEnd,
    /// Start of a frame marker.
    FrameStart,
    /// A frame line with a location, at the end of a block.
    Frame,
}

impl PatternKind {
    pub fn name(self) -> &'static str {
        match self {
            PatternKind::Prompt => "prompt",
            PatternKind::Confirmation => "confirmation",
            PatternKind::ThreadStart => "thread_start",
            PatternKind::ThreadStop => "thread_stop",
            PatternKind::ThreadEnd => "thread_end",
            PatternKind::FrameStart => "frame_start",
            PatternKind::Frame => "frame",
        }
    }

    /// Named groups the pattern must define.
    pub fn required_captures(self) -> &'static [&'static str] {
        match self {
            PatternKind::ThreadStop => &["reason", "file", "line"],
            PatternKind::Frame => &["file", "line"],
            _ => &[],
        }
    }

    /// Patterns that would turn every position into a match if they accepted
    /// the empty string.
    fn must_consume(self) -> bool {
        matches!(
            self,
            PatternKind::Prompt
                | PatternKind::Confirmation
                | PatternKind::ThreadStart
                | PatternKind::FrameStart
        )
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Regex sources for every [`PatternKind`], loadable from JSON.
///
/// Fields left out of a config file keep their lldb defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternConfig {
    pub version: u32,
    pub prompt: String,
    /// Literal text written when a prompt has to be synthesized.
    pub prompt_text: String,
    pub confirmation: String,
    pub thread_start: String,
    pub thread_stop: String,
    pub thread_end: String,
    pub frame_start: String,
    pub frame: String,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            version: PATTERN_CONFIG_VERSION,
            prompt: r"\(lldb\) ".to_string(),
            prompt_text: LLDB_PROMPT.to_string(),
            confirmation: r"\[[^\[\]\r\n]*/[^\[\]\r\n]*\] $".to_string(),
            thread_start: r"\* thread #\d+".to_string(),
            thread_stop: concat!(
                r"(?m)\* thread #\d+[^\r\n]*?stop reason = (?P<reason>[^\r\n]*?)[ \t]*\r?\n",
                r"[^\r\n]*?frame #\d+: [^\r\n]*? at (?P<file>[^\r\n]+?):(?P<line>\d+)(?::\d+)?[ \t]*\r?$",
            )
            .to_string(),
            thread_end: r"(?m)^Target \d+: \([^\r\n]*\) stopped\.".to_string(),
            frame_start: r"frame #\d+: ".to_string(),
            frame: r"frame #\d+: [^\r\n]*? at (?P<file>[^\r\n]+?):(?P<line>\d+)(?::\d+)?\s*\z"
                .to_string(),
        }
    }
}

impl PatternConfig {
    pub fn source(&self, kind: PatternKind) -> &str {
        match kind {
            PatternKind::Prompt => &self.prompt,
            PatternKind::Confirmation => &self.confirmation,
            PatternKind::ThreadStart => &self.thread_start,
            PatternKind::ThreadStop => &self.thread_stop,
            PatternKind::ThreadEnd => &self.thread_end,
            PatternKind::FrameStart => &self.frame_start,
            PatternKind::Frame => &self.frame,
        }
    }
}

/// Compiled patterns for one debugger dialect.
#[derive(Debug, Clone)]
pub struct PatternSet {
    prompt: Regex,
    prompt_text: String,
    confirmation: Regex,
    thread_start: Regex,
    thread_stop: Regex,
    thread_end: Regex,
    frame_start: Regex,
    frame: Regex,
}

impl PatternSet {
    /// The built-in lldb dialect.
    pub fn lldb() -> Result<Self, PatternError> {
        Self::from_config(&PatternConfig::default())
    }

    pub fn from_config(config: &PatternConfig) -> Result<Self, PatternError> {
        if config.version != PATTERN_CONFIG_VERSION {
            return Err(PatternError::UnsupportedVersion {
                found: config.version,
                expected: PATTERN_CONFIG_VERSION,
            });
        }

        let build = |kind: PatternKind| compile(kind, config.source(kind));
        let set = Self {
            prompt: build(PatternKind::Prompt)?,
            prompt_text: config.prompt_text.clone(),
            confirmation: build(PatternKind::Confirmation)?,
            thread_start: build(PatternKind::ThreadStart)?,
            thread_stop: build(PatternKind::ThreadStop)?,
            thread_end: build(PatternKind::ThreadEnd)?,
            frame_start: build(PatternKind::FrameStart)?,
            frame: build(PatternKind::Frame)?,
        };

        if !set.prompt.is_match(&set.prompt_text) {
            return Err(PatternError::PromptTextMismatch {
                text: set.prompt_text,
            });
        }
        Ok(set)
    }

    /// Text used when the session has to invent a prompt.
    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    /// First prompt in `text`.
    pub fn find_prompt(&self, text: &str) -> Option<Range<usize>> {
        self.prompt.find(text).map(|m| m.range())
    }

    /// End offset of the last prompt in `text`.
    pub fn last_prompt_end(&self, text: &str) -> Option<usize> {
        self.prompt.find_iter(text).last().map(|m| m.end())
    }

    pub fn is_confirmation(&self, text: &str) -> bool {
        self.confirmation.is_match(text)
    }

    /// Earliest thread-stop or frame marker start in `line`. Thread-stop wins
    /// a tie.
    pub fn marker_start(&self, line: &str) -> Option<MarkerStart> {
        let thread = self.thread_start.find(line).map(|m| MarkerStart {
            kind: MarkerKind::ThreadStop,
            offset: m.start(),
        });
        let frame = self.frame_start.find(line).map(|m| MarkerStart {
            kind: MarkerKind::Frame,
            offset: m.start(),
        });
        match (thread, frame) {
            (Some(t), Some(f)) if f.offset < t.offset => Some(f),
            (Some(t), _) => Some(t),
            (None, f) => f,
        }
    }

    /// Thread-stop marker with a parseable location.
    pub fn thread_stop(&self, block: &str) -> Option<ThreadStopMatch> {
        let caps = self.thread_stop.captures(block)?;
        let location = location_from(&caps, PatternKind::ThreadStop)?;
        let reason = caps.name("reason")?.as_str().trim().to_string();
        Some(ThreadStopMatch { location, reason })
    }

    /// Span of the `Target N: (name) stopped.` text, if present.
    pub fn stop_terminator(&self, block: &str) -> Option<Range<usize>> {
        self.thread_end.find(block).map(|m| m.range())
    }

    /// Location of the frame marker that ends `block`.
    pub fn frame_location(&self, block: &str) -> Option<SourceLocation> {
        let caps = self.frame.captures(block)?;
        location_from(&caps, PatternKind::Frame)
    }
}

fn compile(kind: PatternKind, source: &str) -> Result<Regex, PatternError> {
    let regex = Regex::new(source).map_err(|source_err| PatternError::Invalid {
        kind,
        pattern: source.to_string(),
        source: source_err,
    })?;

    for &group in kind.required_captures() {
        if !regex.capture_names().flatten().any(|name| name == group) {
            return Err(PatternError::MissingCapture { kind, group });
        }
    }
    if kind.must_consume() && regex.is_match("") {
        return Err(PatternError::MatchesEmpty { kind });
    }
    Ok(regex)
}

fn location_from(caps: &Captures<'_>, kind: PatternKind) -> Option<SourceLocation> {
    let file = caps.name("file")?.as_str().trim();
    let raw_line = caps.name("line")?.as_str();
    match raw_line.parse::<u32>() {
        Ok(line) if line > 0 && !file.is_empty() => Some(SourceLocation::new(file, line)),
        _ => {
            tracing::warn!(%kind, file, line = raw_line, "marker location is not usable");
            None
        }
    }
}
