use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved source position: full path plus 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Captures of a thread-stop marker that carries a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadStopMatch {
    pub location: SourceLocation,
    pub reason: String,
}

/// Which kind of marker opened a buffered block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    ThreadStop,
    Frame,
}

/// Where a marker begins inside a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStart {
    pub kind: MarkerKind,
    pub offset: usize,
}
