use crate::parser::PatternKind;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Problems compiling a pattern set. Raised once, when a session is built.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid {kind} pattern `{pattern}`: {source}")]
    Invalid {
        kind: PatternKind,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{kind} pattern is missing capture group `{group}`")]
    MissingCapture {
        kind: PatternKind,
        group: &'static str,
    },

    #[error("{kind} pattern matches the empty string")]
    MatchesEmpty { kind: PatternKind },

    #[error("prompt text {text:?} is not matched by the prompt pattern")]
    PromptTextMismatch { text: String },

    #[error("unsupported pattern config version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

#[derive(Debug, Error)]
pub enum FilterError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("failed to read {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode navigation event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("cannot quote {0:?} for the debugger command line")]
    Quote(String),

    #[error("{0}")]
    Usage(String),
}
