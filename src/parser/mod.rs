mod lines;
mod patterns;
mod types;

pub use lines::LineAssembler;
pub use patterns::{PatternConfig, PatternKind, PatternSet, LLDB_PROMPT, PATTERN_CONFIG_VERSION};
pub use types::{MarkerKind, MarkerStart, SourceLocation, ThreadStopMatch};
