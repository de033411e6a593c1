//! Demultiplexes lldb console output into display text and a current-location
//! side channel.
//!
//! Raw output chunks of any size go into a [`FilterSession`]; complete lines
//! are classified against a [`PatternSet`], thread-stop and frame markers are
//! buffered until the next prompt, and each resolved marker updates the
//! session's current [`SourceLocation`].

pub mod config;
pub mod debugger;
pub mod error;
pub mod executor;
pub mod nav;
pub mod parser;

pub use debugger::{FilterOutput, FilterSession, LocationUpdate};
pub use error::{FilterError, PatternError};
pub use parser::{PatternConfig, PatternSet, SourceLocation};
