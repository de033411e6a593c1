mod commands;
mod flusher;
mod location;
mod session;
mod stepping;

pub use commands::{DebuggerAction, STARTUP_SETTINGS};
pub use flusher::{classify, is_step, render, BlockClass, LocationUpdate, Rendered};
pub use location::LocationTracker;
pub use session::{FilterOutput, FilterSession};
pub use stepping::BlockState;
