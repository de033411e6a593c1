mod emitter;
mod protocol;

pub use emitter::{read_message, NavEmitter};
pub use protocol::{LocationBody, NavMessage, Source, EVENT_FRAME, EVENT_STOPPED};
