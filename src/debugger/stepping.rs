/// Per-session block state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockState {
    /// Lines are forwarded as soon as they are complete.
    #[default]
    Passthrough,
    /// Lines accumulate until the next prompt.
    Buffering,
}
