use crate::parser::SourceLocation;

/// Holds the last source location resolved from a marker.
///
/// Only overwritten by a later resolution, never cleared.
#[derive(Debug, Default)]
pub struct LocationTracker {
    last: Option<SourceLocation>,
}

impl LocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&SourceLocation> {
        self.last.as_ref()
    }

    /// Record `location`. Returns whether it differs from the previous one.
    pub fn update(&mut self, location: SourceLocation) -> bool {
        let changed = self.last.as_ref() != Some(&location);
        if changed {
            tracing::debug!(%location, "current location moved");
        }
        self.last = Some(location);
        changed
    }
}
