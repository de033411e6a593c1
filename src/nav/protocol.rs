use crate::debugger::LocationUpdate;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const EVENT_STOPPED: &str = "stopped";
pub const EVENT_FRAME: &str = "frame";

/// One side-channel message for the navigation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavMessage {
    pub seq: u64,
    #[serde(rename = "type")]
    pub msg_type: String,
    pub event: String,
    pub body: LocationBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub source: Source,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub path: String,
}

impl NavMessage {
    pub fn from_update(seq: u64, update: &LocationUpdate) -> Self {
        let path = update.location.file.clone();
        let name = Path::new(&path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&path)
            .to_string();
        let event = if update.reason.is_some() {
            EVENT_STOPPED
        } else {
            EVENT_FRAME
        };

        Self {
            seq,
            msg_type: "event".to_string(),
            event: event.to_string(),
            body: LocationBody {
                reason: update.reason.clone(),
                source: Source { name, path },
                line: update.location.line,
            },
        }
    }
}
