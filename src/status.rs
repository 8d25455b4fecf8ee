use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const STATUS_IDLE: &str = "idle";
pub const STATUS_RECORDING: &str = "recording";

/// Last reported recording lifecycle event.
///
/// `status` carries the lifecycle name as text (idle, starting, recording,
/// stopping, error); the decoder reports free text and the loose voltage
/// extraction regime depends on seeing it verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordingStatus {
    pub fn idle() -> Self {
        Self {
            status: STATUS_IDLE.to_string(),
            timestamp: None,
            error: None,
        }
    }
}

/// Single-slot, last-write-wins store of the most recent recording status.
///
/// `set` replaces the slot entirely; `get` reports absence as an explicit
/// idle status so pollers never special-case "no data yet".
#[derive(Clone, Default)]
pub struct StatusStore {
    slot: Arc<RwLock<Option<RecordingStatus>>>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, status: RecordingStatus) {
        *self.slot.write().unwrap() = Some(status);
    }

    pub fn get(&self) -> RecordingStatus {
        self.slot
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(RecordingStatus::idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_defaults_to_idle() {
        let store = StatusStore::new();
        let status = store.get();
        assert_eq!(status.status, STATUS_IDLE);
        assert!(status.timestamp.is_none());
        assert!(status.error.is_none());
    }

    #[test]
    fn test_set_replaces_slot_entirely() {
        let store = StatusStore::new();
        store.set(RecordingStatus {
            status: "starting".to_string(),
            timestamp: Some(Utc::now()),
            error: None,
        });
        store.set(RecordingStatus {
            status: "error".to_string(),
            timestamp: None,
            error: Some("no audio device".to_string()),
        });

        let status = store.get();
        assert_eq!(status.status, "error");
        // no merge with the previous write
        assert!(status.timestamp.is_none());
        assert_eq!(status.error.as_deref(), Some("no audio device"));
    }
}
