use super::StoreError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub status: String,
    pub detail: String,
}

/// Holds the most recent detection reported by the camera side.
#[derive(Debug, Default)]
pub struct DetectionStore {
    latest: RwLock<Option<DetectionRecord>>,
}

impl DetectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, record: DetectionRecord) {
        *self.latest.write() = Some(record);
    }

    pub fn get(&self) -> Result<DetectionRecord, StoreError> {
        self.latest.read().clone().ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: &str, detail: &str) -> DetectionRecord {
        DetectionRecord {
            status: status.to_string(),
            detail: detail.to_string(),
        }
    }

    #[test]
    fn test_get_before_set_is_not_found() {
        let store = DetectionStore::new();
        assert!(matches!(store.get(), Err(StoreError::NotFound)));
    }

    #[test]
    fn test_last_writer_wins() {
        let store = DetectionStore::new();
        store.set(record("person", "front door"));
        store.set(record("unknown", "garage"));

        assert_eq!(store.get().unwrap(), record("unknown", "garage"));
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let json = serde_json::to_string(&record("person", "front door")).unwrap();
        assert_eq!(json, r#"{"status":"person","detail":"front door"}"#);
    }
}
