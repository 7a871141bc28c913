//! The two cells of shared state: the latest frame on disk and the latest
//! detection record in memory. Each is guarded by its own readers-writer lock
//! and they are never updated together atomically.

mod detection;
mod frame;

pub use detection::{DetectionRecord, DetectionStore};
pub use frame::FrameStore;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Nothing has been stored yet")]
    NotFound,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
