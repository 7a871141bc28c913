use super::StoreError;
use bytes::Bytes;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::sync::RwLock;
use tracing::instrument;

/// Latest uploaded frame, kept as a single file that every write replaces.
#[derive(Debug)]
pub struct FrameStore {
    file: RwLock<PathBuf>,
}

impl FrameStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: RwLock::new(path.into()),
        }
    }

    pub async fn path(&self) -> PathBuf {
        self.file.read().await.clone()
    }

    /// Truncates the backing file and writes `data` while holding the write
    /// lock, so readers see either the old or the new frame in full.
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn write(&self, data: &[u8]) -> Result<(), StoreError> {
        let path = self.file.write().await;
        tokio::fs::write(path.as_path(), data).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn read(&self) -> Result<Bytes, StoreError> {
        let path = self.file.read().await;
        read_frame(path.as_path()).await
    }
}

async fn read_frame(path: &Path) -> Result<Bytes, StoreError> {
    match tokio::fs::read(path).await {
        Ok(data) => Ok(Bytes::from(data)),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound),
        Err(e) => Err(StoreError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_read_before_write_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FrameStore::new(dir.path().join("latest_frame.jpg"));

        assert!(matches!(store.read().await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_shorter_frame_replaces_longer_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = FrameStore::new(dir.path().join("latest_frame.jpg"));

        store.write(&[0xFF, 0xD8, 1, 2, 3, 4, 5, 0xFF, 0xD9]).await.unwrap();
        store.write(&[0xFF, 0xD8, 9, 0xFF, 0xD9]).await.unwrap();

        let frame = store.read().await.unwrap();
        assert_eq!(&frame[..], &[0xFF, 0xD8, 9, 0xFF, 0xD9]);
    }

    #[tokio::test]
    async fn test_write_into_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FrameStore::new(dir.path());

        assert!(matches!(
            store.write(b"frame").await,
            Err(StoreError::Io(_))
        ));
        assert_eq!(store.path().await, dir.path());
    }

    #[tokio::test]
    async fn test_concurrent_readers_never_see_torn_frames() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FrameStore::new(dir.path().join("latest_frame.jpg")));
        let frame_a = vec![b'a'; 256 * 1024];
        let frame_b = vec![b'b'; 128 * 1024];
        store.write(&frame_a).await.unwrap();

        let writer = {
            let store = store.clone();
            let (frame_a, frame_b) = (frame_a.clone(), frame_b.clone());
            tokio::spawn(async move {
                for i in 0..20 {
                    let frame = if i % 2 == 0 { &frame_b } else { &frame_a };
                    store.write(frame).await.unwrap();
                }
            })
        };

        for _ in 0..20 {
            let frame = store.read().await.unwrap();
            assert!(frame[..] == frame_a[..] || frame[..] == frame_b[..]);
        }
        writer.await.unwrap();
    }
}
