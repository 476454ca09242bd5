//! Tracking store with a durable JSON snapshot.
//!
//! The in-memory `TrackingData` is authoritative. Every mutation rewrites the
//! whole snapshot; a failed write is logged and never reaches the caller.

use crate::{HealthdashError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::types::{TrackingData, TrackingEvent};

/// File-backed key-value slots.
///
/// Directory layout:
///   {dir}/{key}.json
#[derive(Debug, Clone)]
pub struct SlotStorage {
    dir: PathBuf,
}

impl SlotStorage {
    /// Open the slot directory, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read a slot. Returns None if nothing was ever written under `key`.
    pub async fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.slot_path(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn write(&self, key: &str, content: &str) -> Result<()> {
        let path = self.slot_path(key);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Remove a slot. Removing an absent slot is not an error.
    pub async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.slot_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", safe_key))
    }
}

/// Owns the three assessment sequences and mirrors them to a slot.
#[derive(Debug)]
pub struct TrackingStore {
    data: TrackingData,
    slots: SlotStorage,
    key: String,
}

impl TrackingStore {
    /// Open the store and restore the last snapshot.
    ///
    /// A corrupt or unreadable snapshot is logged and the store starts empty.
    pub async fn open(slots: SlotStorage, key: impl Into<String>) -> Self {
        let mut store = Self {
            data: TrackingData::default(),
            slots,
            key: key.into(),
        };
        match store.load().await {
            Ok(data) => {
                info!(
                    pain = data.pain_assessments.len(),
                    sleep = data.sleep_quality.len(),
                    mood = data.mood_assessments.len(),
                    "Loaded tracking snapshot"
                );
                store.data = data;
            }
            Err(e) => warn!("{}; starting with no prior data", e),
        }
        store
    }

    /// Read the durable snapshot without touching in-memory state.
    pub async fn load(&self) -> Result<TrackingData> {
        let content = self
            .slots
            .read(&self.key)
            .await
            .map_err(|e| HealthdashError::PersistenceRead(e.to_string()))?;
        match content {
            None => Ok(TrackingData::default()),
            Some(content) => serde_json::from_str(&content)
                .map_err(|e| HealthdashError::PersistenceRead(e.to_string())),
        }
    }

    /// Write the full current state to the snapshot slot.
    pub async fn save(&self) -> Result<()> {
        let content = serde_json::to_string(&self.data)
            .map_err(|e| HealthdashError::PersistenceWrite(e.to_string()))?;
        self.slots
            .write(&self.key, &content)
            .await
            .map_err(|e| HealthdashError::PersistenceWrite(e.to_string()))?;
        debug!(events = self.data.total_len(), "Saved tracking snapshot");
        Ok(())
    }

    /// Append an event to the tail of its sequence and persist.
    pub async fn append(&mut self, event: TrackingEvent) {
        debug!(kind = %event.kind(), id = event.id(), "Appending event");
        self.data.push(event);
        self.persist().await;
    }

    /// Append several events with a single snapshot write.
    pub async fn extend(&mut self, events: impl IntoIterator<Item = TrackingEvent>) {
        for event in events {
            self.data.push(event);
        }
        self.persist().await;
    }

    /// Drop every sequence and remove the snapshot.
    pub async fn clear(&mut self) {
        self.data = TrackingData::default();
        if let Err(e) = self.slots.remove(&self.key).await {
            warn!("Failed to remove tracking snapshot: {}", e);
        }
        info!("Cleared tracking data");
    }

    pub fn data(&self) -> &TrackingData {
        &self.data
    }

    async fn persist(&self) {
        if let Err(e) = self.save().await {
            warn!("{}; in-memory state is kept", e);
        }
    }
}
