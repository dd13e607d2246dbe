use crate::adapters::document::SlotDocument;
use crate::core::geo::SphericalCap;
use crate::domain::model::{ParkingSlot, SlotId, UserId};
use crate::domain::ports::{SlotFilter, SlotMutation, SlotRepository};
use crate::utils::error::{ParkingError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Slot store held in memory, optionally backed by a JSON snapshot file.
///
/// Opened once per process and shared behind an `Arc`. Conditional updates
/// test and set under a single write lock. After `shutdown` every call fails
/// with `Unavailable`.
pub struct InMemorySlotRepository {
    slots: RwLock<BTreeMap<SlotId, ParkingSlot>>,
    snapshot_path: Option<PathBuf>,
    closed: AtomicBool,
}

impl InMemorySlotRepository {
    pub fn from_slots(slots: impl IntoIterator<Item = ParkingSlot>) -> Self {
        Self {
            slots: RwLock::new(slots.into_iter().map(|s| (s.id.clone(), s)).collect()),
            snapshot_path: None,
            closed: AtomicBool::new(false),
        }
    }

    /// Loads the snapshot at `path`; a missing file starts an empty store.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let slots = match tokio::fs::read(&path).await {
            Ok(bytes) => decode_snapshot(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "No slot snapshot, starting empty");
                Vec::new()
            }
            Err(e) => {
                return Err(ParkingError::unavailable(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        tracing::info!(path = %path.display(), slots = slots.len(), "Slot store opened");

        let mut repository = Self::from_slots(slots);
        repository.snapshot_path = Some(path);
        Ok(repository)
    }

    /// Writes the snapshot one last time and refuses further calls.
    pub async fn shutdown(&self) -> Result<()> {
        {
            // closed flips under the write lock, so no update lands after the snapshot
            let _slots = self.slots.write().await;
            if self.closed.swap(true, Ordering::SeqCst) {
                return Ok(());
            }
        }
        self.write_snapshot().await?;
        tracing::info!("Slot store shut down");
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ParkingError::unavailable("slot store is shut down"));
        }
        Ok(())
    }

    async fn write_snapshot(&self) -> Result<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let documents: Vec<SlotDocument> = {
            let slots = self.slots.read().await;
            slots.values().map(SlotDocument::from).collect()
        };
        let json = serde_json::to_vec_pretty(&documents)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ParkingError::unavailable(format!("cannot create {}: {}", parent.display(), e)))?;
        }
        // write then rename so a crash never leaves a truncated snapshot
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| ParkingError::unavailable(format!("cannot write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| ParkingError::unavailable(format!("cannot write {}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), slots = documents.len(), "Slot snapshot written");
        Ok(())
    }
}

fn decode_snapshot(bytes: &[u8]) -> Result<Vec<ParkingSlot>> {
    let documents: Vec<SlotDocument> = serde_json::from_slice(bytes)?;
    documents.into_iter().map(ParkingSlot::try_from).collect()
}

#[async_trait]
impl SlotRepository for InMemorySlotRepository {
    async fn get(&self, id: &SlotId) -> Result<Option<ParkingSlot>> {
        self.ensure_open()?;
        Ok(self.slots.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<ParkingSlot>> {
        self.ensure_open()?;
        Ok(self.slots.read().await.values().cloned().collect())
    }

    async fn find_by_occupier(&self, user_id: &UserId) -> Result<Option<ParkingSlot>> {
        self.ensure_open()?;
        let slots = self.slots.read().await;
        let mut matches = slots
            .values()
            .filter(|slot| slot.occupier_id() == Some(user_id));

        let first = matches.next().cloned();
        let rest = matches.count();
        if rest > 0 {
            return Err(ParkingError::MultipleOccupations {
                user_id: user_id.to_string(),
                count: rest + 1,
            });
        }
        Ok(first)
    }

    async fn find_within_radius(&self, cap: &SphericalCap) -> Result<Vec<ParkingSlot>> {
        self.ensure_open()?;
        Ok(self
            .slots
            .read()
            .await
            .values()
            .filter(|slot| cap.contains(&slot.location))
            .cloned()
            .collect())
    }

    async fn conditional_update(&self, filter: &SlotFilter, mutation: &SlotMutation) -> Result<u64> {
        self.ensure_open()?;
        let mut slots = self.slots.write().await;
        self.ensure_open()?;
        match slots.get_mut(&filter.id) {
            Some(slot) if filter.matches(slot) => {
                mutation.apply(slot);
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}
