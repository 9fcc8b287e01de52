use std::{
    collections::HashMap,
    fmt::Debug,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use log::*;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use crate::{
    db_types::{PaymentEntry, PaymentId, StatusRecord},
    traits::{StatusManagement, StoreError},
};

/// A payment status store backed by a single JSON file.
///
/// The file holds one JSON object mapping payment ids to status records. It is read once by [`JsonFileStore::load`]
/// and rewritten in full after every call to [`JsonFileStore::set`].
///
/// Cloning the store is cheap; all clones share the same state. Every mutation holds a single lock for both the
/// in-memory update and the file write, so concurrent writers from different worker threads cannot lose updates.
///
/// Files are written to a temporary file in the same directory and then renamed over the target, so a crash
/// mid-write leaves the previous copy intact.
#[derive(Clone)]
pub struct JsonFileStore {
    path: Arc<PathBuf>,
    state: Arc<Mutex<StoreState>>,
}

impl Debug for JsonFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JsonFileStore ({})", self.path.display())
    }
}

#[derive(Default)]
struct StoreState {
    records: HashMap<PaymentId, StatusRecord>,
    // ids in first-write order
    order: Vec<PaymentId>,
}

impl StoreState {
    fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let map = serde_json::from_slice::<Map<String, Value>>(bytes)?;
        let mut state = Self::default();
        for (id, value) in map {
            let record = serde_json::from_value::<StatusRecord>(value)?;
            state.insert(PaymentId(id), record);
        }
        Ok(state)
    }

    fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut map = Map::with_capacity(self.order.len());
        for id in &self.order {
            if let Some(record) = self.records.get(id) {
                map.insert(id.0.clone(), serde_json::to_value(record)?);
            }
        }
        serde_json::to_vec_pretty(&map)
    }

    fn insert(&mut self, id: PaymentId, record: StatusRecord) {
        if self.records.insert(id.clone(), record).is_none() {
            self.order.push(id);
        }
    }

    fn entries(&self) -> Vec<PaymentEntry> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).map(|r| PaymentEntry::new(id.clone(), r.clone())))
            .collect()
    }
}

impl JsonFileStore {
    /// Loads the store from `path`.
    ///
    /// This never fails. A missing file gives an empty store. A file that cannot be read or parsed is logged as an
    /// error and also gives an empty store; the broken file is overwritten on the next write.
    pub async fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => match StoreState::from_json(&bytes) {
                Ok(state) => {
                    info!("💾️ Loaded {} payment records from {}", state.order.len(), path.display());
                    state
                },
                Err(e) => {
                    error!(
                        "💾️ The payment store at {} is malformed and will be ignored. Starting with an empty store. {e}",
                        path.display()
                    );
                    StoreState::default()
                },
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("💾️ No payment store found at {}. Starting with an empty store.", path.display());
                StoreState::default()
            },
            Err(e) => {
                error!("💾️ Could not read the payment store at {}. Starting with an empty store. {e}", path.display());
                StoreState::default()
            },
        };
        Self { path: Arc::new(path), state: Arc::new(Mutex::new(state)) }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Writes the entire store to disk, replacing the previous file.
    pub async fn save(&self) -> Result<(), StoreError> {
        let state = self.state.lock().await;
        self.flush(&state).await
    }

    /// Inserts or replaces the record for `id` and flushes the store to disk before returning.
    ///
    /// If the flush fails, the in-memory change is kept and [`StoreError::Persistence`] is returned.
    pub async fn set(&self, id: PaymentId, record: StatusRecord) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        trace!("💾️ Setting status for payment {id} to {}", record.status);
        state.insert(id, record);
        self.flush(&state).await
    }

    pub async fn get(&self, id: &PaymentId) -> Option<StatusRecord> {
        self.state.lock().await.records.get(id).cloned()
    }

    /// Every record, in the order the ids were first written.
    pub async fn list(&self) -> Vec<PaymentEntry> {
        self.state.lock().await.entries()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    // Callers hold the state lock for the duration of the write.
    async fn flush(&self, state: &StoreState) -> Result<(), StoreError> {
        let bytes = state.to_json()?;
        let path = Arc::clone(&self.path);
        let count = state.order.len();
        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes))
            .await
            .map_err(|e| StoreError::Persistence(format!("Store writer task failed. {e}")))??;
        debug!("💾️ Flushed {count} payment records to {}", self.path.display());
        Ok(())
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl StatusManagement for JsonFileStore {
    async fn set_status(&self, id: &PaymentId, record: StatusRecord) -> Result<(), StoreError> {
        self.set(id.clone(), record).await
    }

    async fn fetch_status(&self, id: &PaymentId) -> Result<Option<StatusRecord>, StoreError> {
        Ok(self.get(id).await)
    }

    async fn fetch_all_statuses(&self) -> Result<Vec<PaymentEntry>, StoreError> {
        Ok(self.list().await)
    }
}
