use std::path::PathBuf;

use log::*;
use tempfile::TempDir;

use crate::JsonFileStore;

pub fn prepare_test_env() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
}

/// A store file path inside `dir` that does not exist yet.
pub fn random_store_path(dir: &TempDir) -> PathBuf {
    dir.path().join(format!("test_store_{}.json", std::process::id()))
}

/// Creates an empty store in a fresh temporary directory. Keep the returned `TempDir` alive for as long as the store
/// is in use; the directory is deleted when it is dropped.
pub async fn temp_store() -> (TempDir, JsonFileStore) {
    prepare_test_env();
    let dir = TempDir::new().expect("Error creating temporary directory");
    let path = random_store_path(&dir);
    let store = JsonFileStore::load(&path).await;
    info!("🚀️ Created test store at {}", path.display());
    (dir, store)
}
