//! Snapshot-backed store.
//!
//! Keeps the full state in memory and rewrites a snapshot file after every
//! committed write. The file is written to a temporary sibling, synced,
//! and renamed over the previous snapshot, so a crash leaves either the old or
//! the new state on disk.
//!
//! File layout: magic bytes, one version byte, then a JSON document holding
//! providers and service areas in insertion order.

use super::memory::MemoryState;
use super::{Store, StoreOp, StoreStats};
use crate::error::{GeofenceError, Result};
use geofence_types::area::ServiceArea;
use geofence_types::provider::Provider;
use parking_lot::{Mutex, RwLock};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const SNAPSHOT_MAGIC: &[u8] = b"GEOFENCE_SNAPSHOT";
const SNAPSHOT_VERSION: u8 = 1;

#[derive(serde::Serialize)]
struct SnapshotRef<'a> {
    providers: Vec<&'a Provider>,
    service_areas: Vec<&'a ServiceArea>,
}

#[derive(serde::Deserialize)]
struct SnapshotData {
    providers: Vec<Provider>,
    service_areas: Vec<ServiceArea>,
}

pub struct SnapshotStore {
    path: PathBuf,
    state: RwLock<MemoryState>,
    commit_lock: Mutex<()>,
}

impl SnapshotStore {
    /// Open a snapshot file, loading its contents if it exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = load(&path)?;

        log::info!(
            "Opened snapshot {} ({} providers, {} service areas)",
            path.display(),
            state.provider_count(),
            state.service_area_count()
        );

        Ok(Self {
            path,
            state: RwLock::new(state),
            commit_lock: Mutex::new(()),
        })
    }

    /// Apply operations to a copy of the state, write it to disk, then swap it
    /// in. Readers keep using the current state until the swap, which is the
    /// only step that takes the write lock. Each commit rewrites the whole
    /// file, so its cost grows with the number of stored rows.
    fn commit(&self, ops: &[StoreOp]) -> Result<()> {
        let _commit = self.commit_lock.lock();

        let mut next = self.state.read().clone();
        next.batch(ops);
        save(&self.path, &next)?;

        *self.state.write() = next;
        Ok(())
    }
}

impl Store for SnapshotStore {
    fn find_provider_by_id(&self, id: &Uuid) -> Result<Option<Provider>> {
        Ok(self.state.read().find_provider_by_id(id))
    }

    fn find_provider_by_name(&self, name: &str) -> Result<Option<Provider>> {
        Ok(self.state.read().find_provider_by_name(name))
    }

    fn list_providers(&self, offset: usize, limit: usize) -> Result<Vec<Provider>> {
        Ok(self.state.read().list_providers(offset, limit))
    }

    fn provider_count(&self) -> Result<usize> {
        Ok(self.state.read().provider_count())
    }

    fn save_provider(&self, provider: &Provider) -> Result<()> {
        self.commit(&[StoreOp::SaveProvider(provider.clone())])
    }

    fn delete_provider(&self, id: &Uuid) -> Result<Option<Provider>> {
        let Some(existing) = self.find_provider_by_id(id)? else {
            return Ok(None);
        };
        self.commit(&[StoreOp::DeleteProvider(*id)])?;
        Ok(Some(existing))
    }

    fn find_service_area_by_id(&self, id: &Uuid) -> Result<Option<ServiceArea>> {
        Ok(self.state.read().find_service_area_by_id(id))
    }

    fn list_service_areas(&self, offset: usize, limit: usize) -> Result<Vec<ServiceArea>> {
        Ok(self.state.read().list_service_areas(offset, limit))
    }

    fn service_area_count(&self) -> Result<usize> {
        Ok(self.state.read().service_area_count())
    }

    fn service_areas_by_provider(&self, provider: &Uuid) -> Result<Vec<ServiceArea>> {
        Ok(self.state.read().service_areas_by_provider(provider))
    }

    fn save_service_area(&self, area: &ServiceArea) -> Result<()> {
        self.commit(&[StoreOp::SaveServiceArea(area.clone())])
    }

    fn delete_service_area(&self, id: &Uuid) -> Result<Option<ServiceArea>> {
        let Some(existing) = self.find_service_area_by_id(id)? else {
            return Ok(None);
        };
        self.commit(&[StoreOp::DeleteServiceArea(*id)])?;
        Ok(Some(existing))
    }

    fn load_all_service_areas(&self) -> Result<Vec<ServiceArea>> {
        Ok(self.state.read().service_areas().cloned().collect())
    }

    fn batch(&self, ops: &[StoreOp]) -> Result<()> {
        if ops.is_empty() {
            return Ok(());
        }
        self.commit(ops)
    }

    fn stats(&self) -> Result<StoreStats> {
        Ok(self.state.read().stats())
    }
}

fn load(path: &Path) -> Result<MemoryState> {
    let mut state = MemoryState::new();
    if !path.exists() {
        return Ok(state);
    }

    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(state);
    }

    let mut reader = BufReader::new(file);

    let mut magic = vec![0u8; SNAPSHOT_MAGIC.len()];
    reader.read_exact(&mut magic)?;
    if magic != SNAPSHOT_MAGIC {
        return Err(GeofenceError::Storage(format!(
            "{} is not a geofence snapshot",
            path.display()
        )));
    }

    let mut version = [0u8; 1];
    reader.read_exact(&mut version)?;
    if version[0] != SNAPSHOT_VERSION {
        return Err(GeofenceError::Storage(format!(
            "Unsupported snapshot version {}",
            version[0]
        )));
    }

    let data: SnapshotData = serde_json::from_reader(reader)?;
    let ops: Vec<StoreOp> = data
        .providers
        .into_iter()
        .map(StoreOp::SaveProvider)
        .chain(data.service_areas.into_iter().map(StoreOp::SaveServiceArea))
        .collect();
    state.batch(&ops);

    Ok(state)
}

fn save(path: &Path, state: &MemoryState) -> Result<()> {
    let temp_path = temp_path(path);

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)?;

    let mut writer = BufWriter::new(file);
    writer.write_all(SNAPSHOT_MAGIC)?;
    writer.write_all(&[SNAPSHOT_VERSION])?;

    let snapshot = SnapshotRef {
        providers: state.providers().collect(),
        service_areas: state.service_areas().collect(),
    };
    serde_json::to_writer(&mut writer, &snapshot)?;

    writer.flush()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&temp_path, path)?;
    sync_parent_dir(path)?;

    log::debug!("Wrote snapshot {}", path.display());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut temp = path.to_path_buf();
    if let Some(name) = temp.file_name() {
        let mut new_name = name.to_string_lossy().into_owned();
        new_name.push_str(".tmp");
        temp.set_file_name(new_name);
    }
    temp
}

fn sync_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let dir = File::open(parent)?;
        dir.sync_all()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geofence_types::area::AreaGeometry;
    use geofence_types::provider::NewProvider;
    use tempfile::TempDir;

    fn provider(name: &str) -> Provider {
        NewProvider {
            name: name.to_string(),
            email: "ops@example.com".to_string(),
            phone_number: "123456".to_string(),
            language: "pt-BR".to_string(),
            currency: "EUR".to_string(),
        }
        .into_provider(Uuid::new_v4())
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(dir.path().join("geofence.snapshot")).unwrap();
        assert_eq!(store.stats().unwrap(), StoreStats::default());
    }

    #[test]
    fn test_reopen_restores_state_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("geofence.snapshot");

        let first = provider("First");
        let second = provider("Second");
        let zone = ServiceArea {
            id: Uuid::new_v4(),
            provider: second.id,
            name: "Zone".to_string(),
            price: 250,
            area: AreaGeometry::Polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]]),
        };

        {
            let store = SnapshotStore::open(&path).unwrap();
            store.save_provider(&first).unwrap();
            store.save_provider(&second).unwrap();
            store.save_service_area(&zone).unwrap();
        }

        let store = SnapshotStore::open(&path).unwrap();
        let names: Vec<_> = store
            .list_providers(0, 10)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(store.load_all_service_areas().unwrap(), vec![zone]);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_rejects_foreign_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.bin");
        std::fs::write(&path, b"definitely not a snapshot").unwrap();

        assert!(matches!(
            SnapshotStore::open(&path),
            Err(GeofenceError::Storage(_))
        ));
    }

    #[test]
    fn test_failed_write_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("geofence.snapshot");
        let store = SnapshotStore::open(&path).unwrap();

        // The parent directory does not exist, so the write fails.
        assert!(store.save_provider(&provider("Lost")).is_err());
        assert_eq!(store.provider_count().unwrap(), 0);
    }

    #[test]
    fn test_reads_do_not_wait_for_commits() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(dir.path().join("geofence.snapshot")).unwrap();
        let acme = provider("Acme");
        store.save_provider(&acme).unwrap();

        // A commit in flight holds only the commit lock until its file is
        // on disk.
        let _in_flight = store.commit_lock.lock();
        assert_eq!(store.find_provider_by_id(&acme.id).unwrap(), Some(acme.clone()));
        assert_eq!(store.list_providers(0, 10).unwrap().len(), 1);
        assert_eq!(store.stats().unwrap().providers, 1);
    }
}
