use crate::snapshot::{ArtifactNames, Snapshot, SnapshotInfo};
use crate::source::BlobSource;
use hybridrec_core::{Error, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Current snapshot plus what happened on the last load attempt
#[derive(Debug, Clone)]
pub struct SnapshotStatus {
    pub current: Option<SnapshotInfo>,
    pub last_error: Option<String>,
}

/// Owns the serving snapshot and swaps it atomically on reload.
///
/// Readers clone the `Arc` and keep using it for the whole request, so a
/// reload never exposes a half-built snapshot.
pub struct SnapshotManager {
    source: BlobSource,
    names: ArtifactNames,
    current: RwLock<Option<Arc<Snapshot>>>,
    last_error: RwLock<Option<String>>,
    reload_lock: Mutex<()>,
}

impl SnapshotManager {
    pub fn new(source: BlobSource, names: ArtifactNames) -> Self {
        Self {
            source,
            names,
            current: RwLock::new(None),
            last_error: RwLock::new(None),
            reload_lock: Mutex::new(()),
        }
    }

    /// Serve a snapshot that was built in memory
    pub fn with_snapshot(source: BlobSource, names: ArtifactNames, snapshot: Snapshot) -> Self {
        let manager = Self::new(source, names);
        *manager.current.write() = Some(Arc::new(snapshot));
        manager
    }

    /// First load at startup. A failure is kept; the manager then reports
    /// `ModelUnavailable` until a reload succeeds.
    pub async fn initialize(&self) -> Result<SnapshotInfo> {
        self.reload().await
    }

    /// Load a complete new snapshot and swap it in. On failure the previous
    /// snapshot, if any, keeps serving.
    pub async fn reload(&self) -> Result<SnapshotInfo> {
        let _guard = self.reload_lock.lock().await;

        info!("Loading snapshot from {}", self.source.location());
        match Snapshot::load(&self.source, &self.names).await {
            Ok(snapshot) => {
                let info = snapshot.info().clone();
                *self.current.write() = Some(Arc::new(snapshot));
                *self.last_error.write() = None;
                info!(
                    "Snapshot ready: {} interactions, {} embeddings",
                    info.interactions, info.embeddings
                );
                Ok(info)
            }
            Err(e) => {
                if self.current.read().is_some() {
                    error!("Snapshot load failed, keeping previous snapshot: {}", e);
                } else {
                    error!("Snapshot load failed, no snapshot to serve: {}", e);
                }
                *self.last_error.write() = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// The snapshot to serve this request from
    pub fn current(&self) -> Result<Arc<Snapshot>> {
        self.current.read().clone().ok_or(Error::ModelUnavailable)
    }

    pub fn is_ready(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn status(&self) -> SnapshotStatus {
        SnapshotStatus {
            current: self.current.read().as_ref().map(|s| s.info().clone()),
            last_error: self.last_error.read().clone(),
        }
    }

    pub fn source(&self) -> &BlobSource {
        &self.source
    }

    pub fn artifact_names(&self) -> &ArtifactNames {
        &self.names
    }
}
