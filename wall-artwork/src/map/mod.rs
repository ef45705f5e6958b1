//! Saving and restoring environment snapshots.
//!
//! Both directions do their file and codec work on tokio's blocking pool and
//! resolve on the awaiting task, so callers on the main context get their
//! result back on the main context.

pub mod archive;

use bevy::log::{info, warn};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::MapError;
use crate::model::EnvironmentSnapshot;
use crate::session::collaborators::{ContentFetcher, TrackingSession};

/// Where a snapshot is loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapSource {
    Path(PathBuf),
    Remote(String),
}

impl MapSource {
    /// `http(s)://` locations are remote, everything else is a local path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Remote(location.to_string())
        } else {
            Self::Path(PathBuf::from(location))
        }
    }
}

/// Captures the session's current snapshot and writes it to `destination`.
///
/// The session may need several frames to produce a snapshot, so this awaits
/// it. Any existing file is removed first on a best-effort basis.
pub async fn save<S>(session: &S, destination: &Path) -> Result<(), MapError>
where
    S: TrackingSession + ?Sized,
{
    let Some(snapshot) = session.current_snapshot().await? else {
        return Err(MapError::NothingToSave);
    };
    write_snapshot(snapshot, destination.to_path_buf()).await
}

/// Encodes and atomically writes an already captured snapshot.
pub async fn write_snapshot(snapshot: EnvironmentSnapshot, destination: PathBuf) -> Result<(), MapError> {
    let anchors = snapshot.anchor_count();
    let written = destination.clone();
    tokio::task::spawn_blocking(move || write_blocking(&snapshot, &destination)).await??;
    info!("Saved environment with {} anchors to {}", anchors, written.display());
    Ok(())
}

fn write_blocking(snapshot: &EnvironmentSnapshot, destination: &Path) -> Result<(), MapError> {
    match std::fs::remove_file(destination) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove previous snapshot {}: {}", destination.display(), e),
    }

    let bytes = archive::encode(snapshot)?;

    // Temp file lives next to the destination so the rename stays on one filesystem.
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(&bytes)?;
    file.as_file().sync_all()?;
    file.persist(destination).map_err(|e| MapError::Io(e.error))?;
    Ok(())
}

/// Reads and decodes a snapshot from a local path or a remote location.
pub async fn load(source: &MapSource, fetcher: &dyn ContentFetcher) -> Result<EnvironmentSnapshot, MapError> {
    let snapshot = match source {
        MapSource::Path(path) => load_path(path.clone()).await?,
        MapSource::Remote(link) => {
            let bytes = fetcher.fetch(link).await?;
            tokio::task::spawn_blocking(move || archive::decode(&bytes)).await??
        }
    };
    info!("Loaded environment with {} anchors", snapshot.anchor_count());
    Ok(snapshot)
}

pub async fn load_path(path: PathBuf) -> Result<EnvironmentSnapshot, MapError> {
    tokio::task::spawn_blocking(move || {
        let bytes = std::fs::read(&path)?;
        archive::decode(&bytes)
    })
    .await?
}
