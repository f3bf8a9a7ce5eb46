use std::collections::BTreeSet;
use std::fs::{self, Permissions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{error, info, instrument};

use crate::storefront::etl::error::{EtlError, Result};
use crate::storefront::etl::model::ConsolidatedRecord;

/// Persists the consolidated records, logging instead of failing.
///
/// Returns whether the snapshot was written so callers that need the
/// guarantee can check it.
pub fn persist(path: &Path, records: &[ConsolidatedRecord]) -> bool {
    match write_snapshot(path, records) {
        Ok(()) => {
            info!(path = %path.display(), count = records.len(), "snapshot written");
            true
        }
        Err(err) => {
            error!(path = %path.display(), error = %err, "failed to write snapshot");
            false
        }
    }
}

/// Writes the records as a JSON array, replacing any prior snapshot.
///
/// The data is written to a temporary file next to the destination and
/// renamed over it, so readers never observe a partial snapshot. The snapshot
/// keeps the permissions of the file it replaces.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn write_snapshot(path: &Path, records: &[ConsolidatedRecord]) -> Result<()> {
    let sink_error = |reason: String| EtlError::SinkWrite {
        path: path.to_path_buf(),
        reason,
    };

    let json = serde_json::to_string_pretty(records)?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staging =
        NamedTempFile::new_in(directory).map_err(|err| sink_error(err.to_string()))?;
    staging
        .write_all(json.as_bytes())
        .map_err(|err| sink_error(err.to_string()))?;
    staging
        .as_file()
        .sync_all()
        .map_err(|err| sink_error(err.to_string()))?;
    if let Some(permissions) = snapshot_permissions(path) {
        staging
            .as_file()
            .set_permissions(permissions)
            .map_err(|err| sink_error(err.to_string()))?;
    }
    staging
        .persist(path)
        .map_err(|err| sink_error(err.error.to_string()))?;
    Ok(())
}

/// Permissions for a rewritten snapshot: those of the existing file, or
/// world-readable for a new one. Temporary files start out owner-only.
fn snapshot_permissions(path: &Path) -> Option<Permissions> {
    match fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => default_permissions(),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<Permissions> {
    None
}

/// Loads and validates the last persisted snapshot.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn load_persisted(path: &Path) -> Result<Vec<ConsolidatedRecord>> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(EtlError::SnapshotNotFound(path.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    };

    let parse_error = |reason: String| EtlError::SnapshotParse {
        path: path.to_path_buf(),
        reason,
    };

    let records: Vec<ConsolidatedRecord> =
        serde_json::from_str(&data).map_err(|err| parse_error(err.to_string()))?;
    let mut seen = BTreeSet::new();
    for record in &records {
        record
            .check()
            .map_err(|reason| parse_error(format!("record {}: {reason}", record.id)))?;
        if !seen.insert(record.id) {
            return Err(parse_error(format!("duplicate record id {}", record.id)));
        }
    }

    Ok(records)
}
