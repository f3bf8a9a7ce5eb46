use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::storefront::etl::config::EtlConfig;
use crate::storefront::etl::consolidate::{clean_and_seed, merge_patches};
use crate::storefront::etl::error::Result;
use crate::storefront::etl::io::{snapshot, source};
use crate::storefront::etl::model::{ConsolidatedRecord, SourceKind};

/// Outcome of a consolidation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Number of consolidated records produced, whether or not they were
    /// persisted.
    pub processed_count: usize,
    /// Whether the snapshot write succeeded.
    pub persisted: bool,
}

/// Runs the extract, consolidate, and persist stages against one set of
/// files. Concurrent `run` calls on the same pipeline execute one at a time.
#[derive(Debug, Default)]
pub struct Pipeline {
    config: EtlConfig,
    run_lock: Mutex<()>,
}

impl Pipeline {
    pub fn new(config: EtlConfig) -> Self {
        Self {
            config,
            run_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &EtlConfig {
        &self.config
    }

    /// Rebuilds the consolidated snapshot from both sources.
    ///
    /// Always reports the processed count; a failed snapshot write is logged
    /// and surfaced only through [`RunReport::persisted`].
    #[instrument(
        level = "info",
        skip_all,
        fields(
            primary = %self.config.primary_path.display(),
            patch = %self.config.patch_path.display(),
            snapshot = %self.config.snapshot_path.display()
        )
    )]
    pub fn run(&self) -> RunReport {
        let _guard = self.run_lock.lock().unwrap_or_else(PoisonError::into_inner);
        info!("consolidation run started");

        let primary = source::read_records(&self.config.primary_path, SourceKind::Primary);
        let patches = source::read_records(&self.config.patch_path, SourceKind::Patch);
        if primary.is_empty() && patches.is_empty() {
            warn!("no records extracted from either source");
        }

        let catalog = merge_patches(clean_and_seed(&primary), &patches);
        let records: Vec<ConsolidatedRecord> = catalog.into_values().collect();
        let persisted = snapshot::persist(&self.config.snapshot_path, &records);

        let report = RunReport {
            processed_count: records.len(),
            persisted,
        };
        info!(
            processed = report.processed_count,
            persisted, "consolidation run finished"
        );
        report
    }

    /// Returns the records of the last persisted snapshot.
    pub fn get(&self) -> Result<Vec<ConsolidatedRecord>> {
        snapshot::load_persisted(&self.config.snapshot_path)
    }
}
