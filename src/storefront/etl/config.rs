use std::path::{Path, PathBuf};

/// Default location of the primary catalog.
pub const DEFAULT_PRIMARY_PATH: &str = "source_products_branch_A.json";
/// Default location of the patch source.
pub const DEFAULT_PATCH_PATH: &str = "source_additional_info_branch_B.json";
/// Default location of the consolidated snapshot.
pub const DEFAULT_SNAPSHOT_PATH: &str = "consolidated_electronics_store.json";

/// File locations used by a consolidation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlConfig {
    pub primary_path: PathBuf,
    pub patch_path: PathBuf,
    pub snapshot_path: PathBuf,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            primary_path: PathBuf::from(DEFAULT_PRIMARY_PATH),
            patch_path: PathBuf::from(DEFAULT_PATCH_PATH),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
        }
    }
}

impl EtlConfig {
    /// Places the three default file names inside `directory`.
    pub fn in_directory(directory: &Path) -> Self {
        Self {
            primary_path: directory.join(DEFAULT_PRIMARY_PATH),
            patch_path: directory.join(DEFAULT_PATCH_PATH),
            snapshot_path: directory.join(DEFAULT_SNAPSHOT_PATH),
        }
    }
}
