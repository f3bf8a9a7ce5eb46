use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::{debug, info};

use crate::storefront::etl::config::EtlConfig;
use crate::storefront::etl::error::Result;

/// Reference catalog. Two entries carry a zero price or stock and are dropped
/// during cleaning.
pub fn sample_primary() -> Value {
    json!([
        {"id": 1, "name": "Laptop Alpha", "category": "Laptops", "price": 25000.00, "stock": 10},
        {"id": 2, "name": "Smartphone Beta", "category": "Smartphones", "price": 12000.00, "stock": 25},
        {"id": 3, "name": "Headphones Gamma", "category": "Audio", "price": 0, "stock": 5},
        {"id": 4, "name": "Tablet Delta", "category": "Tablets", "price": 8500.00, "stock": 0}
    ])
}

/// Reference patch source: an update with a price change, a new product, and
/// a stock and supplier update.
pub fn sample_patches() -> Value {
    json!([
        {
            "product_id": 1,
            "description": "High-performance laptop for professionals.",
            "supplier": "SupplierX",
            "old_price": 26000.00,
            "price": 24500.00
        },
        {
            "product_id": 5,
            "name": "Smartwatch Epsilon",
            "category": "Wearables",
            "description": "Latest generation smartwatch.",
            "supplier": "SupplierY",
            "price": 7500.00,
            "stock": 30
        },
        {"product_id": 2, "supplier": "SupplierZ", "stock": 30}
    ])
}

/// Writes the reference sources to the configured paths. Existing files are
/// left untouched. Returns the paths that were created.
pub fn write_samples(config: &EtlConfig) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    for (path, document) in [
        (&config.primary_path, sample_primary()),
        (&config.patch_path, sample_patches()),
    ] {
        if write_if_absent(path, &document)? {
            created.push(path.clone());
        }
    }
    Ok(created)
}

fn write_if_absent(path: &Path, document: &Value) -> Result<bool> {
    if path.exists() {
        debug!(path = %path.display(), "source already present, leaving it in place");
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(document)?)?;
    info!(path = %path.display(), "created sample source");
    Ok(true)
}
