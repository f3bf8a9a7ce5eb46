//! Cleaning, seeding, and patch merging of catalog records.
//!
//! Both stages accept loosely-typed JSON values and isolate every failure to
//! the record that caused it: a rejected record is logged and skipped while
//! its siblings continue through the pass.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::storefront::etl::error::{EtlError, Result};
use crate::storefront::etl::model::{
    ConsolidatedRecord, PatchRecord, PrimaryRecord, ProductId, SourceKind,
};
use crate::storefront::etl::normalize::normalize_category;

/// Consolidated records keyed by identifier.
pub type Catalog = BTreeMap<ProductId, ConsolidatedRecord>;

/// Cleans the primary candidates and seeds a catalog from the survivors.
///
/// Candidates with a non-positive price or stock are dropped, as are
/// candidates that do not match the primary shape. Categories are normalized.
/// A repeated identifier replaces the earlier entry.
pub fn clean_and_seed(primary: &[Value]) -> Catalog {
    let mut catalog = Catalog::new();

    for raw in primary {
        match seed_record(raw) {
            Ok(Some(record)) => {
                if catalog.contains_key(&record.id) {
                    warn!(
                        id = record.id,
                        "duplicate primary identifier, keeping the later entry"
                    );
                }
                catalog.insert(record.id, record);
            }
            Ok(None) => {}
            Err(error) => {
                warn!(id = ?raw.get("id"), %error, "skipping invalid primary record");
            }
        }
    }

    info!(
        seeded = catalog.len(),
        candidates = primary.len(),
        "seeded catalog from primary source"
    );
    catalog
}

fn seed_record(raw: &Value) -> Result<Option<ConsolidatedRecord>> {
    let price = numeric_or_zero(raw, "price")?;
    let stock = numeric_or_zero(raw, "stock")?;
    if price <= 0.0 || stock <= 0.0 {
        info!(
            id = ?raw.get("id"),
            price,
            stock,
            "skipping primary record with zero price or stock"
        );
        return Ok(None);
    }

    let record: PrimaryRecord = serde_json::from_value(raw.clone())
        .map_err(|err| EtlError::validation(SourceKind::Primary, err.to_string()))?;
    record
        .check()
        .map_err(|reason| EtlError::validation(SourceKind::Primary, reason))?;

    Ok(Some(ConsolidatedRecord::new(
        record.id,
        record.name,
        normalize_category(&record.category),
        record.price,
        record.stock,
    )))
}

/// Reads a numeric field for the sellability filter. A missing field counts as
/// zero; a present non-numeric value is a validation failure.
fn numeric_or_zero(raw: &Value, field: &str) -> Result<f64> {
    match raw.get(field) {
        None | Some(Value::Null) => Ok(0.0),
        Some(value) => value.as_f64().ok_or_else(|| {
            EtlError::validation(
                SourceKind::Primary,
                format!("field '{field}' is not a number: {value}"),
            )
        }),
    }
}

/// Applies the patch candidates, in order, to a seeded catalog.
///
/// A patch whose identifier exists updates only the fields it supplies. Any
/// other patch introduces a new record and receives a fresh identifier one
/// greater than the largest identifier seen so far in this pass; it is never
/// matched against identifiers handed out earlier in the same pass.
pub fn merge_patches(mut catalog: Catalog, patches: &[Value]) -> Catalog {
    let mut max_id = catalog.keys().next_back().copied().unwrap_or(0);
    let mut updated = 0usize;
    let mut inserted = 0usize;
    let existing: BTreeSet<ProductId> = catalog.keys().copied().collect();

    for raw in patches {
        let patch = match parse_patch(raw) {
            Ok(patch) => patch,
            Err(error) => {
                warn!(product_id = ?raw.get("product_id"), %error, "skipping invalid patch record");
                continue;
            }
        };

        let target = if existing.contains(&patch.product_id) {
            catalog.get_mut(&patch.product_id)
        } else {
            None
        };

        match target {
            Some(record) => {
                debug!(id = patch.product_id, "updating existing product from patch");
                apply_patch(record, &patch);
                updated += 1;
            }
            None => match next_id(max_id).and_then(|id| new_record(&patch, id)) {
                Ok(record) => {
                    max_id = record.id;
                    info!(
                        source_id = patch.product_id,
                        id = record.id,
                        "adding new product from patch"
                    );
                    catalog.insert(record.id, record);
                    inserted += 1;
                }
                Err(error) => {
                    warn!(product_id = patch.product_id, %error, "skipping new product from patch");
                }
            },
        }
    }

    info!(updated, inserted, total = catalog.len(), "merged patch source");
    catalog
}

fn parse_patch(raw: &Value) -> Result<PatchRecord> {
    let patch: PatchRecord = serde_json::from_value::<PatchRecord>(raw.clone())
        .map_err(|err| EtlError::validation(SourceKind::Patch, err.to_string()))?
        .without_blank_fields();
    patch
        .check()
        .map_err(|reason| EtlError::validation(SourceKind::Patch, reason))?;
    Ok(patch)
}

fn apply_patch(record: &mut ConsolidatedRecord, patch: &PatchRecord) {
    if let Some(name) = &patch.name {
        record.name = name.clone();
    }
    if let Some(category) = &patch.category {
        record.category = normalize_category(category);
    }
    if let Some(description) = &patch.description {
        record.description = Some(description.clone());
    }
    if let Some(supplier) = &patch.supplier {
        record.supplier = Some(supplier.clone());
    }

    let new_price = patch.price.unwrap_or(record.price);
    let reference_price = patch.old_price.unwrap_or(record.price);
    if let Some(change) = price_change_percentage(reference_price, new_price) {
        record.price_change_percentage = Some(change);
    }

    if let Some(price) = patch.price {
        record.price = price;
    }
    if let Some(stock) = patch.stock {
        record.stock = stock;
    }
}

fn next_id(max_id: ProductId) -> Result<ProductId> {
    max_id.checked_add(1).ok_or_else(|| {
        EtlError::validation(
            SourceKind::Patch,
            format!("no identifier left after {max_id} for a new product"),
        )
    })
}

fn new_record(patch: &PatchRecord, id: ProductId) -> Result<ConsolidatedRecord> {
    let (Some(name), Some(category), Some(price), Some(stock)) =
        (&patch.name, &patch.category, patch.price, patch.stock)
    else {
        return Err(EtlError::validation(
            SourceKind::Patch,
            "new products require name, category, price, and stock",
        ));
    };

    let mut record =
        ConsolidatedRecord::new(id, name.clone(), normalize_category(category), price, stock);
    record.description = patch.description.clone();
    record.supplier = patch.supplier.clone();
    Ok(record)
}

/// Signed percentage change from `reference` to `new`, rounded to two
/// decimals with ties going to the even digit. Returns `None` when the
/// reference is zero or the price did not change.
pub fn price_change_percentage(reference: f64, new: f64) -> Option<f64> {
    if reference == 0.0 || new == reference {
        return None;
    }
    let change = (new - reference) / reference * 100.0;
    Some((change * 100.0).round_ties_even() / 100.0)
}
