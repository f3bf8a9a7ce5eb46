use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::storefront::etl::error::{EtlError, Result};
use crate::storefront::etl::model::SourceKind;

/// Reads the raw records of one input source.
///
/// A missing or malformed source is logged and yields no records so that the
/// run can continue with whatever the other source provides.
pub fn read_records(path: &Path, kind: SourceKind) -> Vec<Value> {
    match try_read_records(path) {
        Ok(records) => {
            info!(
                source = %kind,
                path = %path.display(),
                count = records.len(),
                "extracted records"
            );
            records
        }
        Err(err @ EtlError::SourceUnavailable { .. }) if !path.exists() => {
            warn!(source = %kind, error = %err, "source file not found, treating as empty");
            Vec::new()
        }
        Err(err) => {
            error!(source = %kind, error = %err, "failed to read source, treating as empty");
            Vec::new()
        }
    }
}

/// Parses a source file that must hold a JSON array.
pub fn try_read_records(path: &Path) -> Result<Vec<Value>> {
    let unavailable = |reason: String| EtlError::SourceUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    let data = fs::read_to_string(path).map_err(|err| unavailable(err.to_string()))?;
    let document: Value =
        serde_json::from_str(&data).map_err(|err| unavailable(err.to_string()))?;
    match document {
        Value::Array(records) => Ok(records),
        other => Err(unavailable(format!(
            "expected a JSON array of records, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
