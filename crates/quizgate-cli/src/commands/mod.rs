pub mod init;
pub mod review;
pub mod schemas;
pub mod score;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Read a JSON file holding either one record or an array of records.
pub fn read_records(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse JSON: {}", path.display()))?;
    Ok(match value {
        Value::Array(records) => records,
        single => vec![single],
    })
}
