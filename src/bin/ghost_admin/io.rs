#![deny(clippy::all, clippy::pedantic)]

use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::CliError;

pub fn read_value(val: Option<String>, file: Option<PathBuf>) -> Result<String, CliError> {
    if let Some(path) = file {
        let data = fs::read_to_string(&path).map_err(|source| CliError::InputFile {
            path: path.display().to_string(),
            source,
        })?;
        Ok(data)
    } else if let Some(v) = val {
        Ok(v)
    } else {
        Err(CliError::InvalidInput(
            "update data required (use --data or --data-file)".into(),
        ))
    }
}

/// Parse update fields; the admin API only accepts a JSON object here.
pub fn parse_object(raw: &str) -> Result<Value, CliError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| CliError::InvalidInput(e.to_string()))?;
    if !value.is_object() {
        return Err(CliError::InvalidInput(
            "update data must be a JSON object".into(),
        ));
    }
    Ok(value)
}
