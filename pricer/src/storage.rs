//! JSON document persistence shared by the file-backed stores.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;
use std::path::Path;

use crate::error::{PricingError, Result};

/// Reads a JSON document. A missing or blank file yields `T::default()`.
pub async fn read_json<T>(path: &Path, what: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| storage_error("read", what, err))?;
    if data.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&data).map_err(|err| storage_error("parse", what, err))
}

/// Writes `value` to a sibling temp file and renames it over `path`, so
/// readers never observe a half-written document.
pub async fn write_json<T>(path: &Path, value: &T, what: &str) -> Result<()>
where
    T: Serialize + ?Sized,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| storage_error("create directory for", what, err))?;
        }
    }
    let payload =
        serde_json::to_string_pretty(value).map_err(|err| storage_error("serialize", what, err))?;
    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, payload)
        .await
        .map_err(|err| storage_error("write", what, err))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|err| storage_error("finalize", what, err))
}

fn storage_error(action: &str, what: &str, err: impl Display) -> PricingError {
    PricingError::Storage(format!("failed to {} {}: {}", action, what, err))
}
