//! `package.json` patching
//!
//! The manifest is parsed into an order-preserving JSON map, the fields owned
//! by timesaver are overwritten, and the whole document is written back. Keys
//! the scaffolder wrote that timesaver does not own survive untouched.

use crate::error::{Result, ScaffoldError};
use crate::policy::{PolicyRow, TEST_PLACEHOLDER};
use crate::request::ProjectRequest;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Rewrite the manifest at `manifest_path` for `request` using `row`'s templates
pub async fn patch_manifest(
    manifest_path: &Path,
    request: &ProjectRequest,
    row: &PolicyRow,
) -> Result<()> {
    let content = fs::read_to_string(manifest_path)
        .await
        .map_err(|e| ScaffoldError::manifest(manifest_path, format!("failed to read: {}", e)))?;

    let patched = patch_document(&content, request, row)
        .map_err(|reason| ScaffoldError::manifest(manifest_path, reason))?;

    write_replacing(manifest_path, &patched).await?;
    info!("Patched {}", manifest_path.display());
    Ok(())
}

/// Apply the patch to manifest text, returning the new text
pub fn patch_document(
    content: &str,
    request: &ProjectRequest,
    row: &PolicyRow,
) -> std::result::Result<String, String> {
    let mut document: Value =
        serde_json::from_str(content).map_err(|e| format!("failed to parse: {}", e))?;

    let manifest = document
        .as_object_mut()
        .ok_or_else(|| "top-level value is not an object".to_string())?;

    manifest.insert("name".into(), Value::from(request.name()));
    manifest.insert("version".into(), Value::from(request.effective_version()));
    manifest.insert("author".into(), Value::from(request.author()));
    manifest.insert("type".into(), Value::from(row.module_type.as_str()));

    let scripts = manifest
        .entry("scripts")
        .or_insert_with(|| Value::Object(Map::new()));
    if !scripts.is_object() {
        *scripts = Value::Object(Map::new());
    }
    if let Some(scripts) = scripts.as_object_mut() {
        scripts.insert("run".into(), Value::from(row.run_script));
        scripts.insert("build".into(), Value::from(row.build_script));
        scripts.insert("test".into(), Value::from(TEST_PLACEHOLDER));
    }

    let mut rendered =
        serde_json::to_string_pretty(&document).map_err(|e| format!("failed to serialize: {}", e))?;
    rendered.push('\n');
    Ok(rendered)
}

/// Write through a sibling temp file so a failed write never truncates the manifest
async fn write_replacing(path: &Path, content: &str) -> Result<()> {
    let mut tmp = PathBuf::from(path);
    tmp.set_extension("json.tmp");

    fs::write(&tmp, content)
        .await
        .map_err(|e| ScaffoldError::manifest(path, format!("failed to write: {}", e)))?;

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(ScaffoldError::manifest(path, format!("failed to write: {}", e)));
    }
    Ok(())
}
