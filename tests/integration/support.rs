//! Shared helpers for integration tests.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use quill_contract::file_ref::hash_of_file;

/// Writes a file under `dir`, creating parent directories as needed, and
/// returns its full path.
pub fn write_file(dir: &Path, rel_path: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(rel_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)?;
    Ok(path)
}

/// A contract directory laid out on disk, with the descriptor's component
/// hashes already computed from the real files.
pub struct ContractDir {
    pub root: PathBuf,
    pub entrypoint: PathBuf,
    pub params_hash: String,
    pub template_hash: String,
}

impl ContractDir {
    /// Builds `contract.json` with relative `params` and `template`
    /// references pointing at freshly written component files.
    pub async fn create_json(root: &Path) -> Result<Self> {
        let params = write_file(root, "params.json", r#"{"counterparty": "ACME Corp"}"#)?;
        let template = write_file(root, "template.md", "# Agreement\n\n{{counterparty}}\n")?;
        let params_hash = hash_of_file(&params).await?;
        let template_hash = hash_of_file(&template).await?;

        let descriptor = serde_json::json!({
            "params": { "location": "./params.json", "hash": params_hash },
            "template": {
                "format": "Mustache",
                "file": { "location": "./template.md", "hash": template_hash },
            },
        });
        let entrypoint = write_file(root, "contract.json", &descriptor.to_string())?;
        Ok(Self {
            root: root.to_path_buf(),
            entrypoint,
            params_hash,
            template_hash,
        })
    }

    pub fn location(&self) -> String {
        self.entrypoint.display().to_string()
    }
}
