//! Contract descriptors: the entrypoint document that names a contract's
//! parts.
//!
//! A descriptor is a small JSON, YAML or TOML document with three fields: a
//! `params` reference, a `template` (format plus file reference), and an
//! optional `upstream` reference naming the contract this one was derived
//! from. Loading a descriptor resolves the parameters and template through
//! the [`ContentCache`], relative to the descriptor itself when their
//! locations are relative.
//!
//! ```json
//! {
//!   "params": { "location": "./params.json", "hash": "..." },
//!   "template": {
//!     "format": "Mustache",
//!     "file": { "location": "./template.md", "hash": "..." }
//!   }
//! }
//! ```
//!
//! The `upstream` field is carried through loading and saving untouched; it
//! is only ever resolved by workflows that explicitly compare against the
//! upstream.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::cache::ContentCache;
use crate::core::QuillError;
use crate::file_ref::FileRef;
use crate::location::LocationKind;
use crate::utils::fs::atomic_write;

/// Serialization format of a contract descriptor, detected from the
/// entrypoint's file extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DescriptorFormat {
    #[default]
    Json,
    Yaml,
    Toml,
}

impl DescriptorFormat {
    /// Detects the descriptor format from a file extension.
    ///
    /// Anything other than `json`, `yaml`/`yml` or `toml` is rejected,
    /// including extensionless paths.
    pub fn from_path(path: &Path) -> Result<Self, QuillError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        match extension {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(QuillError::UnsupportedFormat {
                path: path.display().to_string(),
                extension: extension.to_string(),
            }),
        }
    }
}

/// Templating language of a contract template.
///
/// Only Mustache exists today; the enum leaves room for others without a
/// descriptor format change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateFormat {
    #[default]
    Mustache,
}

/// The contract text template: its language and where the file lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub format: TemplateFormat,
    pub file: FileRef,
}

/// A loaded contract descriptor with its components resolved to local files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    /// Reference to the parameters file.
    pub params: FileRef,
    /// Reference to the contract text template.
    pub template: Template,
    /// The contract this one was derived from, if any.
    ///
    /// Saved descriptors omit the field when there is no upstream rather
    /// than writing an explicit null; loading accepts either spelling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<FileRef>,

    #[serde(skip)]
    entrypoint: FileRef,
    #[serde(skip)]
    format: DescriptorFormat,
}

impl Contract {
    /// Loads the contract at `location`, fetching and caching the descriptor
    /// and its components as needed.
    ///
    /// Component hashes are enforced: a params or template file whose
    /// content no longer matches the hash recorded in the descriptor fails
    /// the load.
    pub async fn load(location: &str, cache: &ContentCache) -> Result<Self> {
        info!("Loading contract {location}");
        Self::load_components(location, true, cache).await
    }

    /// Re-resolves the contract at `location` without enforcing component
    /// hashes, adopts the freshly computed ones, and writes the descriptor
    /// back out.
    ///
    /// Only contracts whose entrypoint is a local file can be updated; the
    /// rewritten descriptor has to land somewhere the user owns, not in the
    /// cache.
    pub async fn update_file_hashes(location: &str, cache: &ContentCache) -> Result<Self> {
        if LocationKind::of(location) != LocationKind::Local {
            bail!("only contracts in the local filesystem can have their hashes updated");
        }
        info!("Loading contract {location}");
        let contract = Self::load_components(location, false, cache).await?;
        contract.save().await?;
        Ok(contract)
    }

    async fn load_components(
        location: &str,
        check_hashes: bool,
        cache: &ContentCache,
    ) -> Result<Self> {
        let entrypoint = FileRef::resolve(location, None, false, cache).await?;
        let format = DescriptorFormat::from_path(entrypoint.local_path())?;
        let content = entrypoint.read_to_string().await?;

        let mut contract = Self::parse(&content, format)
            .with_context(|| format!("failed to parse contract descriptor {location}"))?;
        contract.format = format;

        let (params, template_file) = futures::try_join!(
            resolve_component(&entrypoint, &contract.params, check_hashes, cache),
            resolve_component(&entrypoint, &contract.template.file, check_hashes, cache),
        )?;
        contract.params = params;
        contract.template.file = template_file;
        contract.entrypoint = entrypoint;
        Ok(contract)
    }

    fn parse(content: &str, format: DescriptorFormat) -> Result<Self> {
        let contract = match format {
            DescriptorFormat::Json => serde_json::from_str(content)?,
            DescriptorFormat::Yaml => serde_yaml::from_str(content)?,
            DescriptorFormat::Toml => toml::from_str(content)?,
        };
        Ok(contract)
    }

    /// Writes the descriptor back to its entrypoint path, in the format it
    /// was loaded in.
    pub async fn save(&self) -> Result<()> {
        let path = self.entrypoint.local_path();
        info!("Writing contract {}", path.display());
        let content = match self.format {
            DescriptorFormat::Json => serde_json::to_string_pretty(self)?,
            DescriptorFormat::Yaml => serde_yaml::to_string(self)?,
            DescriptorFormat::Toml => toml::to_string_pretty(self)?,
        };
        atomic_write(path, content.as_bytes())
            .with_context(|| format!("failed to write contract descriptor {}", path.display()))
    }

    /// The resolved descriptor file itself.
    pub fn entrypoint(&self) -> &FileRef {
        &self.entrypoint
    }

    /// Format the descriptor was loaded in.
    pub fn format(&self) -> DescriptorFormat {
        self.format
    }
}

/// Resolves one component reference, relative to the descriptor when its
/// location is relative.
async fn resolve_component(
    entrypoint: &FileRef,
    component: &FileRef,
    check_hashes: bool,
    cache: &ContentCache,
) -> Result<FileRef> {
    if component.is_relative() {
        entrypoint
            .resolve_relative(component, check_hashes, cache)
            .await
    } else {
        FileRef::resolve(
            &component.location,
            Some(&component.hash),
            check_hashes,
            cache,
        )
        .await
    }
}
