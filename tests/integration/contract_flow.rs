//! Integration tests for the contract descriptor lifecycle: load, hash
//! update, save.

use anyhow::Result;
use std::fs;
use tempfile::TempDir;

use quill_contract::cache::ContentCache;
use quill_contract::contract::Contract;
use quill_contract::core::QuillError;
use quill_contract::file_ref::hash_of_file;

use crate::support::{ContractDir, write_file};

/// A descriptor whose component files drift on disk fails a checked load,
/// and the update workflow adopts the new hashes and makes it load again.
#[tokio::test]
async fn test_contract_lifecycle_load_update_save() -> Result<()> {
    let temp = TempDir::new()?;
    let contract_dir = ContractDir::create_json(temp.path()).await?;
    let cache = ContentCache::open(temp.path().join("cache"))?;

    let contract = Contract::load(&contract_dir.location(), &cache).await?;
    assert_eq!(contract.params.hash, contract_dir.params_hash);
    assert_eq!(contract.template.file.hash, contract_dir.template_hash);
    assert!(contract.params.local_path().is_file());
    assert!(contract.template.file.local_path().is_file());

    // the parameters change on disk; the recorded hash is now stale
    fs::write(
        temp.path().join("params.json"),
        r#"{"counterparty": "Initech"}"#,
    )?;
    let err = Contract::load(&contract_dir.location(), &cache)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<QuillError>(),
        Some(QuillError::HashMismatch { .. })
    ));

    let updated = Contract::update_file_hashes(&contract_dir.location(), &cache).await?;
    assert_ne!(updated.params.hash, contract_dir.params_hash);
    assert_eq!(
        updated.params.hash,
        hash_of_file(&temp.path().join("params.json")).await?
    );

    // the rewritten descriptor loads cleanly with checking back on
    Contract::load(&contract_dir.location(), &cache).await?;
    Ok(())
}

/// Components may live outside the descriptor's own directory, reached
/// through `../` relative locations.
#[tokio::test]
async fn test_contract_components_in_sibling_directories() -> Result<()> {
    let temp = TempDir::new()?;
    let params = write_file(temp.path(), "shared/params.json", r#"{"term": "2 years"}"#)?;
    let template = write_file(temp.path(), "nda/template.md", "# NDA: {{term}}\n")?;
    let descriptor = serde_json::json!({
        "params": {
            "location": "../shared/params.json",
            "hash": hash_of_file(&params).await?,
        },
        "template": {
            "format": "Mustache",
            "file": { "location": "./template.md", "hash": hash_of_file(&template).await? },
        },
    });
    let entrypoint = write_file(temp.path(), "nda/contract.json", &descriptor.to_string())?;
    let cache = ContentCache::open(temp.path().join("cache"))?;

    let contract = Contract::load(&entrypoint.display().to_string(), &cache).await?;
    assert_eq!(contract.params.local_path(), params.as_path());
    assert_eq!(contract.template.file.local_path(), template.as_path());
    Ok(())
}

/// The upstream field names where a contract was derived from. Loading must
/// carry it through untouched and must not try to fetch it.
#[tokio::test]
async fn test_remote_upstream_is_not_fetched_during_load() -> Result<()> {
    let temp = TempDir::new()?;
    let params = write_file(temp.path(), "params.json", "{}")?;
    let template = write_file(temp.path(), "template.md", "# T\n")?;
    let descriptor = serde_json::json!({
        "params": { "location": "./params.json", "hash": hash_of_file(&params).await? },
        "template": {
            "format": "Mustache",
            "file": { "location": "./template.md", "hash": hash_of_file(&template).await? },
        },
        "upstream": {
            "location": "git://github.com:acme/templates.git/nda/contract.json#v2.0.0",
            "hash": "3a7bd3e2360a3d29eea436fcfb7e44c735d117c42d1c1835420b6b9942dd4f1b",
        },
    });
    let entrypoint = write_file(temp.path(), "contract.json", &descriptor.to_string())?;
    let cache = ContentCache::open(temp.path().join("cache"))?;

    // offline: this would hang or fail if load tried to reach the upstream
    let contract = Contract::load(&entrypoint.display().to_string(), &cache).await?;
    let upstream = contract.upstream.as_ref().unwrap();
    assert_eq!(
        upstream.location,
        "git://github.com:acme/templates.git/nda/contract.json#v2.0.0"
    );
    assert!(upstream.local_path().as_os_str().is_empty());

    contract.save().await?;
    let reloaded = Contract::load(&entrypoint.display().to_string(), &cache).await?;
    assert_eq!(reloaded.upstream, contract.upstream);
    Ok(())
}

/// A descriptor pointing at a file that does not exist fails the load with
/// a readable error naming the missing file.
#[tokio::test]
async fn test_load_fails_when_component_missing() -> Result<()> {
    let temp = TempDir::new()?;
    let template = write_file(temp.path(), "template.md", "# T\n")?;
    let descriptor = serde_json::json!({
        "params": { "location": "./missing.json", "hash": "" },
        "template": {
            "format": "Mustache",
            "file": { "location": "./template.md", "hash": hash_of_file(&template).await? },
        },
    });
    let entrypoint = write_file(temp.path(), "contract.json", &descriptor.to_string())?;
    let cache = ContentCache::open(temp.path().join("cache"))?;

    let err = Contract::load(&entrypoint.display().to_string(), &cache)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("missing.json"));
    Ok(())
}

/// Saving keeps the format the descriptor was loaded in.
#[tokio::test]
async fn test_yaml_contract_survives_save_reload() -> Result<()> {
    let temp = TempDir::new()?;
    let params = write_file(temp.path(), "params.yaml", "counterparty: ACME\n")?;
    let template = write_file(temp.path(), "template.md", "# T\n")?;
    let descriptor = format!(
        "params:\n  location: ./params.yaml\n  hash: {}\ntemplate:\n  format: Mustache\n  file:\n    location: ./template.md\n    hash: {}\n",
        hash_of_file(&params).await?,
        hash_of_file(&template).await?,
    );
    let entrypoint = write_file(temp.path(), "contract.yaml", &descriptor)?;
    let cache = ContentCache::open(temp.path().join("cache"))?;

    let contract = Contract::load(&entrypoint.display().to_string(), &cache).await?;
    contract.save().await?;

    // still YAML on disk
    let on_disk = fs::read_to_string(&entrypoint)?;
    let parsed: serde_yaml::Value = serde_yaml::from_str(&on_disk)?;
    assert!(parsed.get("params").is_some());

    Contract::load(&entrypoint.display().to_string(), &cache).await?;
    Ok(())
}
