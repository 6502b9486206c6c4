//! Provider settings from flags and JSON document IO

use anyhow::{Context, Result};
use clap::Args;
use provider_lib::{DevzeroProvider, Driver, EnvSettings, Value};
use std::path::Path;

/// Explicit provider settings. Unset flags fall back to `DEVZERO_*`
/// environment variables.
#[derive(Debug, Clone, Default, Args)]
pub struct ProviderArgs {
    /// Devzero API URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Devzero team ID
    #[arg(long, global = true)]
    pub team_id: Option<String>,

    /// Devzero API token
    #[arg(long, global = true)]
    pub token: Option<String>,
}

impl ProviderArgs {
    /// The provider configuration block these flags describe
    pub fn provider_block(&self) -> Value {
        let field = |v: &Option<String>| v.clone().map_or(Value::Null, Value::string);
        Value::object([
            ("url", field(&self.url)),
            ("team_id", field(&self.team_id)),
            ("token", field(&self.token)),
        ])
    }

    /// Resolves settings and connects a driver
    pub fn connect(&self, provider: &DevzeroProvider) -> Result<Driver> {
        let env = EnvSettings::load()?;
        let client = provider.configure(&self.provider_block(), &env)?;
        Ok(Driver::new(client))
    }
}

/// Read a JSON document
pub fn load_document(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Read an optional state document. A missing or empty file means no state.
pub fn load_state(path: Option<&Path>) -> Result<Option<serde_json::Value>> {
    match path {
        Some(path) if path.exists() => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if content.trim().is_empty() {
                return Ok(None);
            }
            let state = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            Ok(Some(state))
        }
        _ => Ok(None),
    }
}

/// Write a JSON document
pub fn write_document(path: &Path, value: &serde_json::Value) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    let content = serde_json::to_string_pretty(value).context("Failed to serialize state")?;
    std::fs::write(path, content + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_block_from_flags() {
        let args = ProviderArgs {
            team_id: Some("team-1".to_string()),
            ..Default::default()
        };
        let block = args.provider_block();

        assert_eq!(block.get("team_id").as_str(), Some("team-1"));
        assert!(block.get("url").is_null());
        assert!(block.get("token").is_null());
    }

    #[test]
    fn test_document_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let state = json!({"id": "cluster-1", "name": "prod"});

        write_document(&path, &state).unwrap();

        assert_eq!(load_document(&path).unwrap(), state);
        assert_eq!(load_state(Some(&path)).unwrap(), Some(state));
    }

    #[test]
    fn test_missing_or_empty_state_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(load_state(Some(&missing)).unwrap().is_none());
        assert!(load_state(None).unwrap().is_none());

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "  \n").unwrap();
        assert!(load_state(Some(&empty)).unwrap().is_none());
    }

    #[test]
    fn test_invalid_document_reports_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{not json").unwrap();

        let err = load_document(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse"));
    }
}
