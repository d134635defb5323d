//! Persisted client configuration. The only value that survives across
//! sessions is the backend endpoint; everything else the console shows is
//! re-fetched on startup.

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

/// Endpoint used until the user configures their own backend.
pub const DEFAULT_ENDPOINT: &str = "https://backend-m123.onrender.com/api";

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".libradesk";
/// Configuration file name stored inside the application data directory.
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Serialize, Deserialize)]
struct PersistedConfig {
    endpoint: String,
}

/// Configuration store backing the console. Reads the persisted endpoint on
/// startup and writes it back whenever the user applies a new one.
pub struct Settings {
    endpoint: String,
    path: PathBuf,
}

impl Settings {
    /// Load the persisted endpoint, falling back to the built-in default
    /// when no config file exists yet or it cannot be parsed.
    pub fn load() -> Result<Self> {
        Ok(Self::load_from(config_path()?))
    }

    /// Same as [`Settings::load`] but against an explicit file path, so
    /// tests can point the store at a scratch directory.
    pub fn load_from(path: PathBuf) -> Self {
        let endpoint = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<PersistedConfig>(&raw).ok())
            .map(|cfg| cfg.endpoint)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Self { endpoint, path }
    }

    /// The currently configured base URL for all backend calls.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Apply a new endpoint. Surrounding whitespace is ignored; an empty or
    /// unchanged value is a no-op and returns `false`. On a real change the
    /// value is persisted and `true` comes back so the caller can re-fetch
    /// all collections and re-run the connectivity probe.
    pub fn set_endpoint(&mut self, value: &str) -> Result<bool> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == self.endpoint {
            return Ok(false);
        }

        self.endpoint = trimmed.to_string();
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("failed to create config directory")?;
        }
        let payload = serde_json::to_string_pretty(&PersistedConfig {
            endpoint: self.endpoint.clone(),
        })
        .context("failed to encode config")?;
        fs::write(&self.path, payload).context("failed to write config file")
    }
}

/// Resolve the absolute path of the config file inside the user's home.
fn config_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs
        .home_dir()
        .join(DATA_DIR_NAME)
        .join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_settings() -> (tempfile::TempDir, Settings) {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::load_from(dir.path().join("config.json"));
        (dir, settings)
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let (_dir, settings) = scratch_settings();
        assert_eq!(settings.endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn empty_and_unchanged_values_are_no_ops() {
        let (_dir, mut settings) = scratch_settings();
        assert!(!settings.set_endpoint("").unwrap());
        assert!(!settings.set_endpoint("   ").unwrap());
        assert!(!settings.set_endpoint(DEFAULT_ENDPOINT).unwrap());
        assert!(!settings.set_endpoint(&format!("  {DEFAULT_ENDPOINT}  ")).unwrap());
        assert_eq!(settings.endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn changed_endpoint_is_persisted_and_reloaded() {
        let (dir, mut settings) = scratch_settings();
        assert!(settings.set_endpoint(" http://localhost:4000/api ").unwrap());
        assert_eq!(settings.endpoint(), "http://localhost:4000/api");

        let reloaded = Settings::load_from(dir.path().join("config.json"));
        assert_eq!(reloaded.endpoint(), "http://localhost:4000/api");
    }

    #[test]
    fn corrupt_file_falls_back_to_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        let settings = Settings::load_from(path);
        assert_eq!(settings.endpoint(), DEFAULT_ENDPOINT);
    }
}
