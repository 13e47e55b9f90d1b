use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use super::ApiConfig;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Disk-backed owner of the active [`ApiConfig`].
///
/// The in-memory copy is what recognition requests read; `replace` updates it
/// and persists in the same critical section so the two never diverge.
pub struct ConfigStore {
    path: PathBuf,
    data: RwLock<ApiConfig>,
}

impl ConfigStore {
    /// Open the store at `path`. A missing or unparsable file yields defaults.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!(
                    "Ignoring unreadable config at {}: {err}; using defaults",
                    path.display()
                );
                ApiConfig::default()
            })
        } else {
            ApiConfig::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Open `config.json` inside `dir`, creating the directory if needed.
    pub fn in_dir(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        Self::new(dir.join(CONFIG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> ApiConfig {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn replace(&self, config: ApiConfig) -> Result<()> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.persist(&config)?;
        *guard = config;
        Ok(())
    }

    fn persist(&self, data: &ApiConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory {}", parent.display())
                })?;
            }
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write config to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ApiConfig {
        ApiConfig {
            api_key: "sk-test-1234567890".into(),
            model_name: "gpt-4o".into(),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path()).unwrap();
        assert_eq!(store.current(), ApiConfig::default());
        assert!(!store.path().exists());
    }

    #[test]
    fn replace_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path()).unwrap();
        store.replace(sample()).unwrap();
        assert_eq!(store.current(), sample());

        let reopened = ConfigStore::in_dir(dir.path()).unwrap();
        assert_eq!(reopened.current(), sample());
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "{ not json").unwrap();
        let store = ConfigStore::in_dir(dir.path()).unwrap();
        assert_eq!(store.current(), ApiConfig::default());
    }

    #[test]
    fn failed_write_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the write fail.
        let path = dir.path().join("blocked");
        let store = ConfigStore::new(path.clone()).unwrap();
        fs::create_dir_all(&path).unwrap();
        assert!(store.replace(sample()).is_err());
        assert_eq!(store.current(), ApiConfig::default());
    }
}
