//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::ports::ConfigStore;
use crate::domain::RunConfig;

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
///
/// Resolution order: explicit `--config` path, `CREDSMITH_CONFIG`, then
/// `~/.credsmith/config.yaml`.
pub struct YamlConfigStore {
    override_path: Option<PathBuf>,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(override_path: Option<PathBuf>) -> Self {
        Self { override_path }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<RunConfig> {
        let path = self.path()?;
        if !path.exists() {
            anyhow::bail!(
                "no config file at {} (pass --config or set CREDSMITH_CONFIG)",
                path.display()
            );
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.override_path {
            return Ok(path.clone());
        }
        if let Ok(val) = std::env::var("CREDSMITH_CONFIG") {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".credsmith").join("config.yaml"))
    }
}
