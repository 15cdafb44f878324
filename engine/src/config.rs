use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_CHARACTERS_DIR: &str = "characters";

/// Optional YAML settings file; command-line flags override each field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default = "default_characters_dir")]
    pub characters_dir: PathBuf,
    /// Fixed RNG seed; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_characters_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CHARACTERS_DIR)
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { characters_dir: default_characters_dir(), seed: None }
    }
}

impl SessionConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).context("failed to parse session config YAML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read session config: {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("invalid session config: {}", path.display()))
    }
}
