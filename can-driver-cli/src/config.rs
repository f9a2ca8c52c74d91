//! Configuration loading and parsing

use anyhow::{bail, Context, Result};
use can_driver_gen::DirectionPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub input: InputConfig,
    pub direction: DirectionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    pub dbc_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectionConfig {
    pub policy: PolicyKind,
    pub node: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Attribute,
    Membership,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    #[serde(default)]
    pub stamp: bool,
    #[serde(default)]
    pub dump_spec: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            stamp: false,
            dump_spec: false,
        }
    }
}

impl DirectionConfig {
    /// Translate the TOML section into a library direction policy.
    pub fn to_policy(&self) -> Result<DirectionPolicy> {
        match self.policy {
            PolicyKind::Attribute => {
                if self.node.is_some() {
                    bail!("direction.node is only valid with policy = \"membership\"");
                }
                Ok(DirectionPolicy::Attribute)
            }
            PolicyKind::Membership => match &self.node {
                Some(node) => Ok(DirectionPolicy::Membership { node: node.clone() }),
                None => bail!("policy = \"membership\" requires direction.node"),
            },
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    if config.input.dbc_files.is_empty() {
        bail!("Config file {:?} lists no DBC files under [input]", path);
    }

    Ok(config)
}
