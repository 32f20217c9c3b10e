use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};

use super::XmlsiftConfig;
use super::smart_load;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Environment variable prefix; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "XMLSIFT_";

/// Repository config files, lowest priority first
const REPO_CONFIG_FILES: [&str; 4] = ["xmlsift.toml", "xmlsift.json", "xmlsift.yaml", "xmlsift.yml"];

impl XmlsiftConfig {
    /// Load the merged configuration: embedded defaults, then either the
    /// custom file or the repository files, then environment variables
    pub fn load(custom_config: Option<&str>) -> Result<Self> {
        let figment = Self::figment(custom_config)?;
        let config: XmlsiftConfig = figment.extract().context("Failed to parse configuration")?;

        tracing::debug!(
            "Loaded configuration with {} top-level filter(s)",
            config.filters.len()
        );
        Ok(config)
    }

    /// Assemble the provider stack without extracting it
    pub fn figment(custom_config: Option<&str>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG)); // Embedded defaults

        if let Some(custom_path) = custom_config {
            // Custom config replaces repository config, never merges with it
            let path = Path::new(custom_path);
            if !path.is_file() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            tracing::debug!("Using configuration file {}", path.display());
            figment = figment.merge(smart_load::auto(path));
        } else {
            figment = figment
                .merge(Toml::file(REPO_CONFIG_FILES[0]))
                .merge(Json::file(REPO_CONFIG_FILES[1]))
                .merge(Yaml::file(REPO_CONFIG_FILES[2]))
                .merge(Yaml::file(REPO_CONFIG_FILES[3]));
        }

        // Environment variables always have highest priority
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Parse a configuration document on its own, without defaults or environment
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Figment::new()
            .merge(Toml::string(content))
            .extract()
            .context("Failed to parse configuration")
    }
}
