use std::path::Path;

use figment::providers::{Format, Json, Toml, Yaml};
use serde::Serialize;

/// Serialization formats accepted for configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Format implied by a file extension, if any
    pub fn from_extension(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "json" => Some(ConfigFormat::Json),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            _ => None,
        }
    }

    /// Render a value in this format
    pub fn render<T: Serialize>(self, value: &T) -> anyhow::Result<String> {
        Ok(match self {
            ConfigFormat::Toml => toml::to_string_pretty(value)?,
            ConfigFormat::Json => serde_json::to_string_pretty(value)?,
            ConfigFormat::Yaml => serde_yml::to_string(value)?,
        })
    }
}

/// Smart configuration file loader that chooses the right format based on file extension
/// Returns a provider that can be directly used with figment.merge()
pub fn auto<P: AsRef<Path>>(path: P) -> impl figment::Provider {
    let path = path.as_ref();

    let format = ConfigFormat::from_extension(path).unwrap_or_else(|| {
        // For unknown extensions, try to detect based on content or default to TOML
        let detected = std::fs::read_to_string(path)
            .ok()
            .and_then(|content| detect_format_from_content(&content));
        tracing::debug!(
            "Detected {:?} format for {} (unknown extension)",
            detected,
            path.display()
        );
        detected.unwrap_or(ConfigFormat::Toml)
    });

    match format {
        ConfigFormat::Toml => SmartProvider::Toml(Toml::file(path)),
        ConfigFormat::Json => SmartProvider::Json(Json::file(path)),
        ConfigFormat::Yaml => SmartProvider::Yaml(Yaml::file(path)),
    }
}

/// Wrapper enum to handle different provider types
enum SmartProvider {
    Toml(figment::providers::Data<Toml>),
    Json(figment::providers::Data<Json>),
    Yaml(figment::providers::Data<Yaml>),
}

impl figment::Provider for SmartProvider {
    fn metadata(&self) -> figment::Metadata {
        match self {
            SmartProvider::Toml(p) => p.metadata(),
            SmartProvider::Json(p) => p.metadata(),
            SmartProvider::Yaml(p) => p.metadata(),
        }
    }

    fn data(&self) -> Result<figment::value::Map<figment::Profile, figment::value::Dict>, figment::Error> {
        match self {
            SmartProvider::Toml(p) => p.data(),
            SmartProvider::Json(p) => p.data(),
            SmartProvider::Yaml(p) => p.data(),
        }
    }
}

/// Attempt to detect configuration format from file content
fn detect_format_from_content(content: &str) -> Option<ConfigFormat> {
    let trimmed = content.trim();

    // JSON detection - starts with { or [
    if (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with("[{") && trimmed.ends_with(']'))
    {
        return Some(ConfigFormat::Json);
    }

    // TOML detection - [section] headers or key = value before any colon
    // (XPath values such as "/a:Test" contain colons too)
    if trimmed.lines().any(|line| {
        let line = line.trim();
        let is_header = line.starts_with('[') && line.ends_with(']');
        let is_assignment = match (line.find('='), line.find(':')) {
            (Some(eq), Some(colon)) => eq < colon,
            (Some(_), None) => true,
            _ => false,
        };
        is_header || is_assignment
    }) {
        return Some(ConfigFormat::Toml);
    }

    // YAML detection - document separator or key: value
    if trimmed.starts_with("---") || trimmed.lines().any(|line| line.contains(':')) {
        return Some(ConfigFormat::Yaml);
    }

    None // Unable to detect
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(detect_format_from_content(r#"{"run": {}}"#), Some(ConfigFormat::Json));
        assert_eq!(detect_format_from_content("run:\n  on_error: skip"), Some(ConfigFormat::Yaml));
        assert_eq!(detect_format_from_content("[run]\non_error = \"skip\""), Some(ConfigFormat::Toml));
        assert_eq!(
            detect_format_from_content("[[filters]]\ntype = \"content\"\nquery = \"/a:Test\""),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(detect_format_from_content("plain words"), None);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension(Path::new("x.TOML")), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension(Path::new("x.yml")), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension(Path::new("x.json")), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension(Path::new("x.conf")), None);
    }
}
