//! Staff category seed loading from config.toml
//!
//! Categories listed in config.toml are created on start when no category of
//! the same name exists yet.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct SeedConfig {
    /// Staff categories to seed
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
}

/// Configuration for a single category
#[derive(Debug, Deserialize, Clone)]
pub struct CategorySeed {
    /// Role name (e.g., "Waiter")
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Display color
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "#64748b".to_string()
}

/// Loads the seed configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_seed_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_category_seed() {
        let toml_str = r##"
            [[categories]]
            name = "Waiter"
            description = "Table service"
            color = "#3b82f6"

            [[categories]]
            name = "Bartender"
        "##;

        let config: SeedConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.categories[0].name, "Waiter");
        assert_eq!(config.categories[0].color, "#3b82f6");
        assert_eq!(config.categories[1].description, None);
        assert_eq!(config.categories[1].color, "#64748b");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = load_seed_config("/definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
