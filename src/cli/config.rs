// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    // Input/Output
    pub output: Option<String>,
    pub inputs: Option<Vec<String>>,

    // Output settings
    pub compress: Option<bool>,
    pub root_name: Option<String>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config = Self::from_toml(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        println!("[INFO]: Loaded configuration from: {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, content)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        println!("[INFO]: Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# scenemerge.toml - Configuration file for scenemerge
# Command line arguments override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# Output file (always written in the binary .osb format)
output = "merged.osb"

# Input files (.osg or .osb), attached to the root in this order
inputs = ["part1.osg", "part2.osb"]

# =============================================================================
# OUTPUT SETTINGS
# =============================================================================

# Compress the binary payload with LZ4
compress = false

# Name given to the synthetic root group
# root_name = "merged"
"#
        .to_string()
    }
}
