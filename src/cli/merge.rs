// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};

/// Command line after the configuration file has been folded in
#[derive(Debug, Default)]
pub struct ResolvedArgs {
    pub files: Vec<String>,
    pub compress: bool,
    pub root_name: Option<String>,
}

impl Args {
    /// Merge with configuration from file.
    /// Positional files on the command line replace the configured ones.
    pub fn merge_with_config(self, config: Config) -> ResolvedArgs {
        let files = if self.files.is_empty() {
            config
                .output
                .into_iter()
                .chain(config.inputs.unwrap_or_default())
                .collect()
        } else {
            self.files
        };

        ResolvedArgs {
            files,
            compress: self.compress || config.compress.unwrap_or(false),
            root_name: config.root_name,
        }
    }

    /// Load configuration (if any) and merge with CLI args
    pub fn resolve(self) -> Result<ResolvedArgs, String> {
        let config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::new(),
        };
        Ok(self.merge_with_config(config))
    }
}
