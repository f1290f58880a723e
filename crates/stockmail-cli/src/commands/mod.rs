//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod parse;

use std::path::Path;

use stockmail_core::StockmailConfig;

/// Load the config from `-c/--config`, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<StockmailConfig> {
    if let Some(path) = config_path {
        return Ok(StockmailConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        Ok(StockmailConfig::from_file(&default_path)?)
    } else {
        Ok(StockmailConfig::default())
    }
}
