use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub log: LogConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON snapshot the command line tool loads and saves.
    pub snapshot_path: String,
    /// Text encoding of libraries created without an explicit choice.
    pub unicode: bool,
}

impl Config {
    /// Defaults, overridden by an optional `pblcodec` file and `PBLCODEC_*` variables.
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::with_name("pblcodec").required(false))
            .add_source(
                config::Environment::with_prefix("PBLCODEC").prefix_separator("_").separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Defaults overridden by the file at `path`, which must exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::from(path))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log: LogConfig { filter: "pblcodec=info".to_string() },
            store: StoreConfig { snapshot_path: "pblcodec.json".to_string(), unicode: true },
        }
    }
}
