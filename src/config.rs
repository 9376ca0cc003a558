use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::DEFAULT_CAPACITY;

/// Bare variable naming the output directory; `PGTRACE_*` variables set the rest.
pub const OUTPUT_DIR_VAR: &str = "PGTRACE";

const ENV_PREFIX: &str = "PGTRACE";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TraceConfig {
    pub io_tracing: bool,
    pub bucket_tracing: bool,
    pub output_dir: PathBuf,
    /// buffer size in bytes
    pub capacity: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        TraceConfig {
            io_tracing: false,
            bucket_tracing: false,
            output_dir: PathBuf::from("."),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

pub fn config_builder() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("io_tracing", false)?
        .set_default("bucket_tracing", false)?
        .set_default("output_dir", ".")?
        .set_default("capacity", DEFAULT_CAPACITY as u64)?)
}

impl TraceConfig {
    /// Either flag turns the session on.
    pub fn enabled(&self) -> bool {
        self.io_tracing || self.bucket_tracing
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        Ok(builder.build()?.try_deserialize::<TraceConfig>()?)
    }

    /// Resolves the process environment once.
    pub fn from_env() -> Result<Self> {
        Self::load(config_builder()?, None)
    }

    /// Same resolution as [`TraceConfig::from_env`] against an explicit variable map.
    pub fn from_env_map(vars: HashMap<String, String>) -> Result<Self> {
        Self::load(config_builder()?, Some(vars))
    }

    /// JSON5 file, overridden by the environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let builder = config_builder()?.add_source(config::File::new(
            &path.as_ref().to_string_lossy(),
            config::FileFormat::Json5,
        ));
        Self::load(builder, None)
    }

    fn load(
        builder: ConfigBuilder<DefaultState>,
        vars: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let output_dir = match &vars {
            Some(vars) => vars.get(OUTPUT_DIR_VAR).cloned(),
            None => std::env::var(OUTPUT_DIR_VAR).ok(),
        };
        let builder = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .try_parsing(true)
                    .source(vars),
            )
            .set_override_option("output_dir", output_dir)?;
        Self::from_builder(builder)
    }
}
