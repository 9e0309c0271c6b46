//! wdsp-cl configuration
//!
//! Priority per setting: command-line flag → environment variable → TOML file
//! → compiled default. Flags and environment variables are both parsed by clap
//! in `main` and arrive here as `Overrides`.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use wdsp_common::config::{load_toml_config, ConfigFileResolver, LoggingConfig};

use crate::error::{Error, Result};
use crate::pipeline::DEFAULT_TOP_K;
use crate::vision::{InputSpec, Preprocessing, TensorLayout};

/// Module name, also the config file stem
pub const MODULE_NAME: &str = "wdsp-cl";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_MODEL_PATH: &str = "models/mobilenetv2.onnx";
pub const DEFAULT_LABELS_PATH: &str = "models/imagenet_class_index.json";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Contents of `wdsp-cl.toml`; every key optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub bind_addr: Option<String>,
    pub model_path: Option<PathBuf>,
    pub labels_path: Option<PathBuf>,
    pub input_size: Option<u32>,
    pub top_k: Option<usize>,
    pub preprocessing: Option<Preprocessing>,
    pub layout: Option<TensorLayout>,
    pub max_upload_bytes: Option<usize>,
    /// Extra raw label → item key mappings
    pub label_map: BTreeMap<String, String>,
    pub logging: LoggingConfig,
}

/// Settings given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_addr: Option<String>,
    pub model_path: Option<PathBuf>,
    pub labels_path: Option<PathBuf>,
    pub top_k: Option<usize>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub input: InputSpec,
    pub top_k: usize,
    pub max_upload_bytes: usize,
    pub label_map: BTreeMap<String, String>,
    pub logging: LoggingConfig,
}

impl Config {
    /// Find and read the TOML file, then apply overrides
    pub fn load(config_path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let resolver = ConfigFileResolver::new(MODULE_NAME);
        let path = resolver.resolve(config_path);
        let toml_config: TomlConfig = load_toml_config(path.as_deref())?;
        Self::resolve(overrides, toml_config)
    }

    /// Merge overrides over file values over defaults, then validate
    pub fn resolve(overrides: Overrides, file: TomlConfig) -> Result<Self> {
        let bind_addr = overrides
            .bind_addr
            .or(file.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind_addr '{}': {}", bind_addr, e)))?;

        let input = InputSpec {
            size: file.input_size.unwrap_or(InputSpec::default().size),
            layout: file.layout.unwrap_or_default(),
            preprocessing: file.preprocessing.unwrap_or_default(),
        };
        if input.size == 0 {
            return Err(Error::Config("input_size must be at least 1".to_string()));
        }

        let top_k = overrides.top_k.or(file.top_k).unwrap_or(DEFAULT_TOP_K);
        if top_k == 0 {
            return Err(Error::Config("top_k must be at least 1".to_string()));
        }

        let max_upload_bytes = file.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        if max_upload_bytes == 0 {
            return Err(Error::Config("max_upload_bytes must be at least 1".to_string()));
        }

        file.logging.validate()?;

        Ok(Self {
            bind_addr,
            model_path: overrides
                .model_path
                .or(file.model_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            labels_path: overrides
                .labels_path
                .or(file.labels_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LABELS_PATH)),
            input,
            top_k,
            max_upload_bytes,
            label_map: file.label_map,
            logging: file.logging,
        })
    }
}
