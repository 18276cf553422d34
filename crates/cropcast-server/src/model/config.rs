//! Configuration management for the Cropcast services
//!
//! Sources, lowest priority first: built-in defaults, `conf/application.yml`,
//! `CROPCAST__*` environment variables, command line flags.

use clap::Parser;
use config::{Config, Environment};
use cropcast_common::{CropcastError, Result};

use crate::startup::LoggingConfig;

use super::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_DETECT_ADDRESS, DEFAULT_DETECT_CLASS_NAMES_PATH,
    DEFAULT_DETECT_MODEL_PATH, DEFAULT_HARVEST_ADDRESS, DEFAULT_HARVEST_MODEL_PATH,
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT, DETECT_ADDRESS, DETECT_CLASS_NAMES_PATH,
    DETECT_MAX_UPLOAD_BYTES, DETECT_MODEL_PATH, DETECT_PORT, ENV_PREFIX, ENV_SEPARATOR,
    HARVEST_ADDRESS, HARVEST_MODEL_PATH, HARVEST_PORT, LOGGING_CONSOLE, LOGGING_DIR, LOGGING_FILE,
    LOGGING_LEVEL,
};

/// Which inference service a process runs; selects the keys CLI flags override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Detect,
    Harvest,
}

impl Service {
    fn address_key(self) -> &'static str {
        match self {
            Service::Detect => DETECT_ADDRESS,
            Service::Harvest => HARVEST_ADDRESS,
        }
    }

    fn port_key(self) -> &'static str {
        match self {
            Service::Detect => DETECT_PORT,
            Service::Harvest => HARVEST_PORT,
        }
    }

    fn model_path_key(self) -> &'static str {
        match self {
            Service::Detect => DETECT_MODEL_PATH,
            Service::Harvest => HARVEST_MODEL_PATH,
        }
    }
}

/// Command line arguments for the inference servers
#[derive(Debug, Default, Parser)]
#[command()]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'c', long = "config", env = "CROPCAST_CONFIG")]
    pub config: Option<String>,
    /// Interface to bind
    #[arg(short = 'a', long = "address")]
    pub address: Option<String>,
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,
    /// Serialized model file
    #[arg(short = 'm', long = "model")]
    pub model_path: Option<String>,
    /// Class label table (image service only)
    #[arg(short = 'l', long = "labels")]
    pub class_names_path: Option<String>,
}

/// Settings of the image classification service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectSettings {
    pub address: String,
    pub port: u16,
    pub model_path: String,
    pub class_names_path: String,
    pub max_upload_bytes: usize,
}

/// Settings of the harvest regression service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestSettings {
    pub address: String,
    pub port: u16,
    pub model_path: String,
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

fn config_error(e: config::ConfigError) -> CropcastError {
    CropcastError::ConfigError(e.to_string())
}

impl Configuration {
    /// Build the configuration for `service` from the process arguments.
    pub fn new(service: Service) -> Result<Self> {
        Self::from_cli(Cli::parse(), service)
    }

    pub fn from_cli(args: Cli, service: Service) -> Result<Self> {
        let file = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_FILE);
        let mut builder = Self::builder(file)?;

        if let Some(v) = args.address {
            builder = builder
                .set_override(service.address_key(), v)
                .map_err(config_error)?;
        }
        if let Some(v) = args.port {
            builder = builder
                .set_override(service.port_key(), v as i64)
                .map_err(config_error)?;
        }
        if let Some(v) = args.model_path {
            builder = builder
                .set_override(service.model_path_key(), v)
                .map_err(config_error)?;
        }
        if let Some(v) = args.class_names_path {
            builder = builder
                .set_override(DETECT_CLASS_NAMES_PATH, v)
                .map_err(config_error)?;
        }

        let config = builder.build().map_err(config_error)?;
        Ok(Configuration { config })
    }

    /// Build from a configuration file and the environment, without parsing CLI flags.
    pub fn from_file(file: &str) -> Result<Self> {
        let config = Self::builder(file)?.build().map_err(config_error)?;
        Ok(Configuration { config })
    }

    fn builder(file: &str) -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Config::builder()
            .set_default(DETECT_ADDRESS, DEFAULT_DETECT_ADDRESS)
            .and_then(|b| b.set_default(DETECT_PORT, DEFAULT_PORT as i64))
            .and_then(|b| b.set_default(DETECT_MODEL_PATH, DEFAULT_DETECT_MODEL_PATH))
            .and_then(|b| b.set_default(DETECT_CLASS_NAMES_PATH, DEFAULT_DETECT_CLASS_NAMES_PATH))
            .and_then(|b| b.set_default(DETECT_MAX_UPLOAD_BYTES, DEFAULT_MAX_UPLOAD_BYTES as i64))
            .and_then(|b| b.set_default(HARVEST_ADDRESS, DEFAULT_HARVEST_ADDRESS))
            .and_then(|b| b.set_default(HARVEST_PORT, DEFAULT_PORT as i64))
            .and_then(|b| b.set_default(HARVEST_MODEL_PATH, DEFAULT_HARVEST_MODEL_PATH))
            .map(|b| {
                b.add_source(config::File::with_name(file).required(false))
                    .add_source(
                        Environment::with_prefix(ENV_PREFIX)
                            .separator(ENV_SEPARATOR)
                            .try_parsing(true),
                    )
            })
            .map_err(config_error)
    }

    // ========================================================================
    // Image service
    // ========================================================================

    pub fn detect_address(&self) -> String {
        self.config
            .get_string(DETECT_ADDRESS)
            .unwrap_or(DEFAULT_DETECT_ADDRESS.to_string())
    }

    pub fn detect_port(&self) -> u16 {
        self.config
            .get_int(DETECT_PORT)
            .ok()
            .and_then(|v| u16::try_from(v).ok())
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn detect_model_path(&self) -> String {
        self.config
            .get_string(DETECT_MODEL_PATH)
            .unwrap_or(DEFAULT_DETECT_MODEL_PATH.to_string())
    }

    pub fn detect_class_names_path(&self) -> String {
        self.config
            .get_string(DETECT_CLASS_NAMES_PATH)
            .unwrap_or(DEFAULT_DETECT_CLASS_NAMES_PATH.to_string())
    }

    pub fn detect_max_upload_bytes(&self) -> usize {
        self.config
            .get_int(DETECT_MAX_UPLOAD_BYTES)
            .ok()
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn detect_settings(&self) -> DetectSettings {
        DetectSettings {
            address: self.detect_address(),
            port: self.detect_port(),
            model_path: self.detect_model_path(),
            class_names_path: self.detect_class_names_path(),
            max_upload_bytes: self.detect_max_upload_bytes(),
        }
    }

    // ========================================================================
    // Harvest service
    // ========================================================================

    pub fn harvest_address(&self) -> String {
        self.config
            .get_string(HARVEST_ADDRESS)
            .unwrap_or(DEFAULT_HARVEST_ADDRESS.to_string())
    }

    pub fn harvest_port(&self) -> u16 {
        self.config
            .get_int(HARVEST_PORT)
            .ok()
            .and_then(|v| u16::try_from(v).ok())
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn harvest_model_path(&self) -> String {
        self.config
            .get_string(HARVEST_MODEL_PATH)
            .unwrap_or(DEFAULT_HARVEST_MODEL_PATH.to_string())
    }

    pub fn harvest_settings(&self) -> HarvestSettings {
        HarvestSettings {
            address: self.harvest_address(),
            port: self.harvest_port(),
            model_path: self.harvest_model_path(),
        }
    }

    // ========================================================================
    // Logging
    // ========================================================================

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::from_config(
            self.config.get_string(LOGGING_DIR).ok(),
            self.config.get_bool(LOGGING_CONSOLE).unwrap_or(true),
            self.config.get_bool(LOGGING_FILE).unwrap_or(false),
            self.config
                .get_string(LOGGING_LEVEL)
                .unwrap_or("info".to_string()),
        )
    }
}
