//! Configuration keys and defaults for the Cropcast services.

pub const DEFAULT_CONFIG_FILE: &str = "conf/application.yml";
pub const ENV_PREFIX: &str = "CROPCAST";
pub const ENV_SEPARATOR: &str = "__";

pub const DEFAULT_PORT: u16 = 5000;

pub const DETECT_ADDRESS: &str = "detect.address";
pub const DETECT_PORT: &str = "detect.port";
pub const DETECT_MODEL_PATH: &str = "detect.model_path";
pub const DETECT_CLASS_NAMES_PATH: &str = "detect.class_names_path";
pub const DETECT_MAX_UPLOAD_BYTES: &str = "detect.max_upload_bytes";

pub const DEFAULT_DETECT_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_DETECT_MODEL_PATH: &str = "model/crop_disease_model.safetensors";
pub const DEFAULT_DETECT_CLASS_NAMES_PATH: &str = "model/class_names.json";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const HARVEST_ADDRESS: &str = "harvest.address";
pub const HARVEST_PORT: &str = "harvest.port";
pub const HARVEST_MODEL_PATH: &str = "harvest.model_path";

pub const DEFAULT_HARVEST_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_HARVEST_MODEL_PATH: &str = "model/harvest_predictor.json";

pub const LOGGING_DIR: &str = "logging.dir";
pub const LOGGING_CONSOLE: &str = "logging.console";
pub const LOGGING_FILE: &str = "logging.file";
pub const LOGGING_LEVEL: &str = "logging.level";

/// Multipart field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "image";
pub const NO_IMAGE_UPLOADED: &str = "No image uploaded";
