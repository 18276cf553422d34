//! Application startup utilities module.
//!
//! Shared initialization code for the service binaries.

mod http;
mod logging;

pub use http::{detect_server, harvest_server, load_classifier, load_regressor};
pub use logging::{LogRotation, LoggingConfig, LoggingGuard, init_logging};
