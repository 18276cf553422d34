//! Data models shared by the HTTP layer.

pub mod app_state;
pub mod config;
pub mod constants;

pub use app_state::{DetectState, HarvestState};
pub use config::{Cli, Configuration, DetectSettings, HarvestSettings, Service};
