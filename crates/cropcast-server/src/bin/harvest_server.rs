//! Entry point of the harvest prediction service.

use std::sync::Arc;

use cropcast_server::{
    model::{Configuration, Service},
    startup,
};
use tracing::info;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let configuration = Configuration::new(Service::Harvest)?;
    let _logging_guard = startup::init_logging(&configuration.logging_config())?;

    let settings = configuration.harvest_settings();
    info!(model = %settings.model_path, "Loading harvest regressor");
    let regressor = startup::load_regressor(&settings)?;

    startup::harvest_server(Arc::new(regressor), &settings)?.await?;
    Ok(())
}
