//! Entry point of the crop disease detection service.

use cropcast_server::{
    model::{Configuration, Service},
    startup,
};
use tracing::info;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let configuration = Configuration::new(Service::Detect)?;
    let _logging_guard = startup::init_logging(&configuration.logging_config())?;

    let settings = configuration.detect_settings();
    info!(
        model = %settings.model_path,
        labels = %settings.class_names_path,
        "Loading crop disease classifier"
    );
    let (classifier, labels) = startup::load_classifier(&settings)?;

    startup::detect_server(classifier, labels, &settings)?.await?;
    Ok(())
}
