//! HTTP server setup for the two inference services.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, dev::Server, middleware::Logger, web};
use cropcast_common::{CropcastError, Result};
use cropcast_harvest::ForestRegressor;
use cropcast_vision::{BurnClassifier, ClassLabelTable, DiseaseModel, ServingBackend};
use tracing::info;

use crate::{
    api,
    model::{DetectSettings, DetectState, HarvestSettings, HarvestState},
};

/// Load the label table and classifier weights, checking they agree.
pub fn load_classifier(
    settings: &DetectSettings,
) -> Result<(BurnClassifier<ServingBackend>, ClassLabelTable)> {
    let labels = ClassLabelTable::load(&settings.class_names_path)?;
    let classifier = BurnClassifier::<ServingBackend>::load(
        &settings.model_path,
        labels.len(),
        Default::default(),
    )?;
    labels.ensure_matches(classifier.num_classes())?;
    info!(
        classes = labels.len(),
        labels = %settings.class_names_path,
        "Loaded class label table"
    );
    Ok((classifier, labels))
}

pub fn load_regressor(settings: &HarvestSettings) -> Result<ForestRegressor> {
    ForestRegressor::load(&settings.model_path)
}

fn bind_error(address: &str, port: u16, e: std::io::Error) -> CropcastError {
    CropcastError::ConfigError(format!("failed to bind {}:{}: {}", address, port, e))
}

/// Creates and binds the image classification server.
///
/// Every actix worker receives its own clone of `classifier`.
pub fn detect_server<M>(
    classifier: M,
    labels: ClassLabelTable,
    settings: &DetectSettings,
) -> Result<Server>
where
    M: DiseaseModel + Clone + Send + 'static,
{
    let labels = Arc::new(labels);
    let max_upload_bytes = settings.max_upload_bytes;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(web::Data::new(DetectState::new(
                classifier.clone(),
                labels.clone(),
                max_upload_bytes,
            )))
            .service(api::detect::routes::<M>())
    })
    .bind((settings.address.as_str(), settings.port))
    .map_err(|e| bind_error(&settings.address, settings.port, e))?;

    info!(
        address = %settings.address,
        port = settings.port,
        "Crop disease detection service listening"
    );
    Ok(server.run())
}

/// Creates and binds the harvest prediction server.
pub fn harvest_server(
    model: Arc<dyn cropcast_harvest::HarvestModel + Send + Sync>,
    settings: &HarvestSettings,
) -> Result<Server> {
    let state = web::Data::new(HarvestState::new(model));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .service(api::predict::routes())
    })
    .bind((settings.address.as_str(), settings.port))
    .map_err(|e| bind_error(&settings.address, settings.port, e))?;

    info!(
        address = %settings.address,
        port = settings.port,
        "Harvest prediction service listening"
    );
    Ok(server.run())
}
