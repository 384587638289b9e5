//! Scoring Service - marks, ratings and related items for community content
//!
//! Port: 8080 unless `PROGRAMMER_HELPER_SERVICE_PORT` says otherwise

use actix_web::{web, App, HttpServer};
use programmer_helper_core::{
    init_logging, load_dotenv, ConfigLoader, EventBus, Inbox, LogConfig, ServiceConfig,
    WelcomeMessageHandler,
};
use programmer_helper_scoring::{config::ScoringConfig, init_service, server};
use std::sync::Arc;
use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_logging(&LogConfig::from_env("scoring-service"))?;

    let service_config = ServiceConfig::from_env()?;
    service_config.validate()?;
    let config = ScoringConfig::load()?;
    let bind_addr = service_config.bind_addr();

    info!("Starting Scoring Service on {}", bind_addr);

    // Event handlers are registered explicitly before any request is served
    let inbox = Inbox::new();
    let events = EventBus::new();
    events
        .register(Arc::new(WelcomeMessageHandler::new(inbox.clone())))
        .await;

    let service = init_service(config, events).await?;
    let app_state = web::Data::new(server::AppState::new(service, inbox));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(server::configure_routes)
            .wrap(actix_web::middleware::Logger::default())
    })
    .workers(service_config.workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
