pub mod handlers;

use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use programmer_helper_core::Inbox;

use crate::service::ScoringService;

/// Application state shared across all handlers
pub struct AppState {
    pub service: ScoringService,
    pub inbox: Inbox,
}

impl AppState {
    pub fn new(service: ScoringService, inbox: Inbox) -> Self {
        Self { service, inbox }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "scoring-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Configure application routes
///
/// Fixed paths are registered before the `/{kind}` catch-alls. Extractor
/// failures are answered with the same JSON error body as the handlers.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(handlers::query_error))
        .app_data(web::JsonConfig::default().error_handler(handlers::json_error))
        .app_data(web::PathConfig::default().error_handler(handlers::path_error));

    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health))
            // Single items
            .service(
                web::scope("/items")
                    .route("/{id}", web::get().to(handlers::get_item))
                    .route("/{id}/related", web::get().to(handlers::related_items))
                    .route("/{id}/opinions", web::post().to(handlers::create_opinion))
                    .route("/{id}/scopes", web::post().to(handlers::create_scope)),
            )
            // Accounts
            .route("/accounts", web::post().to(handlers::create_account))
            .route("/accounts/{user}/inbox", web::get().to(handlers::account_inbox))
            // Books
            .route("/books/big", web::get().to(handlers::big_books))
            .route("/books/size/{label}", web::get().to(handlers::books_by_size))
            // Per-kind listings
            .route("/{kind}/by-rating", web::get().to(handlers::by_rating))
            .route("/{kind}/by-marks", web::get().to(handlers::by_marks))
            .route("/{kind}/popular", web::get().to(handlers::popular))
            .route("/{kind}/hot", web::get().to(handlers::hot))
            .route("/{kind}", web::get().to(handlers::listing)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test::init_service(App::new().configure(configure_routes)).await;

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }
}
