pub mod admin;
pub mod moderation;

pub use admin::AdminAuth;

use actix_web::{get, web, HttpResponse};
use serde_json::json;

use crate::metrics;

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "trust-safety-service",
    }))
}

#[get("/metrics")]
pub async fn metrics_endpoint() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics::render())
}

/// Register every route; expects `ModerationGate` and `AdminAuth` app data
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(metrics_endpoint).service(
        web::scope("/api/v0")
            .configure(moderation::configure)
            .configure(admin::configure),
    );
}
