/// Admin moderation endpoints under `/api/v0/admin/moderation`.
///
/// Callers authenticate with the `X-Admin-Key` header.
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use tracing::info;

use super::moderation::require_content;
use crate::error::{Result, TrustSafetyError};
use crate::models::{ModerationInput, ModerationResult};
use crate::services::{ModerationGate, StatsSnapshot};

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

type HmacSha256 = Hmac<Sha256>;

/// Compare two secrets in constant time by MACing both under the expected key
fn keys_match(expected: &str, provided: &str) -> bool {
    let (Ok(mut reference), Ok(mut candidate)) = (
        HmacSha256::new_from_slice(expected.as_bytes()),
        HmacSha256::new_from_slice(expected.as_bytes()),
    ) else {
        return false;
    };
    reference.update(expected.as_bytes());
    candidate.update(provided.as_bytes());
    candidate
        .verify_slice(&reference.finalize().into_bytes())
        .is_ok()
}

/// Shared-secret check for admin routes.
///
/// Without a configured key (development only) every caller is admitted.
#[derive(Clone)]
pub struct AdminAuth {
    api_key: Option<String>,
}

impl AdminAuth {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    pub fn authorize(&self, req: &HttpRequest) -> Result<()> {
        let Some(expected) = self.api_key.as_deref() else {
            return Ok(());
        };

        let provided = req
            .headers()
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        match provided {
            Some(key) if keys_match(expected, key) => Ok(()),
            _ => Err(TrustSafetyError::Forbidden(
                "Not authorized to access admin endpoints".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: StatsSnapshot,
    pub server_time: String,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub reset_time: String,
}

#[derive(Debug, Serialize)]
pub struct AdminTestResult {
    pub input: ModerationInput,
    pub moderation_result: ModerationResult,
    pub timestamp: String,
}

/// GET /api/v0/admin/moderation/stats
#[get("/stats")]
pub async fn get_stats(
    req: HttpRequest,
    auth: web::Data<AdminAuth>,
    gate: web::Data<ModerationGate>,
) -> Result<HttpResponse> {
    auth.authorize(&req)?;

    Ok(HttpResponse::Ok().json(StatsResponse {
        stats: gate.stats().snapshot(),
        server_time: Utc::now().to_rfc3339(),
    }))
}

/// POST /api/v0/admin/moderation/reset-stats
#[post("/reset-stats")]
pub async fn reset_stats(
    req: HttpRequest,
    auth: web::Data<AdminAuth>,
    gate: web::Data<ModerationGate>,
) -> Result<HttpResponse> {
    auth.authorize(&req)?;
    gate.stats().reset();
    info!("Moderation statistics reset by admin");

    Ok(HttpResponse::Ok().json(ResetResponse {
        status: "success",
        message: "Moderation statistics have been reset",
        reset_time: Utc::now().to_rfc3339(),
    }))
}

/// POST /api/v0/admin/moderation/test
#[post("/test")]
pub async fn admin_test(
    req: HttpRequest,
    body: web::Json<ModerationInput>,
    auth: web::Data<AdminAuth>,
    gate: web::Data<ModerationGate>,
) -> Result<HttpResponse> {
    auth.authorize(&req)?;
    require_content(&body)?;

    let input = body.into_inner();
    let moderation_result = gate.moderate(&input).await;

    Ok(HttpResponse::Ok().json(AdminTestResult {
        input,
        moderation_result,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// POST /api/v0/admin/moderation/test-bulk
///
/// Items without content are skipped rather than rejected.
#[post("/test-bulk")]
pub async fn admin_test_bulk(
    req: HttpRequest,
    body: web::Json<Vec<ModerationInput>>,
    auth: web::Data<AdminAuth>,
    gate: web::Data<ModerationGate>,
) -> Result<HttpResponse> {
    auth.authorize(&req)?;

    let items = body.into_inner();
    if items.is_empty() {
        return Err(TrustSafetyError::InvalidInput(
            "The content_items list cannot be empty".to_string(),
        ));
    }

    let mut results = Vec::with_capacity(items.len());
    for input in items.into_iter().filter(|item| !item.is_empty()) {
        let moderation_result = gate.moderate(&input).await;
        results.push(AdminTestResult {
            input,
            moderation_result,
            timestamp: Utc::now().to_rfc3339(),
        });
    }

    Ok(HttpResponse::Ok().json(results))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin/moderation")
            .service(get_stats)
            .service(reset_stats)
            .service(admin_test)
            .service(admin_test_bulk),
    );
}
