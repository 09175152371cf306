/// Moderation API Handlers
///
/// Endpoints under `/api/v0/moderation`. Every request must carry text,
/// images, or both.
use actix_web::{post, web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use validator::Validate;

use crate::error::{Result, TrustSafetyError};
use crate::models::{ModeratedContent, ModerationInput, ModerationResult};
use crate::services::ModerationGate;

pub(crate) const MISSING_CONTENT: &str =
    "At least one of text_content or image_urls must be provided";

pub(crate) fn require_content(input: &ModerationInput) -> Result<()> {
    input.validate()?;
    if input.is_empty() {
        return Err(TrustSafetyError::InvalidInput(MISSING_CONTENT.to_string()));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ModerationTestResponse {
    pub flagged: bool,
    pub categories: BTreeMap<String, bool>,
    pub category_scores: BTreeMap<String, f64>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct SafeCheckResponse {
    pub is_safe: bool,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct GateResponse {
    pub allowed: bool,
    pub result: ModerationResult,
}

/// POST /api/v0/moderation/test
#[post("/test")]
pub async fn test_moderation(
    body: web::Json<ModerationInput>,
    gate: web::Data<ModerationGate>,
) -> Result<HttpResponse> {
    require_content(&body)?;
    let result = gate.moderate(&body).await;

    Ok(HttpResponse::Ok().json(ModerationTestResponse {
        flagged: result.flagged,
        categories: result.categories,
        category_scores: result.category_scores,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// POST /api/v0/moderation/safe-check
#[post("/safe-check")]
pub async fn safe_check(
    body: web::Json<ModerationInput>,
    gate: web::Data<ModerationGate>,
) -> Result<HttpResponse> {
    require_content(&body)?;
    let result = gate.moderate(&body).await;

    Ok(HttpResponse::Ok().json(SafeCheckResponse {
        is_safe: !result.flagged,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

async fn check(
    body: web::Json<ModerationInput>,
    gate: web::Data<ModerationGate>,
    content: ModeratedContent,
) -> Result<HttpResponse> {
    require_content(&body)?;
    let result = gate.ensure_allowed(&body, content).await?;

    Ok(HttpResponse::Ok().json(GateResponse {
        allowed: true,
        result,
    }))
}

/// POST /api/v0/moderation/check-post
#[post("/check-post")]
pub async fn check_post(
    body: web::Json<ModerationInput>,
    gate: web::Data<ModerationGate>,
) -> Result<HttpResponse> {
    check(body, gate, ModeratedContent::Post).await
}

/// POST /api/v0/moderation/check-challenge
#[post("/check-challenge")]
pub async fn check_challenge(
    body: web::Json<ModerationInput>,
    gate: web::Data<ModerationGate>,
) -> Result<HttpResponse> {
    check(body, gate, ModeratedContent::Challenge).await
}

/// POST /api/v0/moderation/check-comment
#[post("/check-comment")]
pub async fn check_comment(
    body: web::Json<ModerationInput>,
    gate: web::Data<ModerationGate>,
) -> Result<HttpResponse> {
    check(body, gate, ModeratedContent::Comment).await
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/moderation")
            .service(test_moderation)
            .service(safe_check)
            .service(check_post)
            .service(check_challenge)
            .service(check_comment),
    );
}
