/// Recommendation API Handlers
///
/// HTTP endpoints under `/api/v0/recommendations`. User identity comes from
/// the request; authentication happens upstream.
use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{ChallengeRecommendationRequest, ContentKind, PostRecommendationRequest};
use crate::services::RecommendationService;

/// Query parameters for interaction endpoints
#[derive(Debug, Deserialize)]
pub struct InteractionQuery {
    pub user_id: Uuid,
}

fn default_confidence() -> f64 {
    1.0
}

/// Request body for tagging content
#[derive(Debug, Deserialize, Validate)]
pub struct TagRequest {
    #[validate(length(min = 1, max = 64))]
    pub category: String,
    #[serde(default = "default_confidence")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub confidence: f64,
}

/// Envelope used by the interaction endpoints
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

fn parse_kind(raw: &str) -> Result<ContentKind> {
    raw.parse::<ContentKind>().map_err(AppError::NotFound)
}

/// POST /api/v0/recommendations/posts/recommend
#[post("/posts/recommend")]
pub async fn recommend_posts(
    body: web::Json<PostRecommendationRequest>,
    service: web::Data<RecommendationService>,
) -> Result<HttpResponse> {
    let request = body.into_inner();
    debug!(user_id = %request.user_id, limit = request.limit, "Post recommendations requested");

    let response = service.scorer.get_post_recommendations(&request).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/v0/recommendations/challenges/recommend
#[post("/challenges/recommend")]
pub async fn recommend_challenges(
    body: web::Json<ChallengeRecommendationRequest>,
    service: web::Data<RecommendationService>,
) -> Result<HttpResponse> {
    let request = body.into_inner();
    debug!(user_id = %request.user_id, limit = request.limit, "Challenge recommendations requested");

    let response = service.scorer.get_challenge_recommendations(&request).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/v0/recommendations/{kind}/{content_id}/interactions/{interaction_type}
///
/// The recorder itself tolerates unknown types; the API boundary does not.
#[post("/{kind}/{content_id}/interactions/{interaction_type}")]
pub async fn record_interaction(
    path: web::Path<(String, Uuid, String)>,
    query: web::Query<InteractionQuery>,
    service: web::Data<RecommendationService>,
) -> Result<HttpResponse> {
    let (kind, content_id, interaction_type) = path.into_inner();
    let kind = parse_kind(&kind)?;

    if !kind.accepts_interaction(&interaction_type) {
        return Err(AppError::BadRequest("Invalid interaction type".to_string()));
    }

    let recorded = service
        .recorder
        .record_interaction(kind, query.user_id, content_id, &interaction_type)
        .await?;

    Ok(HttpResponse::Ok().json(DataResponse {
        success: true,
        data: recorded.interaction,
    }))
}

/// POST /api/v0/recommendations/{kind}/{content_id}/categories
#[post("/{kind}/{content_id}/categories")]
pub async fn tag_content(
    path: web::Path<(String, Uuid)>,
    body: web::Json<TagRequest>,
    service: web::Data<RecommendationService>,
) -> Result<HttpResponse> {
    let (kind, content_id) = path.into_inner();
    let kind = parse_kind(&kind)?;
    body.validate()?;

    let tag = service
        .tag_content(kind, content_id, &body.category, body.confidence)
        .await?;

    Ok(HttpResponse::Ok().json(DataResponse {
        success: true,
        data: tag,
    }))
}

/// GET /api/v0/recommendations/users/{user_id}/interests
#[get("/users/{user_id}/interests")]
pub async fn list_interests(
    path: web::Path<Uuid>,
    service: web::Data<RecommendationService>,
) -> Result<HttpResponse> {
    let interests = service.list_user_interests(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(interests))
}

/// POST /api/v0/recommendations/logs/{log_id}/click
#[post("/logs/{log_id}/click")]
pub async fn mark_clicked(
    path: web::Path<Uuid>,
    service: web::Data<RecommendationService>,
) -> Result<HttpResponse> {
    let log = service.mark_recommendation_clicked(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(DataResponse {
        success: true,
        data: log,
    }))
}

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        service: "recommendation-service",
    })
}

#[get("/metrics")]
pub async fn metrics_endpoint() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics::render())
}

/// Register every route on an app or scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(metrics_endpoint).service(
        web::scope("/api/v0/recommendations")
            .service(recommend_posts)
            .service(recommend_challenges)
            .service(list_interests)
            .service(mark_clicked)
            .service(record_interaction)
            .service(tag_content),
    );
}
