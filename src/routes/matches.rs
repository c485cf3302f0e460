use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;

use crate::core::RankError;
use crate::models::{HealthResponse, MatchResult, SuggestedMatchesRequest};
use crate::routes::errors::json_error;
use crate::routes::session::SessionUser;
use crate::routes::AppState;

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/users/matches", web::get().to(suggested_matches))
        .route("/matches/suggested", web::post().to(suggested_matches_for));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = match state.users.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Store health check failed: {}", e);
            false
        }
    };

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Suggested matches for the session user
///
/// GET /api/v1/users/matches
///
/// Response body:
/// ```json
/// { "tier1": [...], "tier2": [...], "tier3": [...] }
/// ```
async fn suggested_matches(
    state: web::Data<AppState>,
    session: SessionUser,
) -> Result<HttpResponse, RankError> {
    let result = ranked_matches(&state, &session.user_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Suggested matches for the user named in the body
///
/// POST /api/v1/matches/suggested
///
/// The body must name the session user; any other id is rejected with 403.
///
/// Request body:
/// ```json
/// { "userId": "string" }
/// ```
async fn suggested_matches_for(
    state: web::Data<AppState>,
    session: SessionUser,
    req: web::Json<SuggestedMatchesRequest>,
) -> Result<HttpResponse, RankError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for suggested matches request: {:?}", errors);
        return Ok(json_error(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string()));
    }

    if req.user_id != session.user_id {
        tracing::warn!("User {} requested matches for {}", session.user_id, req.user_id);
        return Ok(json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "You can only view your own matches",
        ));
    }

    let result = ranked_matches(&state, &req.user_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Rank through the cache when one is configured
///
/// Cache failures never fail the request.
async fn ranked_matches(state: &AppState, user_id: &str) -> Result<MatchResult, RankError> {
    if let Some(cache) = &state.cache {
        match cache.get_matches(user_id).await {
            Ok(Some(cached)) => {
                tracing::debug!("Serving cached matches for {}", user_id);
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to read cached matches for {}: {}", user_id, e),
        }
    }

    tracing::info!("Ranking matches for user: {}", user_id);

    let result = state
        .ranker
        .rank_matches(state.users.as_ref(), state.requests.as_ref(), user_id)
        .await?;

    tracing::info!(
        "Returning {} matches for user {} (tier1: {}, tier2: {}, tier3: {})",
        result.len(),
        user_id,
        result.tier1.len(),
        result.tier2.len(),
        result.tier3.len()
    );

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.put_matches(user_id, &result).await {
            tracing::warn!("Failed to cache matches for {}: {}", user_id, e);
        }
    }

    Ok(result)
}
