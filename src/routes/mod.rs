// Route exports
pub mod errors;
pub mod friends;
pub mod matches;
pub mod session;

use actix_web::web;
use std::sync::Arc;

use crate::core::MatchRanker;
use crate::services::{FriendRequestLedger, MatchCache, SessionVerifier, UserDirectory};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserDirectory>,
    pub requests: Arc<dyn FriendRequestLedger>,
    pub cache: Option<Arc<MatchCache>>,
    pub sessions: Arc<SessionVerifier>,
    pub ranker: MatchRanker,
    pub recommended_limit: usize,
}

impl AppState {
    /// Drop cached suggestions for users whose exclusions just changed
    pub async fn invalidate_matches(&self, user_ids: &[&str]) {
        let Some(cache) = &self.cache else {
            return;
        };

        if let Err(e) = cache.invalidate(user_ids).await {
            tracing::warn!("Failed to invalidate cached matches for {:?}: {}", user_ids, e);
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(friends::configure),
    );
}
