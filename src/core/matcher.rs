use thiserror::Error;

use crate::core::tiers::{tier_plan, ExclusionSet, Tier};
use crate::models::{MatchResult, TierLimits};
use crate::services::store::{FriendRequestLedger, StoreError, UserDirectory};

/// Errors returned by the match ranker
#[derive(Debug, Error)]
pub enum RankError {
    #[error("Please set your language preferences to see matches")]
    IncompletePreferences,

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(#[from] StoreError),
}

/// Tiered suggestion ranker
///
/// # Tiers
/// 1. Reciprocal partners (capped at `reciprocal_limit`)
/// 2. Native speakers of the requester's learning language
/// 3. Most recently active onboarded users
///
/// Each tier only fills the slots left by the ones before it, and every
/// selected id is excluded from the following tiers. The requester, their
/// friends and anyone with a pending request either way are never suggested.
///
/// Within tiers 1 and 2 candidates are ordered by id; tier 3 is ordered by
/// last update, newest first, with id as tie-break.
#[derive(Debug, Clone)]
pub struct MatchRanker {
    limits: TierLimits,
}

impl MatchRanker {
    pub fn new(limits: TierLimits) -> Self {
        Self { limits }
    }

    pub fn with_default_limits() -> Self {
        Self {
            limits: TierLimits::default(),
        }
    }

    pub fn limits(&self) -> TierLimits {
        self.limits
    }

    /// Rank suggestions for `requester_id`
    ///
    /// Read-only with respect to both stores. Any store failure aborts the
    /// whole ranking; no partial result is returned.
    pub async fn rank_matches(
        &self,
        users: &dyn UserDirectory,
        requests: &dyn FriendRequestLedger,
        requester_id: &str,
    ) -> Result<MatchResult, RankError> {
        let requester = users
            .find_by_id(requester_id)
            .await?
            .ok_or_else(|| RankError::NotFound(requester_id.to_string()))?;

        if !requester.has_language_preferences() {
            return Err(RankError::IncompletePreferences);
        }

        let mut excluded = ExclusionSet::for_requester(&requester);

        let pending = requests.find_pending_for(requester_id).await?;
        for request in &pending {
            excluded.insert(request.other_party(requester_id));
        }

        tracing::debug!(
            "Ranking for {}: {} friends, {} pending requests, {} excluded",
            requester_id,
            requester.friends.len(),
            pending.len(),
            excluded.len()
        );

        let mut result = MatchResult::default();

        for spec in tier_plan(&self.limits) {
            let budget = spec.budget(self.limits.total_slots, result.len());
            if budget == 0 {
                tracing::debug!("Skipping {:?} tier for {}: no slots left", spec.tier, requester_id);
                continue;
            }

            let query = spec.tier.query(&requester, &excluded, budget);
            let mut selected = users.find_candidates(&query).await?;
            selected.truncate(budget);

            excluded.extend(selected.iter().map(|p| p.id.clone()));

            match spec.tier {
                Tier::Reciprocal => result.tier1 = selected,
                Tier::NativeSpeaker => result.tier2 = selected,
                Tier::Community => result.tier3 = selected,
            }
        }

        Ok(result)
    }
}

impl Default for MatchRanker {
    fn default() -> Self {
        Self::with_default_limits()
    }
}
