//! Tandem Match - partner suggestion service for the Tandem language-exchange app
//!
//! The core of this library is the tiered match ranker: reciprocal language
//! partners first, then native speakers of the language being learned, then
//! the most recently active members of the community. Around it sit the
//! friend-request ledger operations, the PostgreSQL and in-memory stores, a
//! two-level result cache and the HTTP routes.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{MatchRanker, RankError, FriendRequestError};
pub use models::{UserProfile, PublicProfile, FriendRequest, MatchResult, TierLimits};
pub use services::{UserDirectory, FriendRequestLedger, InMemoryStore, PostgresStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let ranker = MatchRanker::default();
        assert_eq!(ranker.limits(), TierLimits::default());
    }
}
