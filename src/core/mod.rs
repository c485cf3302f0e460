// Core algorithm exports
pub mod filters;
pub mod friends;
pub mod matcher;
pub mod tiers;

pub use filters::{apply_candidate_query, compare_candidates, matches_candidate_query};
pub use friends::FriendRequestError;
pub use matcher::{MatchRanker, RankError};
pub use tiers::{tier_plan, ExclusionSet, Tier, TierSpec};
