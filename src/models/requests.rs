use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to rank suggestions for a user, sent by trusted internal callers
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SuggestedMatchesRequest {
    #[validate(length(min = 1, max = 128))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}
