use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full user record as held by the user directory
///
/// Credentials never reach this type; the directory only selects the
/// columns listed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(rename = "profilePic", default)]
    pub profile_pic: String,
    #[serde(rename = "nativeLanguage", default)]
    pub native_language: String,
    #[serde(rename = "learningLanguage", default)]
    pub learning_language: String,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "isOnboarded", default)]
    pub is_onboarded: bool,
    #[serde(default)]
    pub friends: Vec<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Both native and learning language are set
    pub fn has_language_preferences(&self) -> bool {
        !self.native_language.trim().is_empty() && !self.learning_language.trim().is_empty()
    }

    pub fn is_friends_with(&self, user_id: &str) -> bool {
        self.friends.iter().any(|f| f == user_id)
    }

    pub fn to_public(&self) -> PublicProfile {
        PublicProfile {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            profile_pic: self.profile_pic.clone(),
            native_language: self.native_language.clone(),
            learning_language: self.learning_language.clone(),
            bio: self.bio.clone(),
        }
    }
}

/// Safe public projection of a user, the only shape returned to other users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(rename = "profilePic")]
    pub profile_pic: String,
    #[serde(rename = "nativeLanguage")]
    pub native_language: String,
    #[serde(rename = "learningLanguage")]
    pub learning_language: String,
    pub bio: String,
}

impl From<UserProfile> for PublicProfile {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            full_name: profile.full_name,
            profile_pic: profile.profile_pic,
            native_language: profile.native_language,
            learning_language: profile.learning_language,
            bio: profile.bio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
}

/// A friend request between two users
///
/// At most one request exists per unordered pair of users. Accepted
/// requests are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRequest {
    #[serde(rename = "_id")]
    pub id: String,
    pub sender: String,
    pub recipient: String,
    pub status: FriendRequestStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl FriendRequest {
    pub fn is_pending(&self) -> bool {
        self.status == FriendRequestStatus::Pending
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.sender == user_id || self.recipient == user_id
    }

    /// The party that is not `user_id`
    pub fn other_party(&self, user_id: &str) -> &str {
        if self.sender == user_id {
            &self.recipient
        } else {
            &self.sender
        }
    }
}

/// Tiered suggestion list for one requester
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub tier1: Vec<PublicProfile>,
    pub tier2: Vec<PublicProfile>,
    pub tier3: Vec<PublicProfile>,
}

impl MatchResult {
    pub fn len(&self) -> usize {
        self.tier1.len() + self.tier2.len() + self.tier3.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All suggested ids, tier by tier
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tier1
            .iter()
            .chain(&self.tier2)
            .chain(&self.tier3)
            .map(|p| p.id.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CandidateSort {
    /// Stable tie-break for the language tiers
    #[default]
    IdAscending,
    /// Most recently updated first, then id ascending
    RecentlyUpdated,
}

/// Candidate query parameters understood by every user directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateQuery {
    pub native_language: Option<String>,
    pub learning_language: Option<String>,
    pub onboarded: Option<bool>,
    pub exclude_user_ids: Vec<String>,
    pub sort: CandidateSort,
    pub limit: Option<usize>,
}

/// Slot budget for the suggestion tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierLimits {
    pub total_slots: usize,
    pub reciprocal_limit: usize,
}

impl Default for TierLimits {
    fn default() -> Self {
        Self {
            total_slots: 10,
            reciprocal_limit: 5,
        }
    }
}
