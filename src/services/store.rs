use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CandidateQuery, FriendRequest, PublicProfile, UserProfile};

/// Errors that can occur when reading or writing the user and friend-request stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to user profiles
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Full profile including the friend set, or `None` if the id does not resolve
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Profiles matching every predicate of `query`, sorted and limited as requested
    async fn find_candidates(&self, query: &CandidateQuery) -> Result<Vec<PublicProfile>, StoreError>;

    /// Public profiles for `ids`, in the order given; unknown ids are skipped
    async fn find_public(&self, ids: &[String]) -> Result<Vec<PublicProfile>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// The friend-request ledger
#[async_trait]
pub trait FriendRequestLedger: Send + Sync {
    /// Pending requests where the user is sender or recipient
    async fn find_pending_for(&self, user_id: &str) -> Result<Vec<FriendRequest>, StoreError>;

    /// Any request between the two users, in either direction
    async fn find_between(&self, a: &str, b: &str) -> Result<Option<FriendRequest>, StoreError>;

    async fn find_by_id(&self, request_id: &str) -> Result<Option<FriendRequest>, StoreError>;

    /// Create a pending request
    ///
    /// Fails with [`StoreError::Conflict`] if a request already exists for the pair.
    async fn create(&self, sender_id: &str, recipient_id: &str) -> Result<FriendRequest, StoreError>;

    /// Mark a request accepted and add each party to the other's friend set
    ///
    /// Both changes are applied together. Returns `None` if the request does not exist.
    async fn accept(&self, request_id: &str) -> Result<Option<FriendRequest>, StoreError>;

    async fn incoming_pending(&self, user_id: &str) -> Result<Vec<FriendRequest>, StoreError>;

    async fn outgoing_pending(&self, user_id: &str) -> Result<Vec<FriendRequest>, StoreError>;

    /// Accepted requests the user sent
    async fn accepted_sent(&self, user_id: &str) -> Result<Vec<FriendRequest>, StoreError>;
}
