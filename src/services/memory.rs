use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::core::filters::{apply_candidate_query, order_by_ids};
use crate::models::{CandidateQuery, FriendRequest, FriendRequestStatus, PublicProfile, UserProfile};
use crate::services::store::{FriendRequestLedger, StoreError, UserDirectory};

#[derive(Debug, Default)]
struct StoreState {
    users: BTreeMap<String, UserProfile>,
    requests: Vec<FriendRequest>,
}

/// In-process user directory and friend-request ledger
///
/// Applies the same filter, sort and limit rules as the PostgreSQL store.
/// Used for local development, tests and benchmarks.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users<I: IntoIterator<Item = UserProfile>>(users: I) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.write().unwrap_or_else(|e| e.into_inner());
            for user in users {
                state.users.insert(user.id.clone(), user);
            }
        }
        store
    }

    /// Insert or replace a user
    pub fn insert_user(&self, user: UserProfile) -> Result<(), StoreError> {
        self.write()?.users.insert(user.id.clone(), user);
        Ok(())
    }

    /// Insert a request as-is, bypassing the pair check
    pub fn insert_request(&self, request: FriendRequest) -> Result<(), StoreError> {
        self.write()?.requests.push(request);
        Ok(())
    }

    pub fn user_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.users.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".into()))
    }

    fn collect_requests<F>(&self, predicate: F) -> Result<Vec<FriendRequest>, StoreError>
    where
        F: Fn(&FriendRequest) -> bool,
    {
        Ok(self
            .read()?
            .requests
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect())
    }
}

fn add_friend(state: &mut StoreState, user_id: &str, friend_id: &str) {
    if let Some(user) = state.users.get_mut(user_id) {
        if !user.is_friends_with(friend_id) {
            user.friends.push(friend_id.to_string());
        }
        user.updated_at = Utc::now();
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.read()?.users.get(user_id).cloned())
    }

    async fn find_candidates(&self, query: &CandidateQuery) -> Result<Vec<PublicProfile>, StoreError> {
        let state = self.read()?;
        Ok(apply_candidate_query(state.users.values(), query))
    }

    async fn find_public(&self, ids: &[String]) -> Result<Vec<PublicProfile>, StoreError> {
        let state = self.read()?;
        let found = ids
            .iter()
            .filter_map(|id| state.users.get(id))
            .map(UserProfile::to_public)
            .collect();
        Ok(order_by_ids(found, ids))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(self.state.read().is_ok())
    }
}

#[async_trait]
impl FriendRequestLedger for InMemoryStore {
    async fn find_pending_for(&self, user_id: &str) -> Result<Vec<FriendRequest>, StoreError> {
        self.collect_requests(|r| r.is_pending() && r.involves(user_id))
    }

    async fn find_between(&self, a: &str, b: &str) -> Result<Option<FriendRequest>, StoreError> {
        Ok(self
            .read()?
            .requests
            .iter()
            .find(|r| r.involves(a) && r.other_party(a) == b)
            .cloned())
    }

    async fn find_by_id(&self, request_id: &str) -> Result<Option<FriendRequest>, StoreError> {
        Ok(self
            .read()?
            .requests
            .iter()
            .find(|r| r.id == request_id)
            .cloned())
    }

    async fn create(&self, sender_id: &str, recipient_id: &str) -> Result<FriendRequest, StoreError> {
        let mut state = self.write()?;

        if state
            .requests
            .iter()
            .any(|r| r.involves(sender_id) && r.other_party(sender_id) == recipient_id)
        {
            return Err(StoreError::Conflict(format!(
                "friend request between {} and {} already exists",
                sender_id, recipient_id
            )));
        }

        let now = Utc::now();
        let request = FriendRequest {
            id: uuid::Uuid::new_v4().to_string(),
            sender: sender_id.to_string(),
            recipient: recipient_id.to_string(),
            status: FriendRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.requests.push(request.clone());

        Ok(request)
    }

    async fn accept(&self, request_id: &str) -> Result<Option<FriendRequest>, StoreError> {
        let mut state = self.write()?;

        let Some(request) = state.requests.iter_mut().find(|r| r.id == request_id) else {
            return Ok(None);
        };
        request.status = FriendRequestStatus::Accepted;
        request.updated_at = Utc::now();
        let accepted = request.clone();

        add_friend(&mut state, &accepted.sender, &accepted.recipient);
        add_friend(&mut state, &accepted.recipient, &accepted.sender);

        Ok(Some(accepted))
    }

    async fn incoming_pending(&self, user_id: &str) -> Result<Vec<FriendRequest>, StoreError> {
        self.collect_requests(|r| r.is_pending() && r.recipient == user_id)
    }

    async fn outgoing_pending(&self, user_id: &str) -> Result<Vec<FriendRequest>, StoreError> {
        self.collect_requests(|r| r.is_pending() && r.sender == user_id)
    }

    async fn accepted_sent(&self, user_id: &str) -> Result<Vec<FriendRequest>, StoreError> {
        self.collect_requests(|r| !r.is_pending() && r.sender == user_id)
    }
}
