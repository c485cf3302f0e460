use std::collections::HashMap;

use thiserror::Error;

use crate::core::tiers::ExclusionSet;
use crate::models::{CandidateQuery, FriendRequest, FriendRequestView, FriendRequestsResponse, PublicProfile};
use crate::services::store::{FriendRequestLedger, StoreError, UserDirectory};

/// Errors returned by friend-request operations
#[derive(Debug, Error)]
pub enum FriendRequestError {
    #[error("You can't send friend request to yourself")]
    SelfRequest,

    #[error("Recipient not found")]
    RecipientNotFound,

    #[error("You are already friends with this user")]
    AlreadyFriends,

    #[error("A friend request already exists between you and this user")]
    AlreadyExists,

    #[error("Friend request not found")]
    RequestNotFound,

    #[error("You are not authorized to accept this request")]
    NotRecipient,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Internal error: {0}")]
    Internal(#[from] StoreError),
}

/// Send a friend request from `sender_id` to `recipient_id`
pub async fn send_friend_request(
    users: &dyn UserDirectory,
    requests: &dyn FriendRequestLedger,
    sender_id: &str,
    recipient_id: &str,
) -> Result<FriendRequest, FriendRequestError> {
    if sender_id == recipient_id {
        return Err(FriendRequestError::SelfRequest);
    }

    let recipient = users
        .find_by_id(recipient_id)
        .await?
        .ok_or(FriendRequestError::RecipientNotFound)?;

    if recipient.is_friends_with(sender_id) {
        return Err(FriendRequestError::AlreadyFriends);
    }

    if requests.find_between(sender_id, recipient_id).await?.is_some() {
        return Err(FriendRequestError::AlreadyExists);
    }

    // A concurrent request for the same pair can still win the insert
    match requests.create(sender_id, recipient_id).await {
        Ok(request) => Ok(request),
        Err(StoreError::Conflict(_)) => Err(FriendRequestError::AlreadyExists),
        Err(e) => Err(e.into()),
    }
}

/// Accept a pending request addressed to `user_id`
///
/// Accepting an already accepted request returns it unchanged.
pub async fn accept_friend_request(
    requests: &dyn FriendRequestLedger,
    user_id: &str,
    request_id: &str,
) -> Result<FriendRequest, FriendRequestError> {
    let request = requests
        .find_by_id(request_id)
        .await?
        .ok_or(FriendRequestError::RequestNotFound)?;

    if request.recipient != user_id {
        return Err(FriendRequestError::NotRecipient);
    }

    if !request.is_pending() {
        return Ok(request);
    }

    requests
        .accept(request_id)
        .await?
        .ok_or(FriendRequestError::RequestNotFound)
}

/// Incoming pending requests and accepted requests the user sent
pub async fn list_friend_requests(
    users: &dyn UserDirectory,
    requests: &dyn FriendRequestLedger,
    user_id: &str,
) -> Result<FriendRequestsResponse, FriendRequestError> {
    let incoming = requests.incoming_pending(user_id).await?;
    let accepted = requests.accepted_sent(user_id).await?;

    Ok(FriendRequestsResponse {
        incoming: resolve_views(users, incoming).await?,
        accepted: resolve_views(users, accepted).await?,
    })
}

/// Pending requests the user sent
pub async fn list_outgoing_requests(
    users: &dyn UserDirectory,
    requests: &dyn FriendRequestLedger,
    user_id: &str,
) -> Result<Vec<FriendRequestView>, FriendRequestError> {
    let outgoing = requests.outgoing_pending(user_id).await?;
    resolve_views(users, outgoing).await
}

/// Public profiles of the user's friends
pub async fn list_friends(
    users: &dyn UserDirectory,
    user_id: &str,
) -> Result<Vec<PublicProfile>, FriendRequestError> {
    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| FriendRequestError::UserNotFound(user_id.to_string()))?;

    Ok(users.find_public(&user.friends).await?)
}

/// Onboarded users other than the user and their friends
pub async fn recommended_users(
    users: &dyn UserDirectory,
    user_id: &str,
    limit: usize,
) -> Result<Vec<PublicProfile>, FriendRequestError> {
    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| FriendRequestError::UserNotFound(user_id.to_string()))?;

    let query = CandidateQuery {
        onboarded: Some(true),
        exclude_user_ids: ExclusionSet::for_requester(&user).to_vec(),
        limit: Some(limit),
        ..Default::default()
    };

    Ok(users.find_candidates(&query).await?)
}

/// Resolve both parties of each request; requests with a vanished party are dropped
async fn resolve_views(
    users: &dyn UserDirectory,
    requests: Vec<FriendRequest>,
) -> Result<Vec<FriendRequestView>, FriendRequestError> {
    if requests.is_empty() {
        return Ok(vec![]);
    }

    let mut ids: Vec<String> = requests
        .iter()
        .flat_map(|r| [r.sender.clone(), r.recipient.clone()])
        .collect();
    ids.sort();
    ids.dedup();

    let profiles: HashMap<String, PublicProfile> = users
        .find_public(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

    Ok(requests
        .into_iter()
        .filter_map(|r| {
            let sender = profiles.get(&r.sender)?.clone();
            let recipient = profiles.get(&r.recipient)?.clone();
            Some(FriendRequestView {
                id: r.id,
                sender,
                recipient,
                status: r.status,
                created_at: r.created_at,
            })
        })
        .collect())
}
