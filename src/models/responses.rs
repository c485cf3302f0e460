use serde::{Deserialize, Serialize};
use crate::models::domain::{FriendRequestStatus, PublicProfile};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Friend request with both parties resolved to their public profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRequestView {
    #[serde(rename = "_id")]
    pub id: String,
    pub sender: PublicProfile,
    pub recipient: PublicProfile,
    pub status: FriendRequestStatus,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Response for the friend requests endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FriendRequestsResponse {
    #[serde(rename = "incomingReqs")]
    pub incoming: Vec<FriendRequestView>,
    #[serde(rename = "acceptedReqs")]
    pub accepted: Vec<FriendRequestView>,
}
