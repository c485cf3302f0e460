// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CandidateQuery, CandidateSort, FriendRequest, FriendRequestStatus, MatchResult, PublicProfile,
    TierLimits, UserProfile,
};
pub use requests::SuggestedMatchesRequest;
pub use responses::{
    ErrorResponse, FriendRequestView, FriendRequestsResponse, HealthResponse, MessageResponse,
};
