use actix_web::{web, HttpResponse};

use crate::core::friends::{
    accept_friend_request, list_friend_requests, list_friends, list_outgoing_requests,
    recommended_users, send_friend_request,
};
use crate::core::FriendRequestError;
use crate::models::MessageResponse;
use crate::routes::session::SessionUser;
use crate::routes::AppState;

/// Configure user discovery and friend-request routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/users", web::get().to(recommended))
        .route("/users/friends", web::get().to(my_friends))
        .route("/users/friend-request/{id}", web::post().to(send_request))
        .route("/users/friend-request/{id}/accept", web::put().to(accept_request))
        .route("/users/friend-requests", web::get().to(friend_requests))
        .route("/users/outgoing-friend-requests", web::get().to(outgoing_requests));
}

/// GET /api/v1/users
async fn recommended(
    state: web::Data<AppState>,
    session: SessionUser,
) -> Result<HttpResponse, FriendRequestError> {
    let users = recommended_users(state.users.as_ref(), &session.user_id, state.recommended_limit).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/v1/users/friends
async fn my_friends(
    state: web::Data<AppState>,
    session: SessionUser,
) -> Result<HttpResponse, FriendRequestError> {
    let friends = list_friends(state.users.as_ref(), &session.user_id).await?;
    Ok(HttpResponse::Ok().json(friends))
}

/// POST /api/v1/users/friend-request/{recipientId}
async fn send_request(
    state: web::Data<AppState>,
    session: SessionUser,
    path: web::Path<String>,
) -> Result<HttpResponse, FriendRequestError> {
    let recipient_id = path.into_inner();

    let request = send_friend_request(
        state.users.as_ref(),
        state.requests.as_ref(),
        &session.user_id,
        &recipient_id,
    )
    .await?;

    tracing::info!("Friend request {} sent: {} -> {}", request.id, request.sender, request.recipient);
    state
        .invalidate_matches(&[request.sender.as_str(), request.recipient.as_str()])
        .await;

    Ok(HttpResponse::Created().json(request))
}

/// PUT /api/v1/users/friend-request/{requestId}/accept
async fn accept_request(
    state: web::Data<AppState>,
    session: SessionUser,
    path: web::Path<String>,
) -> Result<HttpResponse, FriendRequestError> {
    let request_id = path.into_inner();

    let request = accept_friend_request(state.requests.as_ref(), &session.user_id, &request_id).await?;

    tracing::info!("Friend request {} accepted: {} <-> {}", request.id, request.sender, request.recipient);
    state
        .invalidate_matches(&[request.sender.as_str(), request.recipient.as_str()])
        .await;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Friend request accepted".to_string(),
    }))
}

/// GET /api/v1/users/friend-requests
async fn friend_requests(
    state: web::Data<AppState>,
    session: SessionUser,
) -> Result<HttpResponse, FriendRequestError> {
    let overview = list_friend_requests(state.users.as_ref(), state.requests.as_ref(), &session.user_id).await?;
    Ok(HttpResponse::Ok().json(overview))
}

/// GET /api/v1/users/outgoing-friend-requests
async fn outgoing_requests(
    state: web::Data<AppState>,
    session: SessionUser,
) -> Result<HttpResponse, FriendRequestError> {
    let outgoing = list_outgoing_requests(state.users.as_ref(), state.requests.as_ref(), &session.user_id).await?;
    Ok(HttpResponse::Ok().json(outgoing))
}
