use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse, ResponseError};

use crate::core::{FriendRequestError, RankError};
use crate::models::ErrorResponse;
use crate::services::AuthError;

/// Build the JSON error body used by every endpoint
pub fn json_error(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

fn internal_error_response(context: &str, err: &dyn std::fmt::Display) -> HttpResponse {
    tracing::error!("{}: {}", context, err);
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "Internal Server Error",
    )
}

impl ResponseError for RankError {
    fn status_code(&self) -> StatusCode {
        match self {
            RankError::IncompletePreferences => StatusCode::BAD_REQUEST,
            RankError::NotFound(_) => StatusCode::NOT_FOUND,
            RankError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            RankError::IncompletePreferences => {
                json_error(self.status_code(), "incomplete_preferences", self.to_string())
            }
            RankError::NotFound(_) => json_error(self.status_code(), "not_found", self.to_string()),
            RankError::Internal(e) => internal_error_response("Failed to rank matches", e),
        }
    }
}

impl ResponseError for FriendRequestError {
    fn status_code(&self) -> StatusCode {
        match self {
            FriendRequestError::SelfRequest
            | FriendRequestError::AlreadyFriends
            | FriendRequestError::AlreadyExists => StatusCode::BAD_REQUEST,
            FriendRequestError::NotRecipient => StatusCode::FORBIDDEN,
            FriendRequestError::RecipientNotFound
            | FriendRequestError::RequestNotFound
            | FriendRequestError::UserNotFound(_) => StatusCode::NOT_FOUND,
            FriendRequestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = match self {
            FriendRequestError::SelfRequest => "self_request",
            FriendRequestError::AlreadyFriends => "already_friends",
            FriendRequestError::AlreadyExists => "request_exists",
            FriendRequestError::NotRecipient => "forbidden",
            FriendRequestError::RecipientNotFound
            | FriendRequestError::RequestNotFound
            | FriendRequestError::UserNotFound(_) => "not_found",
            FriendRequestError::Internal(e) => {
                return internal_error_response("Friend request operation failed", e)
            }
        };

        json_error(self.status_code(), code, self.to_string())
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        tracing::debug!("Rejected session: {}", self);
        let message = match self {
            AuthError::MissingToken => "Unauthorized - No token provided",
            AuthError::InvalidToken(_) => "Unauthorized - Invalid token",
        };
        json_error(self.status_code(), "unauthorized", message)
    }
}

fn payload_error(status: StatusCode, code: &str, message: String, err: impl ResponseError + 'static) -> actix_web::Error {
    let response = json_error(status, code, message);
    error::InternalError::from_response(err, response).into()
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let message = format!("Invalid JSON: {}", err);
    payload_error(StatusCode::BAD_REQUEST, "invalid_json", message, err)
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid query: {}", err);
    payload_error(StatusCode::BAD_REQUEST, "invalid_query", message, err)
}

/// Handle path extraction errors
pub fn handle_path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid path: {}", err);
    payload_error(StatusCode::BAD_REQUEST, "invalid_path", message, err)
}
