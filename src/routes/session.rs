use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::routes::AppState;

/// The authenticated user making the request
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: String,
}

impl FromRequest for SessionUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<SessionUser, actix_web::Error> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("application state not configured"))?;

    let user_id = state.sessions.authenticate(req)?;

    Ok(SessionUser { user_id })
}
