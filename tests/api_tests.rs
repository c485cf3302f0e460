// HTTP tests for Tandem Match, run against the in-memory store

use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;
use tandem_match::core::MatchRanker;
use tandem_match::models::{FriendRequest, FriendRequestsResponse, MatchResult, PublicProfile, UserProfile};
use tandem_match::routes::{self, errors, AppState};
use tandem_match::services::{
    FriendRequestLedger, InMemoryStore, SessionClaims, SessionVerifier, StoreError,
};

const SECRET: &str = "api-test-secret";

fn create_test_profile(id: &str, native: &str, learning: &str) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        full_name: format!("User {}", id),
        bio: String::new(),
        profile_pic: String::new(),
        native_language: native.to_string(),
        learning_language: learning.to_string(),
        location: String::new(),
        is_onboarded: true,
        friends: vec![],
        updated_at: Utc::now(),
    }
}

fn bearer(user_id: &str) -> (&'static str, String) {
    let claims = SessionClaims {
        user_id: user_id.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))
        .expect("token should encode");
    ("Authorization", format!("Bearer {}", token))
}

/// Ledger whose backend is down
struct UnavailableLedger;

fn unavailable<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("ledger offline".to_string()))
}

#[async_trait]
impl FriendRequestLedger for UnavailableLedger {
    async fn find_pending_for(&self, _user_id: &str) -> Result<Vec<FriendRequest>, StoreError> {
        unavailable()
    }

    async fn find_between(&self, _a: &str, _b: &str) -> Result<Option<FriendRequest>, StoreError> {
        unavailable()
    }

    async fn find_by_id(&self, _request_id: &str) -> Result<Option<FriendRequest>, StoreError> {
        unavailable()
    }

    async fn create(&self, _sender_id: &str, _recipient_id: &str) -> Result<FriendRequest, StoreError> {
        unavailable()
    }

    async fn accept(&self, _request_id: &str) -> Result<Option<FriendRequest>, StoreError> {
        unavailable()
    }

    async fn incoming_pending(&self, _user_id: &str) -> Result<Vec<FriendRequest>, StoreError> {
        unavailable()
    }

    async fn outgoing_pending(&self, _user_id: &str) -> Result<Vec<FriendRequest>, StoreError> {
        unavailable()
    }

    async fn accepted_sent(&self, _user_id: &str) -> Result<Vec<FriendRequest>, StoreError> {
        unavailable()
    }
}

fn app_state(store: Arc<InMemoryStore>) -> AppState {
    AppState {
        users: store.clone(),
        requests: store,
        cache: None,
        sessions: Arc::new(SessionVerifier::new(SECRET, "jwt")),
        ranker: MatchRanker::default(),
        recommended_limit: 50,
    }
}

fn seeded_store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::with_users([
        create_test_profile("me", "english", "spanish"),
        create_test_profile("ana", "spanish", "english"),
        create_test_profile("bea", "spanish", "french"),
        create_test_profile("kai", "german", "english"),
    ]))
}

macro_rules! init_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(app_state($store)))
                .app_data(web::JsonConfig::default().error_handler(errors::handle_json_payload_error))
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_matches_require_session() {
    let app = init_app!(seeded_store());

    let req = test::TestRequest::get().uri("/api/v1/users/matches").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_matches_for_session_user() {
    let app = init_app!(seeded_store());

    let req = test::TestRequest::get()
        .uri("/api/v1/users/matches")
        .insert_header(bearer("me"))
        .to_request();
    let result: MatchResult = test::call_and_read_body_json(&app, req).await;

    assert_eq!(result.tier1.len(), 1);
    assert_eq!(result.tier1[0].id, "ana");
    assert_eq!(result.tier2[0].id, "bea");
    assert_eq!(result.tier3[0].id, "kai");
}

#[actix_web::test]
async fn test_matches_json_shape() {
    let app = init_app!(seeded_store());

    let req = test::TestRequest::get()
        .uri("/api/v1/users/matches")
        .insert_header(bearer("me"))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let entry = body["tier1"][0].as_object().expect("tier1 entry");
    for field in ["_id", "fullName", "profilePic", "nativeLanguage", "learningLanguage", "bio"] {
        assert!(entry.contains_key(field), "missing {}", field);
    }
    assert!(!entry.contains_key("friends"));
    assert!(!entry.contains_key("passwordHash"));
}

#[actix_web::test]
async fn test_incomplete_preferences_is_bad_request() {
    let store = seeded_store();
    store
        .insert_user(create_test_profile("newbie", "english", ""))
        .unwrap();
    let app = init_app!(store);

    let req = test::TestRequest::get()
        .uri("/api/v1/users/matches")
        .insert_header(bearer("newbie"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_unknown_user_is_not_found() {
    let app = init_app!(seeded_store());

    let req = test::TestRequest::get()
        .uri("/api/v1/users/matches")
        .insert_header(bearer("ghost"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_suggested_requires_session() {
    let app = init_app!(seeded_store());

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/suggested")
        .set_json(serde_json::json!({ "userId": "me" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_suggested_rejects_other_users() {
    let app = init_app!(seeded_store());

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/suggested")
        .insert_header(bearer("ana"))
        .set_json(serde_json::json!({ "userId": "me" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_suggested_for_session_user() {
    let app = init_app!(seeded_store());

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/suggested")
        .insert_header(bearer("me"))
        .set_json(serde_json::json!({ "userId": "me" }))
        .to_request();
    let result: MatchResult = test::call_and_read_body_json(&app, req).await;

    assert_eq!(result.tier1[0].id, "ana");
}

#[actix_web::test]
async fn test_suggested_validates_body() {
    let app = init_app!(seeded_store());

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/suggested")
        .insert_header(bearer("me"))
        .set_json(serde_json::json!({ "userId": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/suggested")
        .insert_header(bearer("me"))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_store_failure_is_internal_error() {
    let store = seeded_store();
    let mut state = app_state(store);
    state.requests = Arc::new(UnavailableLedger);

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users/matches")
        .insert_header(bearer("me"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "internal_error");
    assert_eq!(body["status_code"], 500);
    assert!(body.get("tier1").is_none());
}

#[actix_web::test]
async fn test_friend_request_flow_updates_matches() {
    let app = init_app!(seeded_store());

    // me -> ana
    let req = test::TestRequest::post()
        .uri("/api/v1/users/friend-request/ana")
        .insert_header(bearer("me"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let request: FriendRequest = test::read_body_json(resp).await;

    // Pending: ana is no longer suggested to me
    let req = test::TestRequest::get()
        .uri("/api/v1/users/matches")
        .insert_header(bearer("me"))
        .to_request();
    let result: MatchResult = test::call_and_read_body_json(&app, req).await;
    assert!(result.ids().all(|id| id != "ana"));

    // Duplicate in the other direction is rejected
    let req = test::TestRequest::post()
        .uri("/api/v1/users/friend-request/me")
        .insert_header(bearer("ana"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Only the recipient may accept
    let accept_uri = format!("/api/v1/users/friend-request/{}/accept", request.id);
    let req = test::TestRequest::put()
        .uri(&accept_uri)
        .insert_header(bearer("me"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/v1/users/friend-requests")
        .insert_header(bearer("ana"))
        .to_request();
    let overview: FriendRequestsResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(overview.incoming.len(), 1);
    assert_eq!(overview.incoming[0].sender.id, "me");

    let req = test::TestRequest::put()
        .uri(&accept_uri)
        .insert_header(bearer("ana"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/v1/users/friends")
        .insert_header(bearer("me"))
        .to_request();
    let friends: Vec<PublicProfile> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0].id, "ana");

    // Friends stay excluded after acceptance
    let req = test::TestRequest::get()
        .uri("/api/v1/users/matches")
        .insert_header(bearer("me"))
        .to_request();
    let result: MatchResult = test::call_and_read_body_json(&app, req).await;
    assert!(result.ids().all(|id| id != "ana"));
}

#[actix_web::test]
async fn test_outgoing_requests_and_recommended() {
    let app = init_app!(seeded_store());

    let req = test::TestRequest::post()
        .uri("/api/v1/users/friend-request/kai")
        .insert_header(bearer("me"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/api/v1/users/outgoing-friend-requests")
        .insert_header(bearer("me"))
        .to_request();
    let outgoing: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(outgoing[0]["recipient"]["_id"], "kai");

    let req = test::TestRequest::get()
        .uri("/api/v1/users")
        .insert_header(bearer("me"))
        .to_request();
    let recommended: Vec<PublicProfile> = test::call_and_read_body_json(&app, req).await;
    let ids: Vec<&str> = recommended.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["ana", "bea", "kai"]);
}

#[actix_web::test]
async fn test_self_request_rejected() {
    let app = init_app!(seeded_store());

    let req = test::TestRequest::post()
        .uri("/api/v1/users/friend-request/me")
        .insert_header(bearer("me"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_health() {
    let app = init_app!(seeded_store());

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
}
