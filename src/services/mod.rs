// Service exports
pub mod auth;
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod store;

pub use auth::{AuthError, SessionClaims, SessionVerifier};
pub use cache::{CacheError, MatchCache};
pub use memory::InMemoryStore;
pub use postgres::{PostgresStore, RequestStatus};
pub use store::{FriendRequestLedger, StoreError, UserDirectory};
