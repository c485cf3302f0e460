use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration;

use crate::core::filters::order_by_ids;
use crate::models::{CandidateQuery, CandidateSort, FriendRequest, FriendRequestStatus, PublicProfile, UserProfile};
use crate::services::store::{FriendRequestLedger, StoreError, UserDirectory};

/// Friend request status as stored in PostgreSQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "friend_request_status", rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
}

impl From<RequestStatus> for FriendRequestStatus {
    fn from(value: RequestStatus) -> Self {
        match value {
            RequestStatus::Pending => FriendRequestStatus::Pending,
            RequestStatus::Accepted => FriendRequestStatus::Accepted,
        }
    }
}

impl From<FriendRequestStatus> for RequestStatus {
    fn from(value: FriendRequestStatus) -> Self {
        match value {
            FriendRequestStatus::Pending => RequestStatus::Pending,
            FriendRequestStatus::Accepted => RequestStatus::Accepted,
        }
    }
}

const PUBLIC_COLUMNS: &str = "id, full_name, profile_pic, native_language, learning_language, bio";

const REQUEST_COLUMNS: &str = "id, sender_id, recipient_id, status, created_at, updated_at";

/// PostgreSQL-backed user directory and friend-request ledger
///
/// Reads `users`, `user_friends` and `friend_requests`. Password hashes
/// live in `users` but are never selected.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings, optionally applying the bundled migrations
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
        run_migrations: bool,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        let store = Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await?;

        if run_migrations {
            sqlx::migrate!("./migrations").run(&store.pool).await?;
            tracing::info!("Database migrations applied");
        }

        Ok(store)
    }

    async fn fetch_requests(&self, clause: &str, user_id: &str) -> Result<Vec<FriendRequest>, StoreError> {
        let query = format!(
            "SELECT {} FROM friend_requests WHERE {} ORDER BY created_at ASC, id ASC",
            REQUEST_COLUMNS, clause
        );

        let rows = sqlx::query(&query).bind(user_id).fetch_all(&self.pool).await?;

        rows.iter().map(request_from_row).collect()
    }
}

fn public_from_row(row: &PgRow) -> Result<PublicProfile, StoreError> {
    Ok(PublicProfile {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        profile_pic: row.try_get("profile_pic")?,
        native_language: row.try_get("native_language")?,
        learning_language: row.try_get("learning_language")?,
        bio: row.try_get("bio")?,
    })
}

fn profile_from_row(row: &PgRow) -> Result<UserProfile, StoreError> {
    Ok(UserProfile {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        bio: row.try_get("bio")?,
        profile_pic: row.try_get("profile_pic")?,
        native_language: row.try_get("native_language")?,
        learning_language: row.try_get("learning_language")?,
        location: row.try_get("location")?,
        is_onboarded: row.try_get("is_onboarded")?,
        friends: row.try_get("friends")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn request_from_row(row: &PgRow) -> Result<FriendRequest, StoreError> {
    let status: RequestStatus = row.try_get("status")?;

    Ok(FriendRequest {
        id: row.try_get("id")?,
        sender: row.try_get("sender_id")?,
        recipient: row.try_get("recipient_id")?,
        status: status.into(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Append the WHERE, ORDER BY and LIMIT clauses for a candidate query
pub fn push_candidate_clauses(builder: &mut QueryBuilder<'_, Postgres>, query: &CandidateQuery) {
    builder.push(" WHERE TRUE");

    if let Some(onboarded) = query.onboarded {
        builder.push(" AND is_onboarded = ").push_bind(onboarded);
    }
    if let Some(native) = &query.native_language {
        builder.push(" AND native_language = ").push_bind(native.clone());
    }
    if let Some(learning) = &query.learning_language {
        builder.push(" AND learning_language = ").push_bind(learning.clone());
    }
    if !query.exclude_user_ids.is_empty() {
        builder
            .push(" AND id <> ALL(")
            .push_bind(query.exclude_user_ids.clone())
            .push(")");
    }

    // COLLATE "C" keeps id ordering identical to the in-memory store
    match query.sort {
        CandidateSort::IdAscending => {
            builder.push(" ORDER BY id COLLATE \"C\" ASC");
        }
        CandidateSort::RecentlyUpdated => {
            builder.push(" ORDER BY updated_at DESC, id COLLATE \"C\" ASC");
        }
    }

    if let Some(limit) = query.limit {
        builder.push(" LIMIT ").push_bind(limit as i64);
    }
}

#[async_trait]
impl UserDirectory for PostgresStore {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        let query = r#"
            SELECT
                u.id, u.full_name, u.bio, u.profile_pic, u.native_language,
                u.learning_language, u.location, u.is_onboarded, u.updated_at,
                ARRAY(
                    SELECT f.friend_id FROM user_friends f
                    WHERE f.user_id = u.id
                    ORDER BY f.friend_id
                ) AS friends
            FROM users u
            WHERE u.id = $1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn find_candidates(&self, query: &CandidateQuery) -> Result<Vec<PublicProfile>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM users", PUBLIC_COLUMNS));
        push_candidate_clauses(&mut builder, query);

        let rows = builder.build().fetch_all(&self.pool).await?;

        tracing::debug!(
            "Candidate query returned {} rows (excluding {} ids)",
            rows.len(),
            query.exclude_user_ids.len()
        );

        rows.iter().map(public_from_row).collect()
    }

    async fn find_public(&self, ids: &[String]) -> Result<Vec<PublicProfile>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let query = format!("SELECT {} FROM users WHERE id = ANY($1)", PUBLIC_COLUMNS);
        let rows = sqlx::query(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        let profiles = rows.iter().map(public_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(order_by_ids(profiles, ids))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl FriendRequestLedger for PostgresStore {
    async fn find_pending_for(&self, user_id: &str) -> Result<Vec<FriendRequest>, StoreError> {
        self.fetch_requests(
            "(sender_id = $1 OR recipient_id = $1) AND status = 'pending'",
            user_id,
        )
        .await
    }

    async fn find_between(&self, a: &str, b: &str) -> Result<Option<FriendRequest>, StoreError> {
        let query = format!(
            "SELECT {} FROM friend_requests \
             WHERE (sender_id = $1 AND recipient_id = $2) OR (sender_id = $2 AND recipient_id = $1) \
             LIMIT 1",
            REQUEST_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(a)
            .bind(b)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(request_from_row).transpose()
    }

    async fn find_by_id(&self, request_id: &str) -> Result<Option<FriendRequest>, StoreError> {
        let query = format!("SELECT {} FROM friend_requests WHERE id = $1", REQUEST_COLUMNS);

        let row = sqlx::query(&query)
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(request_from_row).transpose()
    }

    async fn create(&self, sender_id: &str, recipient_id: &str) -> Result<FriendRequest, StoreError> {
        let query = format!(
            "INSERT INTO friend_requests (id, sender_id, recipient_id, status) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {}",
            REQUEST_COLUMNS
        );

        let result = sqlx::query(&query)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(sender_id)
            .bind(recipient_id)
            .bind(RequestStatus::Pending)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => {
                let request = request_from_row(&row)?;
                tracing::debug!("Created friend request {}: {} -> {}", request.id, sender_id, recipient_id);
                Ok(request)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(StoreError::Conflict(
                format!("friend request between {} and {} already exists", sender_id, recipient_id),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn accept(&self, request_id: &str) -> Result<Option<FriendRequest>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            "UPDATE friend_requests SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            REQUEST_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(request_id)
            .bind(RequestStatus::Accepted)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let request = request_from_row(&row)?;

        sqlx::query(
            r#"
            INSERT INTO user_friends (user_id, friend_id)
            VALUES ($1, $2), ($2, $1)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&request.sender)
        .bind(&request.recipient)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET updated_at = NOW() WHERE id IN ($1, $2)")
            .bind(&request.sender)
            .bind(&request.recipient)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            "Accepted friend request {}: {} <-> {}",
            request.id,
            request.sender,
            request.recipient
        );

        Ok(Some(request))
    }

    async fn incoming_pending(&self, user_id: &str) -> Result<Vec<FriendRequest>, StoreError> {
        self.fetch_requests("recipient_id = $1 AND status = 'pending'", user_id)
            .await
    }

    async fn outgoing_pending(&self, user_id: &str) -> Result<Vec<FriendRequest>, StoreError> {
        self.fetch_requests("sender_id = $1 AND status = 'pending'", user_id)
            .await
    }

    async fn accepted_sent(&self, user_id: &str) -> Result<Vec<FriendRequest>, StoreError> {
        self.fetch_requests("sender_id = $1 AND status = 'accepted'", user_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion() {
        assert_eq!(FriendRequestStatus::from(RequestStatus::Accepted), FriendRequestStatus::Accepted);
        assert_eq!(RequestStatus::from(FriendRequestStatus::Pending), RequestStatus::Pending);
    }

    #[test]
    fn test_candidate_clauses() {
        let query = CandidateQuery {
            native_language: Some("spanish".to_string()),
            learning_language: Some("english".to_string()),
            onboarded: Some(true),
            exclude_user_ids: vec!["me".to_string()],
            sort: CandidateSort::IdAscending,
            limit: Some(5),
        };

        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM users");
        push_candidate_clauses(&mut builder, &query);

        assert_eq!(
            builder.sql(),
            "SELECT id FROM users WHERE TRUE AND is_onboarded = $1 AND native_language = $2 \
             AND learning_language = $3 AND id <> ALL($4) ORDER BY id COLLATE \"C\" ASC LIMIT $5"
        );
    }

    #[test]
    fn test_community_clauses_sort_by_recency() {
        let query = CandidateQuery {
            onboarded: Some(true),
            sort: CandidateSort::RecentlyUpdated,
            limit: Some(3),
            ..Default::default()
        };

        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM users");
        push_candidate_clauses(&mut builder, &query);

        assert_eq!(
            builder.sql(),
            "SELECT id FROM users WHERE TRUE AND is_onboarded = $1 \
             ORDER BY updated_at DESC, id COLLATE \"C\" ASC LIMIT $2"
        );
    }
}
