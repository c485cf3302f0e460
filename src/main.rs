use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tandem_match::config::{CacheSettings, DatabaseSettings, LoggingSettings, Settings, StoreBackend};
use tandem_match::core::MatchRanker;
use tandem_match::routes::{self, errors, AppState};
use tandem_match::services::{
    FriendRequestLedger, InMemoryStore, MatchCache, PostgresStore, SessionVerifier, UserDirectory,
};

/// Initialize logging; LOG_LEVEL and LOG_FORMAT override the config file
fn init_tracing(logging: &LoggingSettings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

async fn build_stores(
    database: &DatabaseSettings,
) -> std::io::Result<(Arc<dyn UserDirectory>, Arc<dyn FriendRequestLedger>)> {
    match database.backend {
        StoreBackend::Postgres => {
            let store = PostgresStore::from_settings(
                &database.url,
                database.max_connections,
                database.min_connections,
                database.acquire_timeout_secs,
                database.idle_timeout_secs,
                database.run_migrations,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::other(e)
            })?;

            info!(
                "PostgreSQL store initialized (max: {} connections)",
                database.max_connections.unwrap_or(10)
            );

            let store = Arc::new(store);
            let users: Arc<dyn UserDirectory> = store.clone();
            let requests: Arc<dyn FriendRequestLedger> = store;
            Ok((users, requests))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data will not survive a restart");
            let store = Arc::new(InMemoryStore::new());
            let users: Arc<dyn UserDirectory> = store.clone();
            let requests: Arc<dyn FriendRequestLedger> = store;
            Ok((users, requests))
        }
    }
}

/// The service runs without a cache if it is disabled or Redis is unreachable
async fn build_cache(cache: &CacheSettings) -> Option<Arc<MatchCache>> {
    if !cache.enabled {
        info!("Match cache disabled");
        return None;
    }

    let ttl = cache.ttl_secs.unwrap_or(120);
    let l1_size = cache.l1_cache_size.unwrap_or(10_000);

    match MatchCache::connect(&cache.redis_url, l1_size, ttl).await {
        Ok(c) => {
            info!("Match cache initialized (L1: {} entries, TTL: {}s)", l1_size, ttl);
            Some(Arc::new(c))
        }
        Err(e) => {
            warn!("Failed to connect to Redis ({}), running without cache", e);
            None
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::other(e));
        }
    };

    init_tracing(&settings.logging);

    info!("Starting Tandem Match service...");

    let (users, requests) = build_stores(&settings.database).await?;
    let cache = build_cache(&settings.cache).await;

    let sessions = Arc::new(SessionVerifier::new(
        &settings.auth.jwt_secret,
        settings.auth.cookie_name.clone(),
    ));

    let limits = settings.ranking.tier_limits();
    let ranker = MatchRanker::new(limits);

    info!("Match ranker initialized with limits: {:?}", limits);

    let app_state = AppState {
        users,
        requests,
        cache,
        sessions,
        ranker,
        recommended_limit: settings.ranking.recommended_limit,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(errors::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(errors::handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(errors::handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
