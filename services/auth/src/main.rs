use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use auth::admin::UserService;
use auth::config::AuthConfig;
use auth::rate_limiter::{RateLimiter, RateLimiterConfig};
use auth::repositories::{AuditLog, SessionStore, UserDirectory};
use auth::routes;
use auth::session::SessionManager;
use auth::state::{AppState, cookie_key};
use common::storage::{self, StorageConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting authorization service");

    let config = AuthConfig::from_env();
    let storage_config = StorageConfig::from_env();

    // Probe the bucket; an unreachable store degrades to an in-memory
    // one so the dashboards stay up with the seeded defaults.
    let store = storage::connect(&storage_config).await;

    let directory = UserDirectory::new(store.clone(), config.users_cache_ttl);
    let sessions = SessionStore::new(store.clone());
    let audit = AuditLog::new(store);

    let session_manager = SessionManager::new(
        directory.clone(),
        sessions,
        config.session_ttl_default,
        config.session_ttl_remember,
    );
    let user_service = UserService::new(directory.clone(), audit);
    let rate_limiter = RateLimiter::new(RateLimiterConfig::default());
    let key = cookie_key(&config.secret_key);

    // Seed the default directory on first boot so the admin can log in
    directory.load().await;

    let bind_addr = config.bind_addr.clone();
    let app_state = AppState {
        config,
        sessions: session_manager,
        users: user_service,
        directory,
        rate_limiter,
        cookie_key: key,
    };

    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Authorization service listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
