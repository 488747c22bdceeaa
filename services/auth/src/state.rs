//! Application state shared across handlers

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use tracing::warn;

use crate::admin::UserService;
use crate::config::AuthConfig;
use crate::rate_limiter::RateLimiter;
use crate::repositories::UserDirectory;
use crate::session::SessionManager;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: AuthConfig,
    pub sessions: SessionManager,
    pub users: UserService,
    pub directory: UserDirectory,
    pub rate_limiter: RateLimiter,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.cookie_key.clone()
    }
}

/// Derive the cookie signing key from the configured secret.
///
/// Short secrets are cycle-extended instead of panicking; the service
/// must come up even with a weak dev secret, and the weakness is logged.
pub fn cookie_key(secret: &str) -> Key {
    let secret = if secret.is_empty() {
        warn!("SECRET_KEY is empty, falling back to the built-in dev secret");
        AuthConfig::default().secret_key
    } else {
        secret.to_string()
    };

    let bytes = secret.as_bytes();
    if bytes.len() >= 64 {
        return Key::derive_from(bytes);
    }

    warn!("SECRET_KEY is shorter than 64 bytes, extending it for cookie signing");
    let extended: Vec<u8> = bytes.iter().copied().cycle().take(64).collect();
    Key::derive_from(&extended)
}
