//! Configuration for the authorization service

use std::time::Duration;

/// Authorization service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret used to sign the session cookie (must be at least 32 bytes)
    pub secret_key: String,
    /// Session lifetime for a plain login
    pub session_ttl_default: Duration,
    /// Session lifetime when "remember me" was checked
    pub session_ttl_remember: Duration,
    /// Freshness window of the process-local user directory cache
    pub users_cache_ttl: Duration,
    /// Address the HTTP surface binds to
    pub bind_addr: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: "variant-dashboard-secret-key-change-in-production".to_string(),
            session_ttl_default: Duration::from_secs(86_400), // 1 day
            session_ttl_remember: Duration::from_secs(2_592_000), // 30 days
            users_cache_ttl: Duration::from_secs(300),        // 5 minutes
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AuthConfig {
    /// Create a new AuthConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SECRET_KEY`: session cookie signing secret
    /// - `SESSION_TTL_DEFAULT`: plain-login session TTL in seconds (default: 86400)
    /// - `SESSION_TTL_REMEMBER`: "remember me" session TTL in seconds (default: 2592000)
    /// - `USERS_CACHE_TTL`: user directory cache freshness window in seconds (default: 300)
    /// - `BIND_ADDR`: listen address (default: "0.0.0.0:3000")
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let secret_key = std::env::var("SECRET_KEY").unwrap_or(defaults.secret_key);
        let session_ttl_default = env_seconds("SESSION_TTL_DEFAULT", defaults.session_ttl_default);
        let session_ttl_remember =
            env_seconds("SESSION_TTL_REMEMBER", defaults.session_ttl_remember);
        let users_cache_ttl = env_seconds("USERS_CACHE_TTL", defaults.users_cache_ttl);
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);

        AuthConfig {
            secret_key,
            session_ttl_default,
            session_ttl_remember,
            users_cache_ttl,
            bind_addr,
        }
    }
}

fn env_seconds(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_defaults() {
        unsafe {
            std::env::remove_var("SESSION_TTL_DEFAULT");
            std::env::remove_var("SESSION_TTL_REMEMBER");
            std::env::remove_var("USERS_CACHE_TTL");
        }

        let config = AuthConfig::from_env();
        assert_eq!(config.session_ttl_default, Duration::from_secs(86_400));
        assert_eq!(config.session_ttl_remember, Duration::from_secs(2_592_000));
        assert_eq!(config.users_cache_ttl, Duration::from_secs(300));
    }

    #[test]
    #[serial]
    fn test_config_from_env_with_custom_values() {
        unsafe {
            std::env::set_var("SESSION_TTL_DEFAULT", "3600");
            std::env::set_var("SESSION_TTL_REMEMBER", "7200");
            std::env::set_var("USERS_CACHE_TTL", "60");
        }

        let config = AuthConfig::from_env();
        assert_eq!(config.session_ttl_default, Duration::from_secs(3600));
        assert_eq!(config.session_ttl_remember, Duration::from_secs(7200));
        assert_eq!(config.users_cache_ttl, Duration::from_secs(60));

        unsafe {
            std::env::remove_var("SESSION_TTL_DEFAULT");
            std::env::remove_var("SESSION_TTL_REMEMBER");
            std::env::remove_var("USERS_CACHE_TTL");
        }
    }
}
