//! Session lifecycle management
//!
//! Issues, validates and revokes sessions. A session embeds a snapshot
//! of the user taken at login; directory edits made afterwards do not
//! invalidate or refresh existing sessions (accepted staleness window).
//! Expiry is lazy: there is no background sweep, an expired record is
//! purged the first time it is read.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{SessionRecord, UserSnapshot};
use crate::repositories::{SessionStore, UserDirectory};
use crate::password::verify_password;

/// Authentication failure, deliberately carrying no detail.
///
/// Unknown user, wrong password and deactivated account all collapse
/// into the same value so the login form cannot be used to enumerate
/// accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCredentials;

impl std::fmt::Display for InvalidCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Invalid username or password")
    }
}

impl std::error::Error for InvalidCredentials {}

/// Session manager for issuing and validating sessions
#[derive(Clone)]
pub struct SessionManager {
    directory: UserDirectory,
    sessions: SessionStore,
    ttl_default: Duration,
    ttl_remember: Duration,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(
        directory: UserDirectory,
        sessions: SessionStore,
        ttl_default: Duration,
        ttl_remember: Duration,
    ) -> Self {
        Self {
            directory,
            sessions,
            ttl_default,
            ttl_remember,
        }
    }

    /// Authenticate a user and issue a session.
    ///
    /// On success returns the new session id and its expiry instant. The
    /// session TTL is `ttl_remember` when `remember_me` is set, else
    /// `ttl_default`.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<(String, DateTime<Utc>), InvalidCredentials> {
        let directory = self.directory.load().await;

        let Some(record) = directory.get(username) else {
            return Err(InvalidCredentials);
        };
        if !record.is_active || !verify_password(password, &record.password) {
            return Err(InvalidCredentials);
        }

        let snapshot = UserSnapshot::from_record(username, record);
        let ttl = if remember_me {
            self.ttl_remember
        } else {
            self.ttl_default
        };

        let now = Utc::now();
        let expires_at = now
            + ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::seconds(86_400));
        let session = SessionRecord {
            session_id: Uuid::new_v4().to_string(),
            user: snapshot,
            authenticated: true,
            created_at: now,
            expires_at,
            remember_me,
        };

        if !self.sessions.save(&session).await {
            warn!("Session for {} could not be persisted durably", username);
        }
        self.directory.touch_last_login(username).await;

        info!("User {} logged in (remember_me={})", username, remember_me);
        Ok((session.session_id, expires_at))
    }

    /// Load a valid session.
    ///
    /// An expired record is deleted as a side effect and reads as
    /// `None`; callers cannot distinguish expiry from absence.
    pub async fn get_session(&self, session_id: &str) -> Option<SessionRecord> {
        let record = self.sessions.load(session_id).await?;
        if record.is_expired(Utc::now()) {
            self.sessions.delete(session_id).await;
            return None;
        }
        Some(record)
    }

    /// Whether the session exists, is unexpired and authenticated
    pub async fn is_authenticated(&self, session_id: &str) -> bool {
        self.get_session(session_id)
            .await
            .is_some_and(|s| s.authenticated)
    }

    /// The user snapshot of a valid session
    pub async fn current_user(&self, session_id: &str) -> Option<UserSnapshot> {
        self.get_session(session_id).await.map(|s| s.user)
    }

    /// Delete the session. Idempotent; logging out an absent id is a
    /// no-op.
    pub async fn logout(&self, session_id: &str) {
        self.sessions.delete(session_id).await;
        info!("Session {} logged out", session_id);
    }
}
