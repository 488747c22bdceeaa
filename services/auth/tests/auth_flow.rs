//! End-to-end exercise of the authorization service against an
//! in-memory blob store: seeded defaults, login, dashboard gating,
//! administrative user management and the audit trail.

use std::sync::Arc;
use std::time::Duration;

use auth::admin::{AdminError, UserService};
use auth::authz;
use auth::models::{AuditAction, DashboardAccess, Role};
use auth::repositories::{AuditLog, SessionStore, UserDirectory};
use auth::session::{InvalidCredentials, SessionManager};
use common::{BlobStore, MemoryBlobStore};

struct Harness {
    sessions: SessionManager,
    users: UserService,
    directory: UserDirectory,
    blobs: MemoryBlobStore,
}

fn harness() -> Harness {
    let blobs = MemoryBlobStore::new();
    let store: Arc<dyn BlobStore> = Arc::new(blobs.clone());
    let directory = UserDirectory::new(store.clone(), Duration::from_secs(300));
    let sessions = SessionManager::new(
        directory.clone(),
        SessionStore::new(store.clone()),
        Duration::from_secs(86_400),
        Duration::from_secs(2_592_000),
    );
    let users = UserService::new(directory.clone(), AuditLog::new(store));
    Harness {
        sessions,
        users,
        directory,
        blobs,
    }
}

#[tokio::test]
async fn seeded_viewer_can_login_and_sees_only_granted_dashboards() {
    let h = harness();

    let (session_id, _) = h
        .sessions
        .authenticate("viewer", "viewer123", false)
        .await
        .unwrap();

    let user = h.sessions.current_user(&session_id).await.unwrap();
    assert_eq!(user.role, Role::Readonly);
    assert_eq!(user.name, "Viewer User");

    assert!(authz::can_access_dashboard(&user, "icarus_historical"));
    assert!(!authz::can_access_dashboard(&user, "daedalus"));

    let visible: Vec<&str> = authz::accessible_dashboards(&user)
        .iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(visible, vec!["icarus_historical"]);

    // First boot persisted the seeded directory durably
    assert!(h.blobs.contains("cache/users.json").await);
}

#[tokio::test]
async fn admin_lifecycle_create_edit_deactivate() {
    let h = harness();

    let (root_session, _) = h
        .sessions
        .authenticate("admin", "admin123", false)
        .await
        .unwrap();
    let root = h.sessions.current_user(&root_session).await.unwrap();
    assert!(authz::can_view_admin_panel(root.role));
    assert_eq!(root.role, Role::SuperAdmin);

    // The seeded super admin may mint admin accounts
    h.users
        .create_user(
            &root.username,
            root.role,
            "ops",
            "S3cret-pass",
            Role::Admin,
            "Ops",
            DashboardAccess::All,
            None,
        )
        .await
        .unwrap();

    let (ops_session, _) = h
        .sessions
        .authenticate("ops", "S3cret-pass", false)
        .await
        .unwrap();
    let ops = h.sessions.current_user(&ops_session).await.unwrap();
    assert_eq!(ops.role, Role::Admin);

    // An admin may only mint readonly users
    h.users
        .create_user(
            &ops.username,
            ops.role,
            "analyst",
            "S3cret-pass",
            Role::Readonly,
            "Analyst",
            DashboardAccess::Selected(vec!["daedalus".into()]),
            None,
        )
        .await
        .unwrap();
    assert_eq!(
        h.users
            .create_user(
                &ops.username,
                ops.role,
                "analyst2",
                "S3cret-pass",
                Role::Admin,
                "Second",
                DashboardAccess::All,
                None,
            )
            .await,
        Err(AdminError::AssignScope)
    );

    // The new user can log in and is scoped to their grant
    let (session_id, _) = h
        .sessions
        .authenticate("analyst", "S3cret-pass", false)
        .await
        .unwrap();
    let analyst = h.sessions.current_user(&session_id).await.unwrap();
    assert!(authz::can_access_dashboard(&analyst, "daedalus"));
    assert!(!authz::can_access_dashboard(&analyst, "icarus_historical"));

    // Deactivation blocks future logins; the record survives. Only the
    // super admin may delete.
    assert_eq!(
        h.users
            .soft_delete_user(&ops.username, ops.role, "analyst")
            .await,
        Err(AdminError::DeleteScope)
    );
    h.users
        .soft_delete_user(&root.username, root.role, "analyst")
        .await
        .unwrap();
    assert_eq!(
        h.sessions.authenticate("analyst", "S3cret-pass", false).await,
        Err(InvalidCredentials)
    );
    let users = h.directory.load().await;
    assert!(users.contains_key("analyst"));
    assert!(!users["analyst"].is_active);

    // Every successful mutation was audited, newest first; the rejected
    // ones left no trace
    let audit = h.users.recent_audit(10).await;
    assert_eq!(audit.len(), 3);
    assert_eq!(audit[0].action, AuditAction::DeleteUser);
    assert_eq!(audit[0].actor_user_id, "admin");
    assert_eq!(audit[1].action, AuditAction::CreateUser);
    assert_eq!(audit[1].actor_user_id, "ops");
    assert_eq!(audit[2].action, AuditAction::CreateUser);
    assert_eq!(audit[2].target_user_id, "ops");
}

#[tokio::test]
async fn cache_invalidation_picks_up_external_edits() {
    let h = harness();

    // Warm the cache, then rewrite the durable copy behind its back
    let mut users = h.directory.load().await;
    users.get_mut("viewer").unwrap().name = "External Edit".to_string();
    let body = serde_json::to_vec(&users).unwrap();
    h.blobs.put("cache/users.json", body).await.unwrap();

    // Invalidate, and the next read reflects the external write
    h.directory.invalidate().await;
    let users = h.directory.load().await;
    assert_eq!(users["viewer"].name, "External Edit");
}
