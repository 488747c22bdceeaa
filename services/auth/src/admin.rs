//! Administrative user management
//!
//! Composes the directory, the pure authorization rules and the audit
//! log. Every rule violation is a value carrying the human-readable
//! reason the UI renders verbatim; nothing here panics. A mutation and
//! its audit entry happen together from a single-process caller's point
//! of view (there is no cross-process transaction).
//!
//! Two mutation surfaces coexist: the audited, permission-checked
//! operations used by the admin panel, and the legacy unaudited
//! `add_user`/`update_user`/`delete_user` trio kept for the older UI
//! surface. They deliberately differ in strictness (see `authz`).

use chrono::Utc;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::info;

use crate::authz;
use crate::models::{
    AppAccess, AuditAction, AuditEntry, DashboardAccess, Directory, Role, UserRecord,
};
use crate::password::hash_password;
use crate::repositories::{AuditLog, UserDirectory};
use crate::validation::{validate_password, validate_username};

/// Rejected administrative action.
///
/// The `Display` strings are the exact messages shown to operators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error("User ID already exists")]
    UserExists,
    #[error("User not found")]
    UserNotFound,
    #[error("Cannot create Super Admin users")]
    CannotCreateSuperAdmin,
    #[error("Super Admin cannot be edited")]
    SuperAdminImmutable,
    #[error("You can only edit Read Only users")]
    EditScope,
    #[error("You can only assign Read Only role")]
    AssignScope,
    #[error("Cannot escalate to Super Admin")]
    EscalateToSuperAdmin,
    #[error("Cannot change role of last Super Admin")]
    LastSuperAdmin,
    #[error("Super Admin cannot be deleted")]
    SuperAdminUndeletable,
    #[error("Cannot delete Super Admin user")]
    SuperAdminUndeletableLegacy,
    #[error("Only Super Admin can delete users")]
    DeleteScope,
    #[error("Cannot delete yourself")]
    SelfDelete,
    #[error("Super Admin status cannot be changed")]
    SuperAdminStatusImmutable,
    #[error("Only Super Admin can change user status")]
    StatusScope,
    #[error("{0}")]
    Validation(String),
}

/// Result of an administrative action: a success message or the reason
/// the action was rejected
pub type AdminResult = Result<String, AdminError>;

/// Field updates for an existing user; `None` leaves the field as is
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub password: Option<String>,
    pub role: Option<Role>,
    pub name: Option<String>,
    pub dashboards: Option<DashboardAccess>,
    pub app_access: Option<AppAccess>,
}

/// A directory entry flattened for the admin panel listing.
///
/// The password hash is deliberately not included.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UserListing {
    pub user_id: String,
    pub name: String,
    pub role: Role,
    pub role_display: &'static str,
    pub dashboards: DashboardAccess,
    pub app_access: AppAccess,
    pub is_active: bool,
    pub created_at: Option<chrono::DateTime<Utc>>,
    pub created_by: String,
    pub updated_at: Option<chrono::DateTime<Utc>>,
    pub updated_by: Option<String>,
    pub last_login: Option<chrono::DateTime<Utc>>,
}

/// Administrative user management service
#[derive(Clone)]
pub struct UserService {
    directory: UserDirectory,
    audit: AuditLog,
}

impl UserService {
    /// Create a new user service
    pub fn new(directory: UserDirectory, audit: AuditLog) -> Self {
        Self { directory, audit }
    }

    /// All users with metadata, for the admin panel listing
    pub async fn users_with_metadata(&self) -> Vec<UserListing> {
        let users = self.directory.load().await;
        users
            .into_iter()
            .map(|(user_id, record)| UserListing {
                user_id,
                name: record.name,
                role: record.role,
                role_display: record.role.display_name(),
                dashboards: record.dashboards,
                app_access: record.app_access,
                is_active: record.is_active,
                created_at: record.created_at,
                created_by: record.created_by,
                updated_at: record.updated_at,
                updated_by: record.updated_by,
                last_login: record.last_login,
            })
            .collect()
    }

    /// Number of active super admin accounts
    pub async fn count_active_super_admins(&self) -> usize {
        count_active_super_admins(&self.directory.load().await)
    }

    /// Dashboard grant of a user, straight from the directory.
    ///
    /// Admins and super admins always read as unrestricted.
    pub async fn dashboard_access_for_user(&self, username: &str) -> Option<DashboardAccess> {
        let users = self.directory.load().await;
        let record = users.get(username)?;
        if record.role.is_admin() {
            return Some(DashboardAccess::All);
        }
        Some(record.dashboards.clone())
    }

    /// App restriction map of a user, straight from the directory
    pub async fn app_access_for_user(&self, username: &str) -> AppAccess {
        let users = self.directory.load().await;
        users
            .get(username)
            .map(|r| r.app_access.clone())
            .unwrap_or_default()
    }

    /// Display names of readonly users who may open the dashboard
    pub async fn readonly_users_for_dashboard(&self, dashboard_id: &str) -> Vec<String> {
        let users = self.directory.load().await;
        users
            .values()
            .filter(|r| r.role == Role::Readonly && r.dashboards.allows(dashboard_id))
            .map(|r| r.name.clone())
            .collect()
    }

    /// Most recent audit entries, newest first
    pub async fn recent_audit(&self, limit: usize) -> Vec<AuditEntry> {
        self.audit.recent(limit).await
    }

    /// Create a user (audited surface).
    ///
    /// The actor's role caps what can be assigned; `super_admin` is not
    /// assignable by anyone.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_user(
        &self,
        actor_user_id: &str,
        actor_role: Role,
        user_id: &str,
        password: &str,
        role: Role,
        name: &str,
        dashboards: DashboardAccess,
        app_access: Option<AppAccess>,
    ) -> AdminResult {
        validate_username(user_id).map_err(AdminError::Validation)?;
        validate_password(password).map_err(AdminError::Validation)?;

        if role == Role::SuperAdmin {
            return Err(AdminError::CannotCreateSuperAdmin);
        }
        if !authz::can_create_role(actor_role, role) {
            return Err(AdminError::AssignScope);
        }

        let mut users = self.directory.load().await;
        if users.contains_key(user_id) {
            return Err(AdminError::UserExists);
        }

        let now = Utc::now();
        let record = UserRecord {
            password: hash_password(password)
                .map_err(|e| AdminError::Validation(e.to_string()))?,
            role,
            name: name.to_string(),
            dashboards: grant_for_role(role, dashboards),
            app_access: restriction_for_role(role, app_access),
            is_active: true,
            created_at: Some(now),
            created_by: actor_user_id.to_string(),
            updated_at: Some(now),
            updated_by: Some(actor_user_id.to_string()),
            last_login: None,
        };
        users.insert(user_id.to_string(), record);

        self.directory.update(users).await;
        self.audit
            .record(
                actor_user_id,
                AuditAction::CreateUser,
                user_id,
                json!({ "role": role }),
            )
            .await;

        info!("User {} created by {}", user_id, actor_user_id);
        Ok("User created successfully".to_string())
    }

    /// Edit a user (audited surface).
    ///
    /// Enforces the role state machine: a super admin record is editable
    /// only by itself, an admin touches only readonly targets, escalation
    /// to super admin is impossible, and demoting the last active super
    /// admin is rejected. Promotion to admin/super admin force-resets the
    /// dashboard grant to "all" and clears app restrictions.
    pub async fn edit_user(
        &self,
        actor_user_id: &str,
        actor_role: Role,
        user_id: &str,
        update: UpdateUser,
    ) -> AdminResult {
        let mut users = self.directory.load().await;
        let Some(current) = users.get(user_id) else {
            return Err(AdminError::UserNotFound);
        };
        let target_role = current.role;

        if target_role == Role::SuperAdmin && actor_user_id != user_id {
            return Err(AdminError::SuperAdminImmutable);
        }
        if actor_role == Role::Admin && target_role != Role::Readonly {
            return Err(AdminError::EditScope);
        }

        if let Some(new_role) = update.role {
            if new_role != target_role {
                if actor_role == Role::Admin && new_role != Role::Readonly {
                    return Err(AdminError::AssignScope);
                }
                if new_role == Role::SuperAdmin {
                    return Err(AdminError::EscalateToSuperAdmin);
                }
                if target_role == Role::SuperAdmin && count_active_super_admins(&users) <= 1 {
                    return Err(AdminError::LastSuperAdmin);
                }
            }
        }

        let mut changes = Map::new();
        let record = users
            .get_mut(user_id)
            .ok_or(AdminError::UserNotFound)?;

        if let Some(password) = update.password.filter(|p| !p.is_empty()) {
            validate_password(&password).map_err(AdminError::Validation)?;
            record.password =
                hash_password(&password).map_err(|e| AdminError::Validation(e.to_string()))?;
            changes.insert("password".into(), json!("changed"));
        }

        if let Some(new_role) = update.role {
            if new_role != target_role {
                record.role = new_role;
                changes.insert(
                    "role".into(),
                    json!({ "from": target_role, "to": new_role }),
                );
                if new_role.is_admin() {
                    record.dashboards = DashboardAccess::All;
                    record.app_access = AppAccess::new();
                }
            }
        }

        if let Some(name) = update.name.filter(|n| !n.is_empty() && *n != record.name) {
            record.name = name.clone();
            changes.insert("name".into(), json!(name));
        }

        if let Some(dashboards) = update.dashboards {
            if record.role == Role::Readonly {
                record.dashboards = dashboards;
                changes.insert("dashboards".into(), json!("updated"));
            }
        }

        if let Some(app_access) = update.app_access {
            if record.role == Role::Readonly {
                record.app_access = app_access;
                changes.insert("app_access".into(), json!("updated"));
            }
        }

        record.updated_at = Some(Utc::now());
        record.updated_by = Some(actor_user_id.to_string());

        let audited = !changes.is_empty();
        self.directory.update(users).await;
        if audited {
            self.audit
                .record(
                    actor_user_id,
                    AuditAction::UpdateUser,
                    user_id,
                    Value::Object(changes),
                )
                .await;
        }

        Ok("User updated successfully".to_string())
    }

    /// Deactivate a user (audited surface, strict deletion policy)
    pub async fn soft_delete_user(
        &self,
        actor_user_id: &str,
        actor_role: Role,
        user_id: &str,
    ) -> AdminResult {
        let mut users = self.directory.load().await;
        let Some(record) = users.get(user_id) else {
            return Err(AdminError::UserNotFound);
        };

        if record.role == Role::SuperAdmin {
            return Err(AdminError::SuperAdminUndeletable);
        }
        if actor_role != Role::SuperAdmin {
            return Err(AdminError::DeleteScope);
        }
        if actor_user_id == user_id {
            return Err(AdminError::SelfDelete);
        }

        let record = users.get_mut(user_id).ok_or(AdminError::UserNotFound)?;
        record.is_active = false;
        record.updated_at = Some(Utc::now());
        record.updated_by = Some(actor_user_id.to_string());

        self.directory.update(users).await;
        self.audit
            .record(actor_user_id, AuditAction::DeleteUser, user_id, Value::Null)
            .await;

        info!("User {} deactivated by {}", user_id, actor_user_id);
        Ok("User deleted successfully".to_string())
    }

    /// Flip a user between active and inactive (audited surface)
    pub async fn toggle_user_status(
        &self,
        actor_user_id: &str,
        actor_role: Role,
        user_id: &str,
    ) -> AdminResult {
        let mut users = self.directory.load().await;
        let Some(record) = users.get(user_id) else {
            return Err(AdminError::UserNotFound);
        };

        if record.role == Role::SuperAdmin {
            return Err(AdminError::SuperAdminStatusImmutable);
        }
        if actor_role != Role::SuperAdmin {
            return Err(AdminError::StatusScope);
        }

        let record = users.get_mut(user_id).ok_or(AdminError::UserNotFound)?;
        let new_status = !record.is_active;
        record.is_active = new_status;
        record.updated_at = Some(Utc::now());
        record.updated_by = Some(actor_user_id.to_string());

        self.directory.update(users).await;
        let action = if new_status {
            AuditAction::EnableUser
        } else {
            AuditAction::DisableUser
        };
        self.audit
            .record(actor_user_id, action, user_id, Value::Null)
            .await;

        let status_text = if new_status { "enabled" } else { "disabled" };
        Ok(format!("User {status_text} successfully"))
    }

    /// Create a user (legacy surface, unaudited)
    pub async fn add_user(
        &self,
        user_id: &str,
        password: &str,
        role: Role,
        name: &str,
        dashboards: DashboardAccess,
        app_access: Option<AppAccess>,
    ) -> AdminResult {
        validate_username(user_id).map_err(AdminError::Validation)?;
        validate_password(password).map_err(AdminError::Validation)?;

        if role == Role::SuperAdmin {
            return Err(AdminError::CannotCreateSuperAdmin);
        }

        let mut users = self.directory.load().await;
        if users.contains_key(user_id) {
            return Err(AdminError::UserExists);
        }

        let record = UserRecord {
            password: hash_password(password)
                .map_err(|e| AdminError::Validation(e.to_string()))?,
            role,
            name: name.to_string(),
            dashboards: grant_for_role(role, dashboards),
            app_access: restriction_for_role(role, app_access),
            is_active: true,
            created_at: Some(Utc::now()),
            created_by: "system".to_string(),
            updated_at: None,
            updated_by: None,
            last_login: None,
        };
        users.insert(user_id.to_string(), record);

        self.directory.update(users).await;
        Ok("User created successfully".to_string())
    }

    /// Update a user (legacy surface, unaudited, no permission checks)
    pub async fn update_user(&self, user_id: &str, update: UpdateUser) -> AdminResult {
        let mut users = self.directory.load().await;
        let Some(record) = users.get_mut(user_id) else {
            return Err(AdminError::UserNotFound);
        };

        if let Some(password) = update.password.filter(|p| !p.is_empty()) {
            record.password =
                hash_password(&password).map_err(|e| AdminError::Validation(e.to_string()))?;
        }
        if let Some(role) = update.role {
            record.role = role;
            if role.is_admin() {
                record.dashboards = DashboardAccess::All;
                record.app_access = AppAccess::new();
            }
        }
        if let Some(name) = update.name.filter(|n| !n.is_empty()) {
            record.name = name;
        }
        if let Some(dashboards) = update.dashboards {
            if record.role == Role::Readonly {
                record.dashboards = dashboards;
            }
        }
        if let Some(app_access) = update.app_access {
            if record.role == Role::Readonly {
                record.app_access = app_access;
            }
        }

        self.directory.update(users).await;
        Ok("User updated successfully".to_string())
    }

    /// Hard-delete a user (legacy surface, unaudited).
    ///
    /// Kept for parity with the older admin UI; the audited surface
    /// soft-deletes instead.
    pub async fn delete_user(&self, user_id: &str) -> AdminResult {
        let mut users = self.directory.load().await;
        let Some(record) = users.get(user_id) else {
            return Err(AdminError::UserNotFound);
        };

        if record.role == Role::SuperAdmin {
            return Err(AdminError::SuperAdminUndeletableLegacy);
        }

        users.remove(user_id);
        self.directory.update(users).await;
        Ok("User deleted successfully".to_string())
    }
}

/// Count active super admins in a directory
pub fn count_active_super_admins(users: &Directory) -> usize {
    users
        .values()
        .filter(|r| r.role == Role::SuperAdmin && r.is_active)
        .count()
}

/// Promoted roles always get the unrestricted grant
fn grant_for_role(role: Role, dashboards: DashboardAccess) -> DashboardAccess {
    if role == Role::Readonly {
        dashboards
    } else {
        DashboardAccess::All
    }
}

/// App restrictions only apply to readonly users
fn restriction_for_role(role: Role, app_access: Option<AppAccess>) -> AppAccess {
    match app_access {
        Some(access) if role == Role::Readonly => access,
        _ => AppAccess::new(),
    }
}
