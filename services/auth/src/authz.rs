//! Authorization rules
//!
//! Pure functions over roles, ownership and snapshots; no I/O. The
//! mutation layer in `admin` composes these with the directory and the
//! audit log.
//!
//! Note there are two deletion predicates. [`can_delete_user`] is the
//! hierarchy rule used by the legacy admin surface (super admin deletes
//! admin/readonly, admin deletes readonly). [`can_delete_user_strict`]
//! is the audited surface's rule: only a super admin may delete, never
//! themselves. The two coexist on purpose; callers depend on the
//! specific one they were written against.

use crate::dashboards::{self, Dashboard};
use crate::models::{Role, UserSnapshot};

/// Whether `actor` may edit/manage a user holding `target` role.
///
/// Super admin manages anyone; admin manages only readonly; readonly
/// manages no one.
pub fn can_manage_user(actor: Role, target: Role) -> bool {
    match actor {
        Role::SuperAdmin => true,
        Role::Admin => target == Role::Readonly,
        Role::Readonly => false,
    }
}

/// Whether `actor` may delete a user holding `target` role (legacy
/// surface).
///
/// A super admin account is never deletable through this path; otherwise
/// the manage hierarchy applies.
pub fn can_delete_user(actor: Role, target: Role) -> bool {
    if target == Role::SuperAdmin {
        return false;
    }
    can_manage_user(actor, target)
}

/// Whether `actor` may delete the given user (audited surface).
///
/// Stricter than [`can_delete_user`]: only a super admin may delete, a
/// super admin target is untouchable, and self-deletion is forbidden.
pub fn can_delete_user_strict(
    actor: Role,
    actor_id: &str,
    target_id: &str,
    target: Role,
) -> bool {
    actor == Role::SuperAdmin
        && target != Role::SuperAdmin
        && actor_id != target_id
}

/// Roles `actor` may assign when creating or editing users.
///
/// `super_admin` is never assignable; the single super admin is fixed at
/// directory-seed time.
pub fn assignable_roles(actor: Role) -> &'static [Role] {
    match actor {
        Role::SuperAdmin => &[Role::Admin, Role::Readonly],
        Role::Admin => &[Role::Readonly],
        Role::Readonly => &[],
    }
}

/// Whether `actor` may create a user with `new_role`
pub fn can_create_role(actor: Role, new_role: Role) -> bool {
    assignable_roles(actor).contains(&new_role)
}

/// Whether `actor` may edit the given target user.
///
/// A super admin record is editable only by itself; an admin edits only
/// readonly users.
pub fn can_edit_user(actor: Role, actor_id: &str, target: Role, target_id: &str) -> bool {
    match actor {
        Role::SuperAdmin => target != Role::SuperAdmin || actor_id == target_id,
        Role::Admin => target == Role::Readonly,
        Role::Readonly => false,
    }
}

/// Whether `role` may open the admin panel
pub fn can_view_admin_panel(role: Role) -> bool {
    role.is_admin()
}

/// Apps the user may see on a dashboard.
///
/// `None` means unrestricted (render everything): always for
/// admin/super admin, and for readonly users whose `app_access` map is
/// empty or does not opt the dashboard in. `Some(list)` is the explicit
/// allow-list; `Some(vec![])` means zero apps visible.
pub fn allowed_apps(user: &UserSnapshot, dashboard_id: &str) -> Option<Vec<String>> {
    if user.role.is_admin() {
        return None;
    }
    if user.app_access.is_empty() {
        return None;
    }
    user.app_access.get(dashboard_id).cloned()
}

/// Whether the user may open the dashboard.
///
/// Requires the dashboard enabled in the registry; admin/super admin and
/// "all"-access users then always pass, readonly users need the id in
/// their grant list.
pub fn can_access_dashboard(user: &UserSnapshot, dashboard_id: &str) -> bool {
    if !dashboards::is_enabled(dashboard_id) {
        return false;
    }
    if user.role.is_admin() {
        return true;
    }
    user.dashboards.allows(dashboard_id)
}

/// Registry entries the user may see in navigation
pub fn accessible_dashboards(user: &UserSnapshot) -> Vec<&'static Dashboard> {
    dashboards::DASHBOARDS
        .iter()
        .filter(|d| d.enabled)
        .filter(|d| user.role.is_admin() || user.dashboards.allows(d.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppAccess, DashboardAccess};

    fn snapshot(role: Role, dashboards: DashboardAccess, app_access: AppAccess) -> UserSnapshot {
        UserSnapshot {
            username: "u".into(),
            role,
            name: "U".into(),
            dashboards,
            app_access,
        }
    }

    #[test]
    fn test_manage_hierarchy() {
        assert!(can_manage_user(Role::SuperAdmin, Role::SuperAdmin));
        assert!(can_manage_user(Role::SuperAdmin, Role::Admin));
        assert!(can_manage_user(Role::Admin, Role::Readonly));
        assert!(!can_manage_user(Role::Admin, Role::Admin));
        assert!(!can_manage_user(Role::Readonly, Role::Readonly));
    }

    #[test]
    fn test_delete_variants_diverge() {
        // Legacy surface: admin may delete readonly
        assert!(can_delete_user(Role::Admin, Role::Readonly));
        assert!(can_delete_user(Role::SuperAdmin, Role::Admin));
        assert!(!can_delete_user(Role::SuperAdmin, Role::SuperAdmin));

        // Strict surface: super admin only, never self
        assert!(!can_delete_user_strict(Role::Admin, "a", "b", Role::Readonly));
        assert!(can_delete_user_strict(Role::SuperAdmin, "a", "b", Role::Readonly));
        assert!(!can_delete_user_strict(Role::SuperAdmin, "a", "a", Role::Readonly));
        assert!(!can_delete_user_strict(Role::SuperAdmin, "a", "b", Role::SuperAdmin));
    }

    #[test]
    fn test_assignable_roles_ceiling() {
        assert_eq!(
            assignable_roles(Role::SuperAdmin),
            &[Role::Admin, Role::Readonly]
        );
        assert_eq!(assignable_roles(Role::Admin), &[Role::Readonly]);
        assert!(assignable_roles(Role::Readonly).is_empty());

        // super_admin is never assignable, by anyone
        assert!(!can_create_role(Role::SuperAdmin, Role::SuperAdmin));
        assert!(!can_create_role(Role::Admin, Role::Admin));
    }

    #[test]
    fn test_edit_rules() {
        assert!(can_edit_user(Role::SuperAdmin, "root", Role::Admin, "ops"));
        assert!(can_edit_user(Role::SuperAdmin, "root", Role::SuperAdmin, "root"));
        assert!(!can_edit_user(Role::SuperAdmin, "root", Role::SuperAdmin, "other"));
        assert!(can_edit_user(Role::Admin, "ops", Role::Readonly, "viewer"));
        assert!(!can_edit_user(Role::Admin, "ops", Role::Admin, "ops2"));
    }

    #[test]
    fn test_allowed_apps_default_allow() {
        // Empty app_access map: unrestricted
        let user = snapshot(Role::Readonly, DashboardAccess::All, AppAccess::new());
        assert_eq!(allowed_apps(&user, "daedalus"), None);

        // Dashboard not opted in: unrestricted for that dashboard
        let mut access = AppAccess::new();
        access.insert("icarus_multi".into(), vec!["JF".into(), "AT".into()]);
        let user = snapshot(Role::Readonly, DashboardAccess::All, access.clone());
        assert_eq!(allowed_apps(&user, "daedalus"), None);
        assert_eq!(
            allowed_apps(&user, "icarus_multi"),
            Some(vec!["JF".to_string(), "AT".to_string()])
        );

        // Explicit empty list: zero apps visible
        access.insert("daedalus".into(), vec![]);
        let user = snapshot(Role::Readonly, DashboardAccess::All, access);
        assert_eq!(allowed_apps(&user, "daedalus"), Some(vec![]));

        // Admins are never restricted
        let mut admin_access = AppAccess::new();
        admin_access.insert("daedalus".into(), vec![]);
        let admin = snapshot(Role::Admin, DashboardAccess::All, admin_access);
        assert_eq!(allowed_apps(&admin, "daedalus"), None);
    }

    #[test]
    fn test_dashboard_access() {
        let viewer = snapshot(
            Role::Readonly,
            DashboardAccess::Selected(vec!["icarus_historical".into()]),
            AppAccess::new(),
        );
        assert!(can_access_dashboard(&viewer, "icarus_historical"));
        assert!(!can_access_dashboard(&viewer, "daedalus"));
        // Disabled dashboards are invisible to everyone
        assert!(!can_access_dashboard(&viewer, "cwc"));

        let admin = snapshot(Role::Admin, DashboardAccess::All, AppAccess::new());
        assert!(can_access_dashboard(&admin, "daedalus"));
        assert!(!can_access_dashboard(&admin, "cwc"));
    }

    #[test]
    fn test_accessible_dashboards() {
        let admin = snapshot(Role::Admin, DashboardAccess::All, AppAccess::new());
        let ids: Vec<_> = accessible_dashboards(&admin).iter().map(|d| d.id).collect();
        assert_eq!(
            ids,
            vec!["icarus_historical", "icarus_multi", "all_metrics_merged", "daedalus"]
        );

        let viewer = snapshot(
            Role::Readonly,
            DashboardAccess::Selected(vec!["daedalus".into()]),
            AppAccess::new(),
        );
        let ids: Vec<_> = accessible_dashboards(&viewer).iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["daedalus"]);
    }
}
