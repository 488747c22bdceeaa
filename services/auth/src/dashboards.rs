//! Static dashboard registry
//!
//! The registry is compiled in; dashboards are toggled by the `enabled`
//! flag at release time, not at runtime. Access checks treat a disabled
//! dashboard as nonexistent for everyone, including super admins.

use serde::Serialize;

/// Dashboard registry entry
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub enabled: bool,
}

/// All dashboards known to the product, enabled or not
pub const DASHBOARDS: &[Dashboard] = &[
    Dashboard {
        id: "icarus_historical",
        name: "ICARUS - Plan (Historical)",
        icon: "📊",
        enabled: true,
    },
    Dashboard {
        id: "icarus_multi",
        name: "ICARUS - Multi",
        icon: "📈",
        enabled: true,
    },
    Dashboard {
        id: "all_metrics_merged",
        name: "Metrics Merged",
        icon: "📊",
        enabled: true,
    },
    Dashboard {
        id: "daedalus",
        name: "Daedalus",
        icon: "🏛️",
        enabled: true,
    },
    Dashboard {
        id: "vol_val_plan",
        name: "Vol/Val Plan Level",
        icon: "📉",
        enabled: false,
    },
    Dashboard {
        id: "icarus_cohort",
        name: "ICARUS - Cohort",
        icon: "👥",
        enabled: false,
    },
    Dashboard {
        id: "cwc",
        name: "CWC",
        icon: "🔄",
        enabled: false,
    },
    Dashboard {
        id: "vol_val_entity",
        name: "Vol/Val Entity Level",
        icon: "🏢",
        enabled: false,
    },
];

/// Look up a dashboard by id
pub fn find(dashboard_id: &str) -> Option<&'static Dashboard> {
    DASHBOARDS.iter().find(|d| d.id == dashboard_id)
}

/// Whether a dashboard exists and is enabled
pub fn is_enabled(dashboard_id: &str) -> bool {
    find(dashboard_id).is_some_and(|d| d.enabled)
}

/// Display name for a dashboard id; falls back to the id itself
pub fn display_name(dashboard_id: &str) -> &str {
    find(dashboard_id).map_or(dashboard_id, |d| d.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        assert!(is_enabled("icarus_historical"));
        assert!(is_enabled("daedalus"));
        assert!(!is_enabled("cwc"));
        assert!(!is_enabled("nonexistent"));
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(display_name("daedalus"), "Daedalus");
        assert_eq!(display_name("unknown_id"), "unknown_id");
    }
}
