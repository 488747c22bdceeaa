//! Authorization service models

pub mod audit;
pub mod role;
pub mod session;
pub mod user;

// Re-export for convenience
pub use audit::{AuditAction, AuditEntry};
pub use role::Role;
pub use session::SessionRecord;
pub use user::{AppAccess, DashboardAccess, Directory, UserRecord, UserSnapshot};
