//! Repositories over the durable blob store

pub mod audit;
pub mod directory;
pub mod session;

pub use audit::AuditLog;
pub use directory::UserDirectory;
pub use session::SessionStore;
