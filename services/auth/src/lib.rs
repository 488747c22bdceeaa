//! Authorization and session service for the Variant analytics
//! dashboards.
//!
//! User records, sessions, and the audit trail live as JSON blobs in
//! object storage, fronted by a short-lived in-process cache. The HTTP
//! layer in [`routes`] is a thin translation of [`admin::UserService`]
//! and [`session::SessionManager`] into endpoints.

pub mod admin;
pub mod authz;
pub mod config;
pub mod dashboards;
pub mod middleware;
pub mod models;
pub mod password;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;
