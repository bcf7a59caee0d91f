//! HTTP route handlers. Every handler resolves the caller's principal from
//! the Authorization header, runs the appropriate guard against the path
//! parameters, and only then calls into a resource manager.

pub mod drugs;
pub mod health_journals;
pub mod medication_history;
pub mod users;
