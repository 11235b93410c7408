//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the session and voting rules so route handlers can
//! stay focused on request parsing and status mapping.

pub mod auth;
pub mod session;
pub mod wall;
