//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration and delegates session work to
//! `state::auth` and `net::api`.

pub mod dashboard;
pub mod login;
pub mod not_found;
