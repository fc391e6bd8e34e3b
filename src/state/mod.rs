//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! `auth` owns the session container; `navigation` is how it asks the router
//! to move without depending on router context.

pub mod auth;
pub mod navigation;
