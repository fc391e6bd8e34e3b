//! Browser-facing helpers below the session layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! `storage` wraps `localStorage` behind an observable store, `listeners` is
//! the pub/sub registry it and the session share, and `auth` holds the pure
//! route-guard decision.

pub mod auth;
pub mod listeners;
pub mod storage;
