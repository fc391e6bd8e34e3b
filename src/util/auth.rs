//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Guarded routes should apply identical loading/redirect behavior, so the
//! decision is a pure function of `AuthState`.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::config::LOGIN_PATH;
use crate::state::auth::AuthState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not initialized yet; make no auth decision.
    Loading,
    Render,
    /// Replace history with this path.
    Redirect(&'static str),
}

pub fn guard_decision(state: &AuthState) -> GuardDecision {
    if !state.ready {
        GuardDecision::Loading
    } else if state.token.is_some() {
        GuardDecision::Render
    } else {
        GuardDecision::Redirect(LOGIN_PATH)
    }
}

