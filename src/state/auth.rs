//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Session` is the single source of truth for the access token and user
//! record. It is constructed once per UI root, provided through Leptos
//! context, and consumed by the route guard, the layout, and the HTTP
//! pipeline's bearer and 401 stages.
//!
//! LIFECYCLE
//! =========
//! `Uninitialized` until `mark_ready` runs one tick after mount, then
//! `Unauthenticated` or `Authenticated`. Only `login`, `logout`, and
//! `teardown` mutate the persisted token/user pair; cross-tab writes are
//! picked up through the store's change listener.
//!
//! INVARIANTS
//! ==========
//! Token and user are present together or absent together. A half-set pair,
//! whether read at startup or observed mid-way through another tab's write,
//! is treated as signed out.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use leptos::prelude::{expect_context, provide_context};
use thiserror::Error;

use crate::config::{ACCESS_TOKEN_KEY, HOME_PATH, LEGACY_USER_KEY, LOGIN_PATH, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_INFO_KEY};
use crate::net::types::UserInfo;
use crate::state::navigation::{NavigationRequest, Navigator};
use crate::util::listeners::{ListenerSet, Subscription};
use crate::util::storage::{ChangeOrigin, LocalStore, StorageChange, StorageError};

/// Authentication state observed by the UI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub token: Option<String>,
    pub user: Option<UserInfo>,
    /// False until the initial storage read has been published.
    pub ready: bool,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("access token is empty or null")]
    EmptyToken,
    #[error("user email is empty")]
    EmptyEmail,
    #[error("failed to persist session: {0}")]
    Storage(#[from] StorageError),
}

/// Strip whitespace and any wrapping double quotes from a stored token.
///
/// Older builds JSON-encoded the token before storing it, leaving literal
/// quotes around the value, and stored a missing token as `null`. Blank and
/// `null` tokens are rejected.
pub fn normalize_token(raw: &str) -> Option<String> {
    let token = raw.trim().trim_matches('"').trim();
    if token.is_empty() || token == "null" { None } else { Some(token.to_owned()) }
}

/// Shared handle to the session container.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: LocalStore,
    navigator: Arc<dyn Navigator>,
    state: RwLock<AuthState>,
    listeners: Arc<ListenerSet<AuthState>>,
    // Non-zero while this session is writing its own keys.
    committing: AtomicUsize,
    _storage_sub: Subscription,
}

impl Session {
    /// Build the session from persisted storage.
    ///
    /// The read is synchronous; `ready` stays false until [`Session::mark_ready`].
    pub fn restore<N: Navigator>(store: LocalStore, navigator: N) -> Self {
        migrate_legacy_user(&store);
        let (token, user) = read_persisted(&store);
        log::debug!("restored session: authenticated={}", token.is_some());

        let inner = Arc::new_cyclic(|weak: &Weak<SessionInner>| {
            let weak = weak.clone();
            let storage_sub = store.subscribe(move |change| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_storage_change(change);
                }
            });
            SessionInner {
                store,
                navigator: Arc::new(navigator),
                state: RwLock::new(AuthState { token, user, ready: false }),
                listeners: ListenerSet::new(),
                committing: AtomicUsize::new(0),
                _storage_sub: storage_sub,
            }
        });
        Self { inner }
    }

    /// Publish readiness. Returns `true` only for the call that flipped it.
    pub fn mark_ready(&self) -> bool {
        let snapshot = {
            let mut state = self.inner.write_state();
            if state.ready {
                return false;
            }
            state.ready = true;
            state.clone()
        };
        self.inner.listeners.emit(&snapshot);
        true
    }

    /// Persist a new session and navigate to the home view.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyToken`/`EmptyEmail` for invalid input
    /// (state untouched), or `SessionError::Storage` when persistence fails,
    /// in which case the session is fully cleared and no navigation happens.
    pub fn login(&self, token: &str, user: UserInfo) -> Result<(), SessionError> {
        let token = normalize_token(token).ok_or(SessionError::EmptyToken)?;
        if user.email.trim().is_empty() {
            return Err(SessionError::EmptyEmail);
        }

        // Other tabs re-read the pair after each key lands: drop the old
        // token first and write the new one last so they never see a token
        // next to another user's record.
        let persisted = {
            let _commit = self.inner.begin_commit();
            self.inner.store.remove(ACCESS_TOKEN_KEY);
            self.inner
                .store
                .try_write(USER_INFO_KEY, &user)
                .and_then(|()| self.inner.store.try_write_text(ACCESS_TOKEN_KEY, &token))
        };
        if let Err(e) = persisted {
            log::error!("failed to persist session, clearing: {e}");
            self.inner.clear_keys(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_INFO_KEY]);
            return Err(e.into());
        }

        log::info!("signed in as user {}", user.id);
        self.inner.replace_pair(Some(token), Some(user));
        self.inner.navigator.navigate(NavigationRequest::push(HOME_PATH));
        Ok(())
    }

    /// Clear the session and navigate to the login view.
    ///
    /// Keys are always cleared; navigation only happens when something was
    /// signed in or persisted, so a repeat call is a no-op.
    pub fn logout(&self) {
        const LOGOUT_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_INFO_KEY];
        let in_memory = {
            let state = self.inner.read_state();
            state.token.is_some() || state.user.is_some()
        };
        let persisted = LOGOUT_KEYS.iter().any(|key| self.inner.store.read_text(key).is_some());
        self.inner.clear_keys(&LOGOUT_KEYS);
        if !in_memory && !persisted {
            log::debug!("logout: already signed out");
            return;
        }
        log::info!("signed out");
        self.inner.navigator.navigate(NavigationRequest::push(LOGIN_PATH));
    }

    /// Drop every session-derived key after the server rejected our
    /// credentials, then replace the current history entry with login.
    pub fn teardown(&self) {
        log::warn!("credentials rejected, tearing down session");
        self.inner.clear_keys(&SESSION_KEYS);
        self.inner.navigator.navigate(NavigationRequest::replace(LOGIN_PATH));
    }

    pub fn snapshot(&self) -> AuthState {
        self.inner.read_state().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.read_state().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read_state().is_authenticated()
    }

    /// Observe every state change.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        self.inner.listeners.add(listener)
    }

    /// The store this session persists into.
    pub fn store(&self) -> &LocalStore {
        &self.inner.store
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.read_state();
        f.debug_struct("Session")
            .field("authenticated", &state.is_authenticated())
            .field("ready", &state.ready)
            .finish_non_exhaustive()
    }
}

impl SessionInner {
    fn read_state(&self) -> RwLockReadGuard<'_, AuthState> {
        self.state.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn begin_commit(&self) -> CommitGuard<'_> {
        self.committing.fetch_add(1, Ordering::SeqCst);
        CommitGuard { counter: &self.committing }
    }

    fn clear_keys(&self, keys: &[&str]) {
        {
            let _commit = self.begin_commit();
            for key in keys {
                self.store.remove(key);
            }
        }
        self.replace_pair(None, None);
    }

    fn replace_pair(&self, token: Option<String>, user: Option<UserInfo>) {
        let snapshot = {
            let mut state = self.write_state();
            if state.token == token && state.user == user {
                return;
            }
            state.token = token;
            state.user = user;
            state.clone()
        };
        self.listeners.emit(&snapshot);
    }

    fn on_storage_change(&self, change: &StorageChange) {
        if change.origin == ChangeOrigin::Local && self.committing.load(Ordering::SeqCst) > 0 {
            return;
        }
        if !change.affects(ACCESS_TOKEN_KEY) && !change.affects(USER_INFO_KEY) {
            return;
        }
        let (token, user) = read_persisted(&self.store);
        log::debug!("session resynced from storage: authenticated={}", token.is_some());
        self.replace_pair(token, user);
    }
}

struct CommitGuard<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for CommitGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

fn read_persisted(store: &LocalStore) -> (Option<String>, Option<UserInfo>) {
    let token = store.read_text(ACCESS_TOKEN_KEY).and_then(|raw| normalize_token(&raw));
    let user = store.read::<Option<UserInfo>>(USER_INFO_KEY, None);
    match (token, user) {
        (Some(token), Some(user)) => (Some(token), Some(user)),
        (None, None) => (None, None),
        _ => {
            log::debug!("persisted session is half-set; treating as signed out");
            (None, None)
        }
    }
}

/// Move a user record stored under the legacy key to the canonical key.
fn migrate_legacy_user(store: &LocalStore) {
    if store.read_text(LEGACY_USER_KEY).is_none() {
        return;
    }
    if store.read_text(USER_INFO_KEY).is_none() {
        if let Some(user) = store.read::<Option<UserInfo>>(LEGACY_USER_KEY, None) {
            log::info!("migrating user record from {LEGACY_USER_KEY} to {USER_INFO_KEY}");
            store.write(USER_INFO_KEY, &user);
        }
    }
    store.remove(LEGACY_USER_KEY);
}

/// Make `session` available to descendants.
pub fn provide_session(session: Session) {
    provide_context(session);
}

/// Fetch the session provided by an ancestor.
///
/// Panics when no `Session` was provided; that is a wiring bug, not a
/// runtime condition.
pub fn use_session() -> Session {
    expect_context::<Session>()
}
