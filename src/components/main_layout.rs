//! Navbar shell around authenticated views.

#[cfg(test)]
#[path = "main_layout_test.rs"]
mod main_layout_test;

use leptos::prelude::*;
use leptos_router::components::Outlet;

use crate::config::{HOME_PATH, LOGIN_PATH};
use crate::state::auth::{AuthState, use_session};

/// Which session control the navbar shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionControl {
    /// Session not initialized; server render and first client render agree.
    Hidden,
    Login,
    Logout { email: String },
}

pub fn session_control(state: &AuthState) -> SessionControl {
    if !state.ready {
        return SessionControl::Hidden;
    }
    if state.token.is_none() {
        return SessionControl::Login;
    }
    let email = state.user.as_ref().map(|u| u.email.clone()).unwrap_or_default();
    SessionControl::Logout { email }
}

#[component]
pub fn MainLayout() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = use_session();

    let control = move || match session_control(&auth.get()) {
        SessionControl::Hidden => ().into_any(),
        SessionControl::Login => view! { <a href=LOGIN_PATH class="navbar__link">"Login"</a> }.into_any(),
        SessionControl::Logout { email } => {
            let session = session.clone();
            view! {
                <span class="navbar__user">{email}</span>
                <button class="navbar__link" on:click=move |_| session.logout()>
                    "Logout"
                </button>
            }
            .into_any()
        }
    };

    view! {
        <nav class="navbar">
            <a href=HOME_PATH class="navbar__brand">"FinManager"</a>
            <a href=HOME_PATH class="navbar__link">"Dashboard"</a>
            <div class="navbar__spacer"></div>
            {control}
        </nav>
        <main class="container">
            <Outlet/>
        </main>
    }
}
