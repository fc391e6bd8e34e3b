//! Rendering gate for routes that require a signed-in user.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::components::Redirect;

use crate::state::auth::AuthState;
use crate::util::auth::{GuardDecision, guard_decision};

/// Spinner while the session initializes, `children` when signed in, and a
/// history-replacing redirect to login otherwise.
#[component]
pub fn ProtectedRoute(children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();

    move || match guard_decision(&auth.get()) {
        GuardDecision::Loading => view! {
            <div class="guard-loading" role="status">
                <span class="spinner"></span>
                <span class="visually-hidden">"Loading..."</span>
            </div>
        }
        .into_any(),
        GuardDecision::Render => children().into_any(),
        GuardDecision::Redirect(path) => {
            let options = NavigateOptions { replace: true, ..NavigateOptions::default() };
            view! { <Redirect path=path options=options/> }.into_any()
        }
    }
}
