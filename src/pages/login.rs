//! Login page with email + password credentials.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;

const MISSING_FIELDS: &str = "Enter both email and password.";

/// Trim the email and require both fields.
///
/// The password is passed through untouched; leading or trailing spaces may be
/// part of it.
pub fn validate_login_input(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(MISSING_FIELDS);
    }
    Ok((email.to_owned(), password.to_owned()))
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    #[cfg(feature = "hydrate")]
    let api = use_context::<crate::net::http::ApiClient<crate::net::gloo_transport::GlooTransport>>();
    #[cfg(feature = "hydrate")]
    let session = crate::state::auth::use_session();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        error.set(None);
        let (email_value, password_value) = match validate_login_input(&email.get(), &password.get()) {
            Ok(pair) => pair,
            Err(msg) => {
                error.set(Some(msg.to_owned()));
                return;
            }
        };

        #[cfg(feature = "hydrate")]
        {
            let Some(api) = api.clone() else {
                log::error!("login submitted without an api client in context");
                error.set(Some("Login is unavailable right now.".to_owned()));
                return;
            };
            let session = session.clone();
            busy.set(true);
            leptos::task::spawn_local(async move {
                let result = crate::net::api::sign_in(&api, &session, &email_value, &password_value).await;
                if let Err(msg) = result {
                    error.set(Some(msg));
                }
                busy.set(false);
            });
        }
        #[cfg(not(feature = "hydrate"))]
        drop((email_value, password_value));
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h2>"Login"</h2>
                <form class="login-form" on:submit=on_submit>
                    <Show when=move || error.get().is_some()>
                        <p class="login-message login-message--error" role="alert">
                            {move || error.get().unwrap_or_default()}
                        </p>
                    </Show>
                    <label class="login-label" for="login-email">"Email address"</label>
                    <input
                        id="login-email"
                        class="login-input"
                        type="email"
                        placeholder="Enter email"
                        required
                        disabled=move || busy.get()
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <label class="login-label" for="login-password">"Password"</label>
                    <input
                        id="login-password"
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        required
                        disabled=move || busy.get()
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Loading..." } else { "Login" }}
                    </button>
                </form>
            </div>
        </div>
    }
}
