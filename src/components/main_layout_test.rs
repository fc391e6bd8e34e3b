use super::*;
use crate::net::types::UserInfo;

fn signed_in(ready: bool) -> AuthState {
    AuthState {
        token: Some("tok".to_owned()),
        user: Some(UserInfo { id: 1, email: "a@b.com".to_owned() }),
        ready,
    }
}

#[test]
fn hidden_until_ready_even_with_stored_token() {
    assert_eq!(session_control(&signed_in(false)), SessionControl::Hidden);
    assert_eq!(session_control(&AuthState::default()), SessionControl::Hidden);
}

#[test]
fn logout_once_ready_and_signed_in() {
    assert_eq!(session_control(&signed_in(true)), SessionControl::Logout { email: "a@b.com".to_owned() });
}

#[test]
fn login_once_ready_and_signed_out() {
    let state = AuthState { ready: true, ..AuthState::default() };
    assert_eq!(session_control(&state), SessionControl::Login);
}
