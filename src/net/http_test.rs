use super::*;
use crate::test_support::ScriptedTransport;
use futures::executor::block_on;
use serde::Deserialize;
use std::sync::Mutex;

// =============================================================
// Helpers
// =============================================================

#[derive(Debug, Deserialize, PartialEq)]
struct Echo {
    ok: bool,
}

struct TagRequest(&'static str);

impl RequestStage for TagRequest {
    fn on_request(&self, request: &mut HttpRequest) {
        let prior = request.header("X-Trace").unwrap_or_default().to_owned();
        request.set_header("X-Trace", &format!("{prior}{}", self.0));
    }
}

#[derive(Default)]
struct SeenStatuses(Arc<Mutex<Vec<Option<u16>>>>);

impl ResponseStage for SeenStatuses {
    fn on_response(&self, outcome: &Result<HttpResponse, TransportError>) {
        self.0.lock().unwrap().push(outcome.as_ref().ok().map(|r| r.status));
    }
}

fn client(transport: &ScriptedTransport) -> ApiClient<ScriptedTransport> {
    ApiClient::new(ApiConfig::default(), transport.clone())
}

// =============================================================
// HttpRequest headers
// =============================================================

#[test]
fn new_request_defaults_to_json_content_type() {
    let request = HttpRequest::get("transactions");
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.method, Method::Get);
}

#[test]
fn set_header_replaces_case_insensitively() {
    let mut request = HttpRequest::get("x");
    request.set_header("authorization", "Bearer old");
    request.set_header(AUTHORIZATION, "Bearer new");
    assert_eq!(request.header("AUTHORIZATION"), Some("Bearer new"));
    assert_eq!(request.headers().iter().filter(|(k, _)| k.eq_ignore_ascii_case(AUTHORIZATION)).count(), 1);
}

#[test]
fn remove_header_drops_every_casing() {
    let mut request = HttpRequest::get("x");
    request.set_header("authorization", "a");
    request.remove_header("Authorization");
    assert_eq!(request.header(AUTHORIZATION), None);
}

#[test]
fn with_json_attaches_body() {
    let request = HttpRequest::post("auth/login").with_json(&serde_json::json!({"a": 1})).unwrap();
    assert_eq!(request.body, Some(serde_json::json!({"a": 1})));
    assert_eq!(request.method.as_str(), "POST");
}

// =============================================================
// HttpResponse
// =============================================================

#[test]
fn response_json_maps_decode_errors() {
    let err = HttpResponse::new(200, "nope").json::<Echo>().unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

// =============================================================
// ApiClient pipeline
// =============================================================

#[test]
fn send_resolves_url_against_base() {
    let transport = ScriptedTransport::default();
    transport.reply(200, "{}");
    block_on(client(&transport).send(HttpRequest::get("/transactions"))).unwrap();
    assert_eq!(transport.sent()[0].0, "http://localhost:8000/api/v1/transactions");
}

#[test]
fn request_stages_run_in_order() {
    let transport = ScriptedTransport::default();
    transport.reply(200, "{}");
    let api = client(&transport).with_request_stage(TagRequest("a")).with_request_stage(TagRequest("b"));
    block_on(api.send(HttpRequest::get("x"))).unwrap();
    assert_eq!(transport.last_request().header("X-Trace"), Some("ab"));
}

#[test]
fn response_stages_see_every_outcome() {
    let transport = ScriptedTransport::default();
    transport.reply(200, "{}").reply(500, "boom").fail(TransportError::Timeout(10));
    let seen = SeenStatuses::default();
    let log = Arc::clone(&seen.0);
    let api = client(&transport).with_response_stage(seen);

    assert!(block_on(api.send(HttpRequest::get("x"))).is_ok());
    assert!(block_on(api.send(HttpRequest::get("x"))).is_err());
    assert!(block_on(api.send(HttpRequest::get("x"))).is_err());

    assert_eq!(*log.lock().unwrap(), vec![Some(200), Some(500), None]);
}

#[test]
fn send_maps_statuses_to_errors() {
    let transport = ScriptedTransport::default();
    transport.reply(401, "{\"detail\":\"expired\"}").reply(404, "missing");
    let api = client(&transport);

    assert_eq!(
        block_on(api.send(HttpRequest::get("x"))),
        Err(ApiError::Unauthorized { body: "{\"detail\":\"expired\"}".to_owned() })
    );
    assert_eq!(
        block_on(api.send(HttpRequest::get("x"))),
        Err(ApiError::Status { status: 404, body: "missing".to_owned() })
    );
}

#[test]
fn send_passes_transport_failures_through() {
    let transport = ScriptedTransport::default();
    transport.fail(TransportError::Network("offline".to_owned()));
    let err = block_on(client(&transport).send(HttpRequest::get("x"))).unwrap_err();
    assert_eq!(err, ApiError::Transport(TransportError::Network("offline".to_owned())));
}

#[test]
fn get_json_decodes_body() {
    let transport = ScriptedTransport::default();
    transport.reply(200, r#"{"ok":true}"#);
    let echo: Echo = block_on(client(&transport).get_json("ping")).unwrap();
    assert_eq!(echo, Echo { ok: true });
}

#[test]
fn post_json_sends_body_and_decodes_reply() {
    let transport = ScriptedTransport::default();
    transport.reply(200, r#"{"ok":false}"#);
    let echo: Echo = block_on(client(&transport).post_json("ping", &serde_json::json!({"n": 1}))).unwrap();
    assert_eq!(echo, Echo { ok: false });
    let sent = transport.last_request();
    assert_eq!(sent.method, Method::Post);
    assert_eq!(sent.body, Some(serde_json::json!({"n": 1})));
}
