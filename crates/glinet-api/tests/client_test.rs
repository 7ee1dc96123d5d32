#![allow(clippy::unwrap_used)]
// Integration tests for `GlinetClient` using wiremock.
//
// Every firmware call is `POST /rpc`, so mocks discriminate on the
// JSON-RPC body: `method` for the login handshake, the params array
// (sid first) for authenticated calls.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use glinet_api::{Error, GlinetClient};

// ── Helpers ─────────────────────────────────────────────────────────

fn password() -> SecretString {
    "goodlife".to_string().into()
}

async fn setup() -> (MockServer, GlinetClient) {
    let server = MockServer::start().await;
    let client = GlinetClient::new(&server.uri(), "root", password()).unwrap();
    (server, client)
}

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 0,
        "result": result,
    }))
}

fn rpc_error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 0,
        "error": { "code": code, "message": message },
    }))
}

/// Mock the `challenge` method. The handshake hashes against this salt
/// and nonce; the login mock does not verify the digest.
fn challenge_mock() -> Mock {
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": "challenge" })))
        .respond_with(rpc_result(json!({
            "alg": 1,
            "salt": "saltsalt",
            "nonce": "a1b2c3",
        })))
}

/// Mock the `login` method to hand out `sid`.
fn login_mock(sid: &str) -> Mock {
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": "login" })))
        .respond_with(rpc_result(json!({ "sid": sid })))
}

/// Mock an authenticated `call` for a specific sid/module/action.
fn call_mock(sid: &str, module: &str, action: &str, response: ResponseTemplate) -> Mock {
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({
            "method": "call",
            "params": [sid, module, action],
        })))
        .respond_with(response)
}

fn router_info_body() -> serde_json::Value {
    json!({
        "model": "mt6000",
        "firmware_version": "4.5.0",
        "mac": "94:83:c4:00:00:01",
    })
}

// ── Login handshake ─────────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    challenge_mock().expect(1).mount(&server).await;
    login_mock("sid-1").expect(1).mount(&server).await;

    assert!(!client.logged_in().await);
    client.login().await.unwrap();
    assert!(client.logged_in().await);

    client.logout().await;
    assert!(!client.logged_in().await);
}

#[tokio::test]
async fn test_login_bad_password() {
    let (server, client) = setup().await;

    challenge_mock().mount(&server).await;
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": "login" })))
        .respond_with(rpc_error(-32000, "Access denied"))
        .mount(&server)
        .await;

    let result = client.login().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert!(!client.logged_in().await);
}

#[tokio::test]
async fn test_unreachable_host() {
    // Nothing listens on port 1.
    let client = GlinetClient::new("http://127.0.0.1:1", "root", password()).unwrap();

    let result = client.login().await;
    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected Transport error, got: {result:?}"
    );
    assert!(!client.router_reachable().await);
}

#[tokio::test]
async fn test_challenge_with_unknown_algorithm() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": "challenge" })))
        .respond_with(rpc_result(json!({
            "alg": 9,
            "salt": "saltsalt",
            "nonce": "a1b2c3",
        })))
        .mount(&server)
        .await;

    let result = client.login().await;
    assert!(
        matches!(result, Err(Error::UnsupportedAlgorithm { alg: 9 })),
        "expected UnsupportedAlgorithm, got: {result:?}"
    );
}

// ── Session reuse and retry ─────────────────────────────────────────

#[tokio::test]
async fn test_session_reused_across_calls() {
    let (server, client) = setup().await;

    challenge_mock().expect(1).mount(&server).await;
    login_mock("sid-1").expect(1).mount(&server).await;
    call_mock("sid-1", "system", "get_info", rpc_result(router_info_body()))
        .expect(2)
        .mount(&server)
        .await;

    let first = client.router_info().await.unwrap();
    let second = client.router_info().await.unwrap();
    assert_eq!(first.model, "mt6000");
    assert_eq!(second.mac, "94:83:c4:00:00:01");
}

#[tokio::test]
async fn test_expired_sid_is_retried_once() {
    let (server, client) = setup().await;

    challenge_mock().expect(2).mount(&server).await;
    // First login hands out sid-1, the next one sid-2.
    login_mock("sid-1").up_to_n_times(1).mount(&server).await;
    login_mock("sid-2").expect(1).mount(&server).await;

    // The router rejects sid-1 and accepts sid-2.
    call_mock("sid-1", "system", "get_info", rpc_error(-1, ""))
        .expect(1)
        .mount(&server)
        .await;
    call_mock("sid-1", "system", "get_info", rpc_result(router_info_body()))
        .expect(0)
        .mount(&server)
        .await;
    call_mock("sid-2", "system", "get_info", rpc_result(router_info_body()))
        .expect(1)
        .mount(&server)
        .await;

    let info = client.router_info().await.unwrap();
    assert_eq!(info.model, "mt6000");
}

#[tokio::test]
async fn test_rejection_after_fresh_login_is_terminal() {
    let (server, client) = setup().await;

    challenge_mock().mount(&server).await;
    login_mock("sid-1").mount(&server).await;
    // Every call is rejected, even with a fresh sid.
    call_mock("sid-1", "system", "get_info", rpc_error(-1, ""))
        .expect(2)
        .mount(&server)
        .await;

    let result = client.router_info().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_concurrent_calls_share_one_login() {
    let (server, client) = setup().await;

    challenge_mock().expect(1).mount(&server).await;
    login_mock("sid-1").expect(1).mount(&server).await;
    call_mock("sid-1", "system", "get_info", rpc_result(router_info_body()))
        .mount(&server)
        .await;
    call_mock(
        "sid-1",
        "system",
        "get_load",
        rpc_result(json!({
            "load_average": [0.2, 0.1, 0.0],
            "memory_free": 512,
            "memory_total": 1024,
        })),
    )
    .mount(&server)
    .await;

    let (info, load) = tokio::join!(client.router_info(), client.router_load());
    assert_eq!(info.unwrap().model, "mt6000");
    assert_eq!(load.unwrap().memory_total, 1024);
}

// ── Envelope and schema failures ────────────────────────────────────

#[tokio::test]
async fn test_http_error_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rpc"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let result = client.login().await;
    assert!(
        matches!(result, Err(Error::Status { status: 502 })),
        "expected Status error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_non_json_body() {
    let (server, client) = setup().await;

    challenge_mock().mount(&server).await;
    login_mock("sid-1").mount(&server).await;
    call_mock(
        "sid-1",
        "system",
        "get_info",
        ResponseTemplate::new(200).set_body_string("<html>captive portal</html>"),
    )
    .mount(&server)
    .await;

    let result = client.router_info().await;
    assert!(
        matches!(result, Err(Error::Envelope { .. })),
        "expected Envelope error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_schema_violation() {
    let (server, client) = setup().await;

    challenge_mock().mount(&server).await;
    login_mock("sid-1").mount(&server).await;
    // get_info without the required `model` field.
    call_mock(
        "sid-1",
        "system",
        "get_info",
        rpc_result(json!({ "firmware_version": "4.5.0", "mac": "94:83:c4:00:00:01" })),
    )
    .mount(&server)
    .await;

    let result = client.router_info().await;
    assert!(
        matches!(result, Err(Error::Schema { .. })),
        "expected Schema error, got: {result:?}"
    );
}

// ── Typed endpoints ─────────────────────────────────────────────────

#[tokio::test]
async fn test_connected_clients_filters_offline() {
    let (server, client) = setup().await;

    challenge_mock().mount(&server).await;
    login_mock("sid-1").mount(&server).await;
    call_mock(
        "sid-1",
        "clients",
        "get_list",
        rpc_result(json!({
            "clients": [
                { "mac": "aa:bb:cc:00:00:01", "online": true, "ip": "192.168.8.100" },
                { "mac": "aa:bb:cc:00:00:02", "online": false },
                { "mac": "aa:bb:cc:00:00:03", "online": true },
            ]
        })),
    )
    .mount(&server)
    .await;

    let connected = client.connected_clients().await.unwrap();
    assert_eq!(connected.len(), 2);
    assert!(connected.contains_key("aa:bb:cc:00:00:01"));
    assert!(!connected.contains_key("aa:bb:cc:00:00:02"));
}

#[tokio::test]
async fn test_wifi_ifaces_redacts_keys() {
    let (server, client) = setup().await;

    challenge_mock().mount(&server).await;
    login_mock("sid-1").mount(&server).await;
    call_mock(
        "sid-1",
        "wifi",
        "get_config",
        rpc_result(json!({
            "res": [{
                "device": "radio0",
                "band": "2G",
                "ifaces": [
                    { "name": "wifi2g", "ssid": "Home", "enabled": true, "key": "hunter2" },
                    { "name": "guest2g", "ssid": "Guest", "enabled": false, "key": "guestpass" },
                ]
            }]
        })),
    )
    .expect(2)
    .mount(&server)
    .await;

    let redacted = client.wifi_ifaces(true).await.unwrap();
    assert_eq!(redacted["wifi2g"].key, None);
    assert!(redacted["wifi2g"].enabled);

    let full = client.wifi_ifaces(false).await.unwrap();
    assert_eq!(full["guest2g"].key.as_deref(), Some("guestpass"));
}

#[tokio::test]
async fn test_set_wifi_enabled_rejects_unknown_interface() {
    let (server, client) = setup().await;

    challenge_mock().mount(&server).await;
    login_mock("sid-1").mount(&server).await;
    call_mock(
        "sid-1",
        "wifi",
        "get_config",
        rpc_result(json!({
            "res": [{ "ifaces": [{ "name": "wifi2g" }] }]
        })),
    )
    .mount(&server)
    .await;

    let result = client.set_wifi_enabled("wifi6g", true).await;
    assert!(
        matches!(result, Err(Error::UnknownInterface { .. })),
        "expected UnknownInterface error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_tailscale_status_down_daemon() {
    let (server, client) = setup().await;

    challenge_mock().mount(&server).await;
    login_mock("sid-1").mount(&server).await;
    // The firmware answers `[]` while tailscaled is not running.
    call_mock("sid-1", "tailscale", "get_status", rpc_result(json!([])))
        .mount(&server)
        .await;

    assert!(client.tailscale_status().await.unwrap().is_none());
    assert_eq!(
        client.tailscale_state().await.unwrap(),
        glinet_api::rpc::models::TailscaleConnection::Disconnected
    );
}

#[tokio::test]
async fn test_multiwan_state_joins_config_and_status() {
    let (server, client) = setup().await;

    challenge_mock().mount(&server).await;
    login_mock("sid-1").mount(&server).await;
    call_mock(
        "sid-1",
        "kmwan",
        "get_config",
        rpc_result(json!({
            "mode": 0,
            "interfaces": [
                { "interface": "wan", "metric": 1 },
                { "interface": "wwan", "metric": 2 },
            ]
        })),
    )
    .mount(&server)
    .await;
    call_mock(
        "sid-1",
        "kmwan",
        "get_status",
        rpc_result(json!({
            "interfaces": [
                { "interface": "wan", "status_v4": 1 },
                { "interface": "wwan", "status_v4": 0 },
            ]
        })),
    )
    .mount(&server)
    .await;

    let state = client.multiwan_state(false).await.unwrap();
    assert_eq!(state.interfaces.len(), 2);
    assert_eq!(state.primary.as_deref(), Some("wwan"));
    assert!(!state.interfaces["wan"].is_online(false));
}

#[tokio::test]
async fn test_ping_interprets_empty_result() {
    let (server, client) = setup().await;

    challenge_mock().mount(&server).await;
    login_mock("sid-1").mount(&server).await;
    call_mock("sid-1", "diag", "ping", rpc_result(json!([])))
        .mount(&server)
        .await;

    assert!(!client.ping("10.0.0.1").await.unwrap());
}
