// RPC transport and client core
//
// Wraps `reqwest::Client` with GL.iNet-specific payload construction and
// envelope unwrapping. Every endpoint module (system, clients, wifi,
// vpn, wan, modem) is implemented as inherent methods in a separate
// file to keep this module focused on transport mechanics.
//
// Wire format: everything is `POST {base}/rpc` with a JSON-RPC 2.0 body.
// Authenticated calls use `method: "call"` with the sid as the first
// element of the params array. Failures come back as HTTP 200 with an
// `{"error": {"code": N, "message": "..."}}` body using the firmware's
// own negative codes.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, describe_rpc_code};
use crate::session::SessionManager;
use crate::transport::TransportConfig;

/// Build an unauthenticated payload (`challenge`, `login`).
pub(crate) fn plain_payload(method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 0,
        "method": method,
        "params": params,
    })
}

/// Build an authenticated `call` payload: `[sid, module, action(, args)]`.
pub(crate) fn call_payload(sid: &str, module: &str, action: &str, args: Option<&Value>) -> Value {
    let mut params = vec![json!(sid), json!(module), json!(action)];
    if let Some(args) = args {
        params.push(args.clone());
    }
    json!({
        "jsonrpc": "2.0",
        "id": 0,
        "method": "call",
        "params": params,
    })
}

#[derive(serde::Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(serde::Deserialize)]
struct RpcErrorBody {
    code: i64,
    #[serde(default)]
    message: Option<String>,
}

/// Raw HTTP transport for the RPC endpoint.
///
/// Knows nothing about sessions; it posts a payload and unwraps the
/// `{result}` / `{error}` envelope.
pub(crate) struct RpcTransport {
    http: reqwest::Client,
    endpoint: Url,
    slow_timeout: Duration,
}

impl RpcTransport {
    pub(crate) fn new(http: reqwest::Client, endpoint: Url, slow_timeout: Duration) -> Self {
        Self {
            http,
            endpoint,
            slow_timeout,
        }
    }

    /// Post a payload and return the unwrapped `result` value.
    ///
    /// `slow` switches to the long diagnostic timeout.
    pub(crate) async fn execute(&self, payload: &Value, slow: bool) -> Result<Value, Error> {
        trace!(endpoint = %self.endpoint, "POST rpc");

        let mut request = self.http.post(self.endpoint.clone()).json(payload);
        if slow {
            request = request.timeout(self.slow_timeout);
        }
        let resp = request.send().await.map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        parse_envelope(&body)
    }
}

/// Unwrap the JSON-RPC envelope, mapping the firmware's error codes.
///
/// The firmware reports failures inside HTTP 200 bodies, which is out of
/// spec for JSON-RPC, so both halves are handled here: `-1` means the
/// sid was rejected, `-32000` means the credentials were.
fn parse_envelope(body: &str) -> Result<Value, Error> {
    // Truncate by characters, not bytes; slicing can land mid-codepoint.
    let preview = || body.chars().take(200).collect::<String>();

    let envelope: RpcEnvelope = serde_json::from_str(body).map_err(|e| Error::Envelope {
        message: e.to_string(),
        body: preview(),
    })?;

    if let Some(err) = envelope.error {
        let message = err
            .message
            .or_else(|| describe_rpc_code(err.code).map(String::from))
            .unwrap_or_else(|| "null".into());
        return Err(match err.code {
            -1 => Error::SessionExpired,
            -32000 => Error::Authentication { message },
            code => Error::Rpc { code, message },
        });
    }

    envelope.result.ok_or_else(|| Error::Envelope {
        message: "neither `result` nor `error` present".into(),
        body: preview(),
    })
}

/// Async client for the GL.iNet router firmware v4 JSON-RPC API.
///
/// Construct one per router with the base URL and credentials; typed
/// endpoint methods live in the sibling modules. The session is managed
/// internally: the first authenticated call logs in, and a call whose
/// sid the router rejects is retried exactly once after a fresh login.
pub struct GlinetClient {
    rpc: RpcTransport,
    session: SessionManager,
}

impl GlinetClient {
    /// Create a client with default transport settings.
    ///
    /// `base_url` is the router root (e.g. `http://192.168.8.1`); the
    /// `/rpc` path is appended if not already present.
    pub fn new(
        base_url: &str,
        username: impl Into<String>,
        password: secrecy::SecretString,
    ) -> Result<Self, Error> {
        Self::with_config(
            base_url,
            username,
            password,
            &TransportConfig::default(),
            None,
        )
    }

    /// Create a client with explicit transport settings and an optional
    /// session TTL.
    ///
    /// Without a TTL the session is kept until the router rejects it;
    /// with one, a new login is performed proactively once it elapses.
    pub fn with_config(
        base_url: &str,
        username: impl Into<String>,
        password: secrecy::SecretString,
        transport: &TransportConfig,
        session_ttl: Option<Duration>,
    ) -> Result<Self, Error> {
        let endpoint = rpc_endpoint(base_url)?;
        let http = transport.build_client()?;
        Ok(Self {
            rpc: RpcTransport::new(http, endpoint, transport.slow_timeout),
            session: SessionManager::new(username, password, session_ttl),
        })
    }

    /// Authenticate now instead of lazily on the first endpoint call.
    pub async fn login(&self) -> Result<(), Error> {
        self.session.sid(&self.rpc).await?;
        Ok(())
    }

    /// Whether a session is currently held.
    pub async fn logged_in(&self) -> bool {
        self.session.is_authenticated().await
    }

    /// Forget the current session. The next call logs in again.
    pub async fn logout(&self) {
        self.session.clear().await;
    }

    /// The session manager (for inspecting the configured username).
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub(crate) fn rpc(&self) -> &RpcTransport {
        &self.rpc
    }

    // ── Call helpers ─────────────────────────────────────────────────

    /// Issue an authenticated call and decode the result.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        module: &str,
        action: &str,
    ) -> Result<T, Error> {
        let value = self.call_value(module, action, None, false).await?;
        decode(value)
    }

    /// Issue an authenticated call with an argument object.
    pub(crate) async fn call_with<T: DeserializeOwned>(
        &self,
        module: &str,
        action: &str,
        args: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let args = serde_json::to_value(args).map_err(|e| Error::Schema {
            message: format!("request arguments: {e}"),
        })?;
        let value = self.call_value(module, action, Some(args), false).await?;
        decode(value)
    }

    /// Authenticated call returning the raw result value.
    pub(crate) async fn call_raw(&self, module: &str, action: &str) -> Result<Value, Error> {
        self.call_value(module, action, None, false).await
    }

    /// Authenticated call with the long diagnostic timeout.
    pub(crate) async fn call_slow(
        &self,
        module: &str,
        action: &str,
        args: Value,
    ) -> Result<Value, Error> {
        self.call_value(module, action, Some(args), true).await
    }

    /// The auth-retry core: obtain a sid, issue the call, and on a
    /// rejected sid re-login once and retry. A second rejection after a
    /// fresh login is terminal.
    async fn call_value(
        &self,
        module: &str,
        action: &str,
        args: Option<Value>,
        slow: bool,
    ) -> Result<Value, Error> {
        let sid = self.session.sid(&self.rpc).await?;
        debug!(module, action, "rpc call");

        let payload = call_payload(&sid, module, action, args.as_ref());
        match self.rpc.execute(&payload, slow).await {
            Err(e) if e.is_auth_expired() => {
                debug!(module, action, "sid rejected, re-authenticating once");
                let sid = self.session.refresh(&self.rpc, &sid).await?;
                let payload = call_payload(&sid, module, action, args.as_ref());
                match self.rpc.execute(&payload, slow).await {
                    Err(e) if e.is_auth_expired() => Err(Error::Authentication {
                        message: "request rejected again after a fresh login".into(),
                    }),
                    other => other,
                }
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for GlinetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlinetClient")
            .field("endpoint", &self.rpc.endpoint)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Decode a `result` value into a typed model.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_json::from_value(value).map_err(|e| Error::Schema {
        message: e.to_string(),
    })
}

/// Normalize a base URL to the `/rpc` endpoint.
fn rpc_endpoint(base_url: &str) -> Result<Url, Error> {
    let trimmed = base_url.trim_end_matches('/');
    let full = if trimmed.ends_with("/rpc") {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/rpc")
    };
    Url::parse(&full).map_err(Error::InvalidUrl)
}
