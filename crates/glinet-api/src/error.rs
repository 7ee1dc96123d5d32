use thiserror::Error;

/// Top-level error type for the `glinet-api` crate.
///
/// Covers every failure mode across the client: authentication, HTTP
/// transport, the firmware's JSON-RPC envelope, and response decoding.
/// Consumers match on the variant to distinguish retryable conditions
/// from terminal ones.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, or the session was still
    /// rejected after a fresh re-login).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The router rejected the session id (error code -1).
    /// Re-authentication might resolve it.
    #[error("Session expired or invalid -- re-authentication required")]
    SessionExpired,

    /// The challenge response asked for a password hashing algorithm
    /// this client does not implement.
    #[error("Router requested unsupported hashing algorithm {alg}")]
    UnsupportedAlgorithm { alg: u8 },

    /// Computing the crypt(3) password hash failed (e.g. the router
    /// supplied a malformed salt).
    #[error("Password hashing failed: {message}")]
    PasswordHash { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Protocol ────────────────────────────────────────────────────
    /// The router answered with a non-2xx HTTP status. The RPC endpoint
    /// normally reports failures inside a 200 body, so this points at a
    /// proxy or a wrong base URL.
    #[error("Unexpected HTTP status {status}")]
    Status { status: u16 },

    /// Error reported by the firmware inside the JSON-RPC envelope,
    /// other than the authentication codes (-1, -32000).
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The response body was not a recognizable JSON-RPC envelope
    /// (non-JSON, or neither `result` nor `error` present).
    #[error("Malformed RPC envelope: {message}")]
    Envelope { message: String, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// The `result` payload decoded, but a required field was missing
    /// or had the wrong type for the expected model.
    #[error("Response schema error: {message}")]
    Schema { message: String },

    // ── Arguments / state ───────────────────────────────────────────
    /// A Wi-Fi interface name was not found on the router.
    #[error("Unknown Wi-Fi interface: {name}")]
    UnknownInterface { name: String },

    /// Tailscale could not be driven to the requested state.
    #[error("Tailscale control failed: {message}")]
    Tailscale { message: String },
}

impl Error {
    /// Returns `true` if this error indicates the session was rejected
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Known firmware error codes and their meanings.
///
/// The firmware returns its own negative codes inside the JSON-RPC error
/// object; these were observed against real devices and are out of spec
/// for JSON-RPC proper. Used to fill in a message when the router sends
/// none.
pub fn describe_rpc_code(code: i64) -> Option<&'static str> {
    match code {
        -1 => Some("Invalid user, permission denied or not logged in"),
        -200 => Some("Server must be stopped before starting client"),
        -204 => Some("Null"),
        -250 => Some("Modem not found"),
        -251 => Some("modem_id missing"),
        -260 => Some("Destination phone number missing"),
        -261 => Some("Message content missing"),
        -32000 => Some("Access denied"),
        -32601 => Some("Method not found"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_expired_is_auth_expired() {
        assert!(Error::SessionExpired.is_auth_expired());
        assert!(
            !Error::Authentication {
                message: "bad password".into()
            }
            .is_auth_expired()
        );
    }

    #[test]
    fn known_codes_have_descriptions() {
        assert!(describe_rpc_code(-1).is_some());
        assert!(describe_rpc_code(-32000).is_some());
        assert!(describe_rpc_code(-9999).is_none());
    }
}
