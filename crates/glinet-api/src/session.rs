// Session management for the GL.iNet RPC API
//
// The firmware issues an opaque session id (`sid`) after a
// challenge/response login. The challenge supplies a crypt(3) algorithm,
// salt, and nonce; the client hashes the password with unix-crypt and
// answers with `md5_hex("{username}:{cipher}:{nonce}")`.
//
// The sid is owned here, behind a tokio Mutex: concurrent callers that
// both detect an expired session serialize on the lock, and whichever
// task acquires it second finds the fresh sid already stored instead of
// issuing a duplicate login.

use std::time::{Duration, Instant};

use pwhash::{HashSetup, md5_crypt, sha256_crypt, sha512_crypt};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::error::Error;
use crate::rpc::client::{RpcTransport, plain_payload};

/// A live session with the router.
///
/// At most one exists per [`SessionManager`]; a new login overwrites it.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub(crate) sid: String,
    issued_at: Instant,
}

impl Session {
    /// The firmware does not advertise a TTL, so expiry is only tracked
    /// when the caller configured one; otherwise rejection (code -1) is
    /// the signal.
    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|t| self.issued_at.elapsed() >= t)
    }
}

/// Challenge parameters returned by the `challenge` method.
#[derive(Debug, Deserialize)]
pub(crate) struct Challenge {
    pub alg: u8,
    pub salt: String,
    pub nonce: String,
}

#[derive(Debug, Deserialize)]
struct LoginReply {
    sid: String,
}

/// Owns the router credentials and the single mutable [`Session`].
///
/// Held by [`GlinetClient`](crate::GlinetClient); endpoint calls borrow a
/// sid via [`sid()`](Self::sid) and report rejected sids via
/// [`refresh()`](Self::refresh).
pub struct SessionManager {
    username: String,
    password: SecretString,
    ttl: Option<Duration>,
    state: Mutex<Option<Session>>,
}

impl SessionManager {
    pub(crate) fn new(
        username: impl Into<String>,
        password: SecretString,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            username: username.into(),
            password,
            ttl,
            state: Mutex::new(None),
        }
    }

    /// The username these credentials belong to.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Return a valid sid, logging in first if there is no session or
    /// the configured TTL has elapsed.
    pub(crate) async fn sid(&self, rpc: &RpcTransport) -> Result<String, Error> {
        let mut guard = self.state.lock().await;
        if let Some(session) = guard.as_ref() {
            if !session.is_expired(self.ttl) {
                return Ok(session.sid.clone());
            }
            debug!("session ttl elapsed");
        }
        let session = self.login(rpc).await?;
        let sid = session.sid.clone();
        *guard = Some(session);
        Ok(sid)
    }

    /// Replace a sid the router rejected.
    ///
    /// If another task already re-authenticated while this one was in
    /// flight, the newer sid is returned without a second login.
    pub(crate) async fn refresh(&self, rpc: &RpcTransport, stale: &str) -> Result<String, Error> {
        let mut guard = self.state.lock().await;
        if let Some(session) = guard.as_ref() {
            if session.sid != stale && !session.is_expired(self.ttl) {
                trace!("reusing session refreshed by a concurrent caller");
                return Ok(session.sid.clone());
            }
        }
        *guard = None;
        let session = self.login(rpc).await?;
        let sid = session.sid.clone();
        *guard = Some(session);
        Ok(sid)
    }

    /// Whether a session is currently held (and within its TTL, if set).
    pub(crate) async fn is_authenticated(&self) -> bool {
        self.state
            .lock()
            .await
            .as_ref()
            .is_some_and(|s| !s.is_expired(self.ttl))
    }

    /// Drop the current session without contacting the router.
    pub(crate) async fn clear(&self) {
        *self.state.lock().await = None;
    }

    /// Request login challenge parameters. Does not require a session.
    pub(crate) async fn challenge(&self, rpc: &RpcTransport) -> Result<Challenge, Error> {
        let payload = plain_payload("challenge", json!({ "username": self.username }));
        let value = rpc.execute(&payload, false).await?;
        serde_json::from_value(value).map_err(|e| Error::Schema {
            message: format!("challenge reply: {e}"),
        })
    }

    /// Perform the full challenge/login handshake.
    async fn login(&self, rpc: &RpcTransport) -> Result<Session, Error> {
        let challenge = self.challenge(rpc).await?;
        trace!(alg = challenge.alg, "received login challenge");

        let cipher = crypt_password(
            challenge.alg,
            &challenge.salt,
            self.password.expose_secret(),
        )?;
        let digest = login_digest(&self.username, &cipher, &challenge.nonce);

        let payload = plain_payload(
            "login",
            json!({ "username": self.username, "hash": digest }),
        );
        let value = rpc.execute(&payload, false).await.map_err(|e| match e {
            // A rejected handshake is a credential problem, not a stale
            // session; don't let it loop back into the retry path.
            Error::SessionExpired => Error::Authentication {
                message: "login rejected by router".into(),
            },
            other => other,
        })?;

        let reply: LoginReply = serde_json::from_value(value).map_err(|e| Error::Schema {
            message: format!("login reply: {e}"),
        })?;

        debug!("login successful");
        Ok(Session {
            sid: reply.sid,
            issued_at: Instant::now(),
        })
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("username", &self.username)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Hash the password with the crypt(3) scheme the challenge asked for.
///
/// alg 1 = md5-crypt, 5 = sha256-crypt, 6 = sha512-crypt (both SHA
/// variants at the default 5000 rounds, matching the firmware).
fn crypt_password(alg: u8, salt: &str, password: &str) -> Result<String, Error> {
    let setup = HashSetup {
        salt: Some(salt),
        rounds: None,
    };
    let hashed = match alg {
        1 => md5_crypt::hash_with(setup, password),
        5 => sha256_crypt::hash_with(setup, password),
        6 => sha512_crypt::hash_with(setup, password),
        other => return Err(Error::UnsupportedAlgorithm { alg: other }),
    };
    hashed.map_err(|e| Error::PasswordHash {
        message: e.to_string(),
    })
}

/// The final login proof: `md5_hex("{username}:{cipher}:{nonce}")`.
fn login_digest(username: &str, cipher: &str, nonce: &str) -> String {
    format!("{:x}", md5::compute(format!("{username}:{cipher}:{nonce}")))
}
