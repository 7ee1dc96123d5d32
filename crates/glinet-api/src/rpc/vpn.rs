// VPN endpoints
//
// WireGuard client control (`wg-client`) and Tailscale control
// (`tailscale`). Tailscale state handling is quirky: `get_status`
// returns an empty array while the daemon is down, and enabling it is
// eventually-consistent, so start/stop poll with bounded attempts.

use std::time::Duration;

use serde_json::{Value, json};
use tokio::time::sleep;
use tracing::debug;

use crate::error::Error;
use crate::rpc::client::{GlinetClient, decode};
use crate::rpc::models::{
    TailscaleConfig, TailscaleConnection, TailscaleStatus, WgConfigList, WireguardPeer,
    WireguardStatus,
};

/// How many enable/disable rounds to attempt before giving up.
const MAX_TAILSCALE_ATTEMPTS: u32 = 10;

impl GlinetClient {
    // ── WireGuard ────────────────────────────────────────────────────

    /// All configured WireGuard peers, flattened across groups.
    ///
    /// `call [wg-client, get_all_config_list]` — groups without peers
    /// are skipped.
    pub async fn wireguard_peers(&self) -> Result<Vec<WireguardPeer>, Error> {
        let list: WgConfigList = self.call("wg-client", "get_all_config_list").await?;
        let mut peers = Vec::new();
        for group in list.config_list {
            for peer in group.peers {
                peers.push(WireguardPeer {
                    name: format!("{}/{}", group.group_name, peer.name),
                    group_id: group.group_id,
                    peer_id: peer.peer_id,
                });
            }
        }
        Ok(peers)
    }

    /// WireGuard client runtime state.
    ///
    /// `call [wg-client, get_status]` — older firmware returns a single
    /// object, newer firmware a list of tunnels; both normalize to a
    /// `Vec` here.
    pub async fn wireguard_status(&self) -> Result<Vec<WireguardStatus>, Error> {
        let value = self.call_raw("wg-client", "get_status").await?;
        if value.is_array() {
            decode(value)
        } else {
            Ok(vec![decode(value)?])
        }
    }

    /// Start the WireGuard client for a peer.
    ///
    /// `call [wg-client, start, {group_id, peer_id}]`
    pub async fn wireguard_start(&self, group_id: i64, peer_id: i64) -> Result<(), Error> {
        debug!(group_id, peer_id, "starting wireguard client");
        let _ = self
            .call_with::<Value>(
                "wg-client",
                "start",
                &json!({ "group_id": group_id, "peer_id": peer_id }),
            )
            .await?;
        Ok(())
    }

    /// Stop the WireGuard client.
    ///
    /// `call [wg-client, stop]`
    pub async fn wireguard_stop(&self) -> Result<(), Error> {
        debug!("stopping wireguard client");
        let _ = self.call_raw("wg-client", "stop").await?;
        Ok(())
    }

    // ── Tailscale ────────────────────────────────────────────────────

    /// Tailscale configuration, or `None` on devices whose firmware
    /// does not ship the tailscale module (the call errors there).
    ///
    /// `call [tailscale, get_config]`
    pub async fn tailscale_config(&self) -> Result<Option<TailscaleConfig>, Error> {
        match self.call("tailscale", "get_config").await {
            Ok(config) => Ok(Some(config)),
            Err(Error::Rpc { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Tailscale runtime status, or `None` while the daemon is down
    /// (the firmware returns `[]` instead of an object then).
    ///
    /// `call [tailscale, get_status]`
    pub async fn tailscale_status(&self) -> Result<Option<TailscaleStatus>, Error> {
        let value = self.call_raw("tailscale", "get_status").await?;
        if value.is_array() {
            return Ok(None);
        }
        decode(value).map(Some)
    }

    /// The typed Tailscale connection state.
    ///
    /// A down daemon reads as [`Disconnected`](TailscaleConnection::Disconnected);
    /// an unrecognized status code is an error.
    pub async fn tailscale_state(&self) -> Result<TailscaleConnection, Error> {
        let Some(status) = self.tailscale_status().await? else {
            return Ok(TailscaleConnection::Disconnected);
        };
        status.connection().ok_or_else(|| Error::Tailscale {
            message: format!("unknown connection status: {}", status.status),
        })
    }

    /// Whether Tailscale is present and configured on this device.
    pub async fn tailscale_configured(&self) -> Result<bool, Error> {
        match self.tailscale_status().await {
            Ok(Some(_)) => return Ok(true),
            Ok(None) => {}
            Err(Error::Rpc { .. }) => return Ok(false),
            Err(e) => return Err(e),
        }
        Ok(self.tailscale_config().await?.is_some())
    }

    /// Merge updates into the current Tailscale config and write it back.
    ///
    /// `set_config` expects the full object, so partial updates are
    /// applied over a fresh `get_config` read.
    async fn tailscale_apply(&self, updates: &Value) -> Result<(), Error> {
        let mut config = self.call_raw("tailscale", "get_config").await?;
        if let (Some(target), Some(updates)) = (config.as_object_mut(), updates.as_object()) {
            for (key, value) in updates {
                target.insert(key.clone(), value.clone());
            }
        }
        let _ = self
            .call_with::<Value>("tailscale", "set_config", &config)
            .await?;
        Ok(())
    }

    /// Enable or disable Tailscale without waiting for the daemon.
    pub async fn set_tailscale_enabled(&self, enabled: bool) -> Result<(), Error> {
        debug!(enabled, "setting tailscale enabled");
        self.tailscale_apply(&json!({ "enabled": enabled })).await
    }

    /// Start Tailscale and wait for it to come up.
    ///
    /// While the daemon is down (`get_status` returns `[]`) the config
    /// is re-enabled and polled, up to 10 rounds. `Connecting` gets one
    /// 3-second grace period. States that need operator action
    /// (login/authorization required) are errors.
    pub async fn tailscale_start(&self) -> Result<(), Error> {
        for attempt in 0..MAX_TAILSCALE_ATTEMPTS {
            let Some(status) = self.tailscale_status().await? else {
                debug!(attempt, "tailscale down, enabling");
                self.tailscale_apply(&json!({ "enabled": true })).await?;
                if attempt > 0 {
                    sleep(Duration::from_millis(300)).await;
                }
                continue;
            };
            return match status.connection() {
                Some(TailscaleConnection::Connected) => Ok(()),
                Some(TailscaleConnection::Connecting) => {
                    sleep(Duration::from_secs(3)).await;
                    let after = self.tailscale_status().await?;
                    match after.as_ref().and_then(TailscaleStatus::connection) {
                        Some(TailscaleConnection::Connected) => Ok(()),
                        other => Err(Error::Tailscale {
                            message: format!(
                                "device reported 'Connecting' and then {other:?} 3 seconds later"
                            ),
                        }),
                    }
                }
                Some(
                    TailscaleConnection::LoginRequired
                    | TailscaleConnection::AuthorizationRequired,
                ) => Err(Error::Tailscale {
                    message: "connection not attempted as authorisation is not complete".into(),
                }),
                _ => Err(Error::Tailscale {
                    message: format!("unknown connection status: {}", status.status),
                }),
            };
        }
        Err(Error::Tailscale {
            message: format!("no success after {MAX_TAILSCALE_ATTEMPTS} enable attempts"),
        })
    }

    /// Stop Tailscale and wait for it to go down.
    ///
    /// A daemon that is already down is success. States that need
    /// operator action are errors (there is nothing running to stop).
    pub async fn tailscale_stop(&self) -> Result<(), Error> {
        for attempt in 0..MAX_TAILSCALE_ATTEMPTS {
            let Some(status) = self.tailscale_status().await? else {
                return Ok(());
            };
            match status.connection() {
                Some(TailscaleConnection::Connected | TailscaleConnection::Connecting) => {
                    debug!(attempt, "tailscale up, disabling");
                    self.tailscale_apply(&json!({ "enabled": false })).await?;
                    if attempt > 0 {
                        sleep(Duration::from_millis(300)).await;
                    }
                }
                Some(
                    TailscaleConnection::LoginRequired
                    | TailscaleConnection::AuthorizationRequired,
                ) => {
                    return Err(Error::Tailscale {
                        message: "disconnection not attempted as authorisation is not complete"
                            .into(),
                    });
                }
                _ => return Ok(()),
            }
        }
        Err(Error::Tailscale {
            message: format!("no success after {MAX_TAILSCALE_ATTEMPTS} disable attempts"),
        })
    }
}
