// System endpoints
//
// Router identity, status, load, reboot, and connectivity diagnostics
// (`system`, `macclone`, `diag`, `edgerouter` firmware modules).

use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::rpc::client::GlinetClient;
use crate::rpc::models::{InternetStatus, MacInfo, RouterInfo, RouterLoad, RouterStatus};

impl GlinetClient {
    /// Check whether the router answers at all.
    ///
    /// Probes the unauthenticated `challenge` method; any transport or
    /// RPC failure reads as unreachable.
    pub async fn router_reachable(&self) -> bool {
        self.session().challenge(self.rpc()).await.is_ok()
    }

    /// Router identity: model, firmware version, MAC.
    ///
    /// `call [system, get_info]`
    pub async fn router_info(&self) -> Result<RouterInfo, Error> {
        self.call("system", "get_info").await
    }

    /// Aggregate system/network/Wi-Fi/service status.
    ///
    /// `call [system, get_status]`
    ///
    /// Wi-Fi passwords are scrubbed from the response before it is
    /// returned; this client never exposes them through status calls.
    pub async fn router_status(&self) -> Result<RouterStatus, Error> {
        let mut status: RouterStatus = self.call("system", "get_status").await?;
        for wifi in &mut status.wifi {
            wifi.extra.remove("passwd");
            wifi.extra.remove("key");
        }
        Ok(status)
    }

    /// Load averages and memory figures.
    ///
    /// `call [system, get_load]`
    pub async fn router_load(&self) -> Result<RouterLoad, Error> {
        self.call("system", "get_load").await
    }

    /// The router's factory MAC address.
    ///
    /// `call [macclone, get_mac]`
    pub async fn router_mac(&self) -> Result<MacInfo, Error> {
        self.call("macclone", "get_mac").await
    }

    /// Reboot the router after `delay` seconds.
    ///
    /// `call [system, reboot, {delay}]`
    pub async fn reboot(&self, delay: u32) -> Result<(), Error> {
        debug!(delay, "rebooting router");
        let _ = self
            .call_with::<serde_json::Value>("system", "reboot", &json!({ "delay": delay }))
            .await?;
        Ok(())
    }

    /// Ping an address from the router.
    ///
    /// `call [diag, ping, {addr}]` — blocks until the probe finishes, so
    /// it runs under the long diagnostic timeout. The firmware returns
    /// `[]` when the target did not answer.
    pub async fn ping(&self, address: &str) -> Result<bool, Error> {
        let result = self
            .call_slow("diag", "ping", json!({ "addr": address }))
            .await?;
        Ok(result != json!([]))
    }

    /// Upstream connectivity as seen by the router.
    ///
    /// `call [edgerouter, get_status]`
    pub async fn internet_status(&self) -> Result<InternetStatus, Error> {
        self.call("edgerouter", "get_status").await
    }
}
