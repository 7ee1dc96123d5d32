// Wi-Fi endpoints
//
// Interface listing and per-interface enable/disable (`wifi` firmware
// module). Keys are redacted by default; callers that genuinely need
// the WPA key must ask for it explicitly.

use std::collections::HashMap;

use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::rpc::client::GlinetClient;
use crate::rpc::models::{WifiConfig, WifiIface};

impl GlinetClient {
    /// Raw Wi-Fi configuration, radios and interfaces nested as the
    /// firmware reports them.
    ///
    /// `call [wifi, get_config]`
    pub async fn wifi_config(&self) -> Result<WifiConfig, Error> {
        self.call("wifi", "get_config").await
    }

    /// All Wi-Fi interfaces across radios, keyed by interface name
    /// (e.g. `wifi2g`, `guest5g`).
    ///
    /// With `redact_keys` the WPA key is stripped from every entry.
    pub async fn wifi_ifaces(&self, redact_keys: bool) -> Result<HashMap<String, WifiIface>, Error> {
        let config = self.wifi_config().await?;
        let ifaces = config
            .res
            .into_iter()
            .flat_map(|device| device.ifaces)
            .map(|mut iface| {
                if redact_keys {
                    iface.key = None;
                }
                (iface.name.clone(), iface)
            })
            .collect();
        Ok(ifaces)
    }

    /// Enable or disable a Wi-Fi interface by name.
    ///
    /// The name must be one reported by [`wifi_ifaces`](Self::wifi_ifaces);
    /// an unknown name is rejected without touching the router.
    ///
    /// `call [wifi, set_config, {iface_name, enabled}]`
    pub async fn set_wifi_enabled(&self, iface_name: &str, enabled: bool) -> Result<(), Error> {
        let ifaces = self.wifi_ifaces(true).await?;
        if !ifaces.contains_key(iface_name) {
            return Err(Error::UnknownInterface {
                name: iface_name.to_owned(),
            });
        }
        debug!(iface_name, enabled, "setting wifi interface state");
        let _ = self
            .call_with::<serde_json::Value>(
                "wifi",
                "set_config",
                &json!({ "iface_name": iface_name, "enabled": enabled }),
            )
            .await?;
        Ok(())
    }
}
