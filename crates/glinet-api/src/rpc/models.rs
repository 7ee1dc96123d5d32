// RPC response types
//
// Models for the firmware's JSON payloads. Fields use `#[serde(default)]`
// liberally because the API is inconsistent about field presence across
// firmware versions, and every top-level model carries a `flatten`
// catch-all for undocumented fields.

use serde::{Deserialize, Serialize};

// ── System ───────────────────────────────────────────────────────────

/// Router identity from `system get_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterInfo {
    pub model: String,
    pub firmware_version: String,
    pub mac: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub sn: Option<String>,
    #[serde(default)]
    pub hardware_version: Option<String>,
    #[serde(default)]
    pub firmware_type: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Aggregate status from `system get_status`.
///
/// Wi-Fi entries have their `passwd` field removed before this is
/// returned to the caller; see
/// [`GlinetClient::router_status`](crate::GlinetClient::router_status).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterStatus {
    #[serde(default)]
    pub system: Option<SystemStatus>,
    #[serde(default)]
    pub wifi: Vec<WifiStatus>,
    #[serde(default)]
    pub network: Vec<NetworkStatus>,
    #[serde(default)]
    pub service: Vec<ServiceStatus>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// System block inside [`RouterStatus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    #[serde(default)]
    pub uptime: Option<u64>,
    #[serde(default)]
    pub load_average: Vec<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Per-radio Wi-Fi entry inside [`RouterStatus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiStatus {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub band: Option<String>,
    #[serde(default)]
    pub online: Option<bool>,
    #[serde(default)]
    pub guest: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Per-interface network entry inside [`RouterStatus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkStatus {
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub online: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Service entry inside [`RouterStatus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Load figures from `system get_load`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterLoad {
    #[serde(default)]
    pub load_average: Vec<f64>,
    pub memory_free: u64,
    pub memory_total: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// MAC addresses from `macclone get_mac`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacInfo {
    pub factory_mac: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Upstream connectivity from `edgerouter get_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternetStatus {
    /// Upstream DHCP server state: 0 = disabled, 1 = enabled with the
    /// gateway pointed at the bypass route, 2 = enabled, 3 = cable not
    /// connected.
    pub detected: u8,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub netmask: Option<String>,
    #[serde(default)]
    pub dns: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Clients ──────────────────────────────────────────────────────────

/// Wrapper around `clients get_list`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ClientList {
    #[serde(default)]
    pub clients: Vec<ClientEntry>,
}

/// A LAN/WLAN client known to the router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientEntry {
    pub mac: String,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub iface: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub blocked: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Wrapper around `lan get_static_bind_list`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StaticBindList {
    #[serde(default)]
    pub list: Vec<StaticLease>,
}

/// A static DHCP lease.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticLease {
    pub mac: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Wi-Fi ────────────────────────────────────────────────────────────

/// Full Wi-Fi configuration from `wifi get_config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiConfig {
    #[serde(default)]
    pub res: Vec<WifiDevice>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A radio with its interfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiDevice {
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub band: Option<String>,
    #[serde(default)]
    pub ifaces: Vec<WifiIface>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single Wi-Fi interface (e.g. `wifi2g`, `guest5g`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiIface {
    pub name: String,
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub encryption: Option<String>,
    #[serde(default)]
    pub hidden: Option<bool>,
    #[serde(default)]
    pub guest: Option<bool>,
    /// The WPA key. `None` when redacted (the default when listing).
    #[serde(default)]
    pub key: Option<String>,
}

// ── WireGuard ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WgConfigList {
    #[serde(default)]
    pub config_list: Vec<WgGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WgGroup {
    pub group_name: String,
    pub group_id: i64,
    #[serde(default)]
    pub peers: Vec<WgPeer>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WgPeer {
    pub name: String,
    pub peer_id: i64,
}

/// A configured WireGuard peer, flattened from the grouped config list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireguardPeer {
    /// Display name, `"{group_name}/{peer_name}"`.
    pub name: String,
    pub group_id: i64,
    pub peer_id: i64,
}

/// WireGuard client state from `wg-client get_status`.
///
/// Newer firmware (>= [`NEW_VPN_CLIENT_VERSION`](crate::NEW_VPN_CLIENT_VERSION))
/// reports `enabled`/`tunnel_id` and omits `status` while disabled;
/// older firmware always reports `status`. Both shapes are optional here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireguardStatus {
    /// 0 = not started, 1 = connected, 2 = connecting.
    #[serde(default)]
    pub status: Option<u8>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub tunnel_id: Option<i64>,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub peer_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub rx_bytes: Option<u64>,
    #[serde(default)]
    pub tx_bytes: Option<u64>,
    #[serde(default)]
    pub ipv4: Option<String>,
    #[serde(default)]
    pub ipv6: Option<String>,
    #[serde(default)]
    pub proxy: Option<bool>,
    #[serde(default)]
    pub log: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Tailscale ────────────────────────────────────────────────────────

/// Tailscale connection states as reported in `tailscale get_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailscaleConnection {
    Disconnected,
    LoginRequired,
    AuthorizationRequired,
    Connected,
    Connecting,
}

impl TailscaleConnection {
    /// Map the firmware's integer status. Unknown codes return `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Disconnected),
            1 => Some(Self::LoginRequired),
            2 => Some(Self::AuthorizationRequired),
            3 => Some(Self::Connected),
            4 => Some(Self::Connecting),
            _ => None,
        }
    }
}

/// Tailscale configuration from `tailscale get_config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailscaleConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub lan_enabled: Option<bool>,
    #[serde(default)]
    pub wan_enabled: Option<bool>,
    #[serde(default)]
    pub lan_ip: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Tailscale runtime status from `tailscale get_status`.
///
/// The firmware returns an empty array instead of an object while the
/// daemon is down; that case surfaces as `None` from
/// [`GlinetClient::tailscale_status`](crate::GlinetClient::tailscale_status).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailscaleStatus {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub login_name: Option<String>,
    #[serde(default)]
    pub address_v4: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TailscaleStatus {
    /// The typed connection state, if the code is a known one.
    pub fn connection(&self) -> Option<TailscaleConnection> {
        TailscaleConnection::from_code(self.status)
    }
}
