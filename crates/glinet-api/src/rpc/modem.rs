// Modem endpoints
//
// Cellular modem status for LTE/5G devices (`modem` firmware module).
// The firmware reports most states as bare integers; models keep the
// raw value and expose typed accessors, so an unknown code degrades to
// `None` instead of a decode failure.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;
use crate::rpc::client::GlinetClient;

// ── State enums ──────────────────────────────────────────────────────

/// Modem type from `modem get_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemType {
    BuiltIn,
    External,
    Unsupported,
}

impl ModemType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::BuiltIn),
            1 => Some(Self::External),
            2 => Some(Self::Unsupported),
            _ => None,
        }
    }
}

/// SIM registration status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemRegistration {
    Registered,
    Unregistered,
    NeedsPin,
}

impl ModemRegistration {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Registered),
            1 => Some(Self::Unregistered),
            2 => Some(Self::NeedsPin),
            _ => None,
        }
    }
}

/// Network attachment status inside the modem's network block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemNetworkStatus {
    Connected,
    Connecting,
}

/// Coarse connection state derived from the network block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemConnectionState {
    Unknown,
    Disconnected,
    Connected,
}

/// Radio access technology from the signal section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemNetworkMode {
    Gsm,
    Umts,
    Lte,
    FiveG,
    LteAdvanced,
}

impl ModemNetworkMode {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            2 => Some(Self::Gsm),
            3 => Some(Self::Umts),
            4 => Some(Self::Lte),
            5 => Some(Self::FiveG),
            41 => Some(Self::LteAdvanced),
            _ => None,
        }
    }

    /// User-friendly label for the network mode.
    pub fn label(self) -> &'static str {
        match self {
            Self::Gsm => "2G",
            Self::Umts => "3G",
            Self::Lte => "LTE",
            Self::FiveG => "5G",
            Self::LteAdvanced => "4G+",
        }
    }
}

/// Overall signal strength buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SignalStrength {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl SignalStrength {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Poor),
            2 => Some(Self::Fair),
            3 => Some(Self::Good),
            4 => Some(Self::Excellent),
            _ => None,
        }
    }
}

// ── Models ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ModemList<T> {
    // `default = "Vec::new"` keeps the derive from demanding `T: Default`.
    #[serde(default = "Vec::new")]
    pub modems: Vec<T>,
}

/// SIM card identity fields shared by info and status payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimCardInfo {
    #[serde(default)]
    pub iccid: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub mcc: Option<String>,
    #[serde(default)]
    pub mnc: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Modem hardware info from `modem get_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModemInfo {
    #[serde(default)]
    pub bus: Option<String>,
    /// 0 = built-in, 1 = external, 2 = unsupported.
    #[serde(default, rename = "type")]
    pub modem_type: Option<i64>,
    #[serde(default)]
    pub at_port: Option<String>,
    #[serde(default)]
    pub data_port: Option<String>,
    #[serde(default)]
    pub sms_support: Option<bool>,
    #[serde(default)]
    pub lock_tower_support: Option<bool>,
    #[serde(default)]
    pub qcfg_unsupport: Option<bool>,
    #[serde(default)]
    pub imei: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub protocols: Option<Vec<String>>,
    #[serde(default)]
    pub devices: Option<Vec<String>>,
    #[serde(default)]
    pub simcard: Option<SimCardInfo>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModemInfo {
    pub fn kind(&self) -> Option<ModemType> {
        self.modem_type.and_then(ModemType::from_code)
    }
}

/// Signal details for the active SIM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModemSignal {
    /// Raw network mode code; see [`network_mode`](Self::network_mode).
    #[serde(default)]
    pub mode: Option<i64>,
    /// Raw strength bucket; see [`strength`](Self::strength).
    #[serde(default, rename = "strength")]
    pub strength_code: Option<i64>,
    #[serde(default)]
    pub rssi: Option<i64>,
    #[serde(default)]
    pub rsrp: Option<i64>,
    #[serde(default)]
    pub rsrq: Option<i64>,
    #[serde(default)]
    pub sinr: Option<i64>,
    #[serde(default)]
    pub ecio: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModemSignal {
    pub fn network_mode(&self) -> Option<ModemNetworkMode> {
        self.mode.and_then(ModemNetworkMode::from_code)
    }

    pub fn strength(&self) -> Option<SignalStrength> {
        self.strength_code.and_then(SignalStrength::from_code)
    }
}

/// SIM block inside `modem get_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModemSim {
    /// Raw registration code; see [`registration`](Self::registration).
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub iccid: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub mcc: Option<String>,
    #[serde(default)]
    pub mnc: Option<String>,
    #[serde(default)]
    pub signal: Option<ModemSignal>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModemSim {
    pub fn registration(&self) -> Option<ModemRegistration> {
        self.status.and_then(ModemRegistration::from_code)
    }
}

/// Per-stack IP details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModemIp {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub netmask: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub dns: Option<Vec<String>>,
}

/// Network block inside `modem get_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModemNetwork {
    /// Raw status; integer on some firmwares, `"connected"` /
    /// `"connecting"` strings on others. See [`status`](Self::status).
    #[serde(default, rename = "status")]
    pub status_raw: Option<Value>,
    #[serde(default)]
    pub traffic_total: Option<i64>,
    #[serde(default)]
    pub ipv4: Option<ModemIp>,
    #[serde(default)]
    pub ipv6: Option<ModemIp>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModemNetwork {
    pub fn status(&self) -> Option<ModemNetworkStatus> {
        match self.status_raw.as_ref()? {
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "connected" => Some(ModemNetworkStatus::Connected),
                "connecting" => Some(ModemNetworkStatus::Connecting),
                other => match other.parse::<i64>().ok()? {
                    0 => Some(ModemNetworkStatus::Connected),
                    1 => Some(ModemNetworkStatus::Connecting),
                    _ => None,
                },
            },
            Value::Number(n) => match n.as_i64()? {
                0 => Some(ModemNetworkStatus::Connected),
                1 => Some(ModemNetworkStatus::Connecting),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Cell details from `modem get_cells_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellInfo {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub band: Option<i64>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, rename = "type")]
    pub cell_type: Option<String>,
    #[serde(default)]
    pub ul_bandwidth: Option<String>,
    #[serde(default)]
    pub dl_bandwidth: Option<String>,
    #[serde(default)]
    pub tx_channel: Option<Value>,
    #[serde(default)]
    pub rssi: Option<i64>,
    #[serde(default)]
    pub rsrp: Option<i64>,
    #[serde(default)]
    pub rsrq: Option<i64>,
    #[serde(default)]
    pub sinr: Option<i64>,
    #[serde(default)]
    pub rssi_level: Option<i64>,
    #[serde(default)]
    pub rsrp_level: Option<i64>,
    #[serde(default)]
    pub rsrq_level: Option<i64>,
    #[serde(default)]
    pub sinr_level: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Runtime status for one modem from `modem get_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModemStatus {
    #[serde(default)]
    pub bus: Option<String>,
    #[serde(default)]
    pub current_sim: Option<i64>,
    /// SIM auto-switch for dual-SIM devices: 0 = enabled, 1 = disabled.
    #[serde(default)]
    pub switch_status: Option<i64>,
    #[serde(default)]
    pub simcard: Option<ModemSim>,
    #[serde(default)]
    pub network: Option<ModemNetwork>,
    #[serde(default)]
    pub new_sms_count: Option<i64>,
    #[serde(default)]
    pub passthrough: Option<Value>,
    #[serde(default)]
    pub err_code: Option<i64>,
    #[serde(default)]
    pub err_msg: Option<String>,
    /// Cell details, fetched separately per bus and attached by
    /// [`GlinetClient::modem_status`]. Not part of the wire payload.
    #[serde(default, skip_deserializing)]
    pub cells: Option<Vec<CellInfo>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModemStatus {
    /// Coarse connection state derived from the network block.
    pub fn connection_state(&self) -> ModemConnectionState {
        match self.network.as_ref().and_then(ModemNetwork::status) {
            Some(ModemNetworkStatus::Connected) => ModemConnectionState::Connected,
            Some(ModemNetworkStatus::Connecting) => ModemConnectionState::Disconnected,
            None => ModemConnectionState::Unknown,
        }
    }
}

// ── Endpoints ────────────────────────────────────────────────────────

impl GlinetClient {
    /// Hardware info for every modem.
    ///
    /// `call [modem, get_info]`
    pub async fn modem_info(&self) -> Result<Vec<ModemInfo>, Error> {
        let list: ModemList<ModemInfo> = self.call("modem", "get_info").await?;
        Ok(list.modems)
    }

    /// Runtime status for every modem, with per-bus cell details
    /// attached where available.
    ///
    /// `call [modem, get_status]`, then `get_cells_info` per bus. A
    /// failed cell lookup leaves `cells` as `None` rather than failing
    /// the whole status call.
    pub async fn modem_status(&self) -> Result<Vec<ModemStatus>, Error> {
        let list: ModemList<ModemStatus> = self.call("modem", "get_status").await?;
        let mut modems = list.modems;
        for entry in &mut modems {
            let Some(bus) = entry.bus.clone() else {
                continue;
            };
            entry.cells = match self.modem_cells(&bus).await {
                Ok(cells) => cells,
                Err(e) => {
                    debug!(bus, error = %e, "cell info lookup failed");
                    None
                }
            };
        }
        Ok(modems)
    }

    /// Cell information for one modem, or `None` when the firmware
    /// reports no cells.
    ///
    /// `call [modem, get_cells_info, {bus}]`
    pub async fn modem_cells(&self, bus: &str) -> Result<Option<Vec<CellInfo>>, Error> {
        #[derive(Deserialize)]
        struct CellsReply {
            #[serde(default)]
            cells: Vec<CellInfo>,
        }

        let reply: CellsReply = self
            .call_with("modem", "get_cells_info", &json!({ "bus": bus }))
            .await?;
        if reply.cells.is_empty() {
            Ok(None)
        } else {
            Ok(Some(reply.cells))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use serde_json::json;

    use super::*;

    #[test]
    fn modem_status_decodes_nested_payload() {
        let value = json!({
            "bus": "0001:01:00.0",
            "current_sim": 1,
            "switch_status": 1,
            "simcard": {
                "status": 0,
                "carrier": "TestNet",
                "iccid": "8944...",
                "signal": { "mode": 4, "strength": 3, "rssi": -67, "rsrp": -98 }
            },
            "network": {
                "status": "connected",
                "traffic_total": 123456,
                "ipv4": { "ip": "10.64.0.2", "dns": ["10.64.0.1"] }
            },
            "new_sms_count": 0
        });
        let status: ModemStatus = serde_json::from_value(value).unwrap();
        assert_eq!(status.connection_state(), ModemConnectionState::Connected);

        let sim = status.simcard.as_ref().unwrap();
        assert_eq!(sim.registration(), Some(ModemRegistration::Registered));
        let signal = sim.signal.as_ref().unwrap();
        assert_eq!(signal.network_mode(), Some(ModemNetworkMode::Lte));
        assert_eq!(signal.strength(), Some(SignalStrength::Good));
    }

    #[test]
    fn modem_list_decodes_without_default_elements() {
        let list: ModemList<ModemStatus> = serde_json::from_value(json!({
            "modems": [{ "bus": "0001:01:00.0" }]
        }))
        .unwrap();
        assert_eq!(list.modems.len(), 1);
        assert_eq!(list.modems[0].bus.as_deref(), Some("0001:01:00.0"));

        // A payload without the `modems` key reads as an empty list.
        let list: ModemList<ModemInfo> = serde_json::from_value(json!({})).unwrap();
        assert!(list.modems.is_empty());
    }

    #[test]
    fn network_status_handles_integer_and_string_codes() {
        let net: ModemNetwork = serde_json::from_value(json!({ "status": 1 })).unwrap();
        assert_eq!(net.status(), Some(ModemNetworkStatus::Connecting));

        let net: ModemNetwork = serde_json::from_value(json!({ "status": "Connected" })).unwrap();
        assert_eq!(net.status(), Some(ModemNetworkStatus::Connected));

        let net: ModemNetwork = serde_json::from_value(json!({})).unwrap();
        assert_eq!(net.status(), None);
    }

    #[test]
    fn network_mode_labels() {
        assert_eq!(ModemNetworkMode::from_code(41).unwrap().label(), "4G+");
        assert_eq!(ModemNetworkMode::from_code(5).unwrap().label(), "5G");
        assert!(ModemNetworkMode::from_code(7).is_none());
    }
}
