// Multi-WAN endpoints
//
// Joined view of `kmwan get_config` (metric/weight, mode) and
// `kmwan get_status` (per-stack online state), plus modem details for
// cellular WAN interfaces. Status coding is 0 = online, 1 = offline;
// some firmwares extend this with 2 = error and others report booleans
// or strings, so the raw value is kept and interpreted leniently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::rpc::client::GlinetClient;
use crate::rpc::modem::{ModemInfo, ModemStatus};

/// Interface connectivity status reported by kmwan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceStatus {
    Online,
    Offline,
    Error,
}

impl InterfaceStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Online),
            1 => Some(Self::Offline),
            2 => Some(Self::Error),
            _ => None,
        }
    }

    /// Lenient conversion from the raw status value; firmwares have
    /// been seen reporting integers, booleans, and strings.
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(true) => Some(Self::Online),
            Value::Bool(false) => Some(Self::Offline),
            Value::Number(n) => Self::from_code(n.as_i64()?),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "online" | "up" | "connected" => Some(Self::Online),
                "offline" | "down" | "disconnected" => Some(Self::Offline),
                other => Self::from_code(other.parse().ok()?),
            },
            _ => None,
        }
    }
}

/// Multi-WAN operating mode reported by kmwan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiWanMode {
    Failover,
    LoadBalancing,
}

impl MultiWanMode {
    /// Unknown codes fall back to failover, the firmware default.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::LoadBalancing,
            _ => Self::Failover,
        }
    }
}

/// Raw payload from `kmwan get_status`.
#[derive(Debug, Clone, Deserialize)]
pub struct KmwanStatus {
    #[serde(default)]
    pub interfaces: Vec<KmwanInterfaceStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KmwanInterfaceStatus {
    pub interface: String,
    #[serde(default)]
    pub status_v4: Option<Value>,
    #[serde(default)]
    pub status_v6: Option<Value>,
}

/// Raw payload from `kmwan get_config`.
#[derive(Debug, Clone, Deserialize)]
pub struct KmwanConfig {
    /// 0 = failover, 1 = load balancing.
    #[serde(default)]
    pub mode: i64,
    #[serde(default)]
    pub interfaces: Vec<KmwanInterfaceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KmwanInterfaceConfig {
    pub interface: String,
    #[serde(default)]
    pub metric: Option<i64>,
    #[serde(default)]
    pub weight: Option<i64>,
}

/// Combined modem runtime status and hardware info for a cellular WAN.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModemDetails {
    pub status: Option<ModemStatus>,
    pub info: Option<ModemInfo>,
}

/// Joined view of kmwan configuration and status for one interface.
#[derive(Debug, Clone, Serialize)]
pub struct InterfaceInfo {
    /// Logical name as used by kmwan (`wan`, `wwan`, `tethering`,
    /// `modem_0001`, `secondwan`, ...).
    pub name: String,
    /// Failover priority; lower value wins.
    pub metric: Option<i64>,
    /// Load-balancing weight.
    pub weight: Option<i64>,
    pub status_v4: Option<InterfaceStatus>,
    pub status_v6: Option<InterfaceStatus>,
    /// Populated for `modem*` interfaces when modem data is available.
    pub modem: Option<ModemDetails>,
}

impl InterfaceInfo {
    fn new(name: String) -> Self {
        Self {
            name,
            metric: None,
            weight: None,
            status_v4: None,
            status_v6: None,
            modem: None,
        }
    }

    /// `Some(true)` if IPv4 is explicitly online, `Some(false)` if
    /// explicitly offline or errored, `None` without information.
    pub fn ipv4_online(&self) -> Option<bool> {
        self.status_v4.map(|s| s == InterfaceStatus::Online)
    }

    /// IPv6 counterpart of [`ipv4_online`](Self::ipv4_online).
    pub fn ipv6_online(&self) -> Option<bool> {
        self.status_v6.map(|s| s == InterfaceStatus::Online)
    }

    /// Coarse "is this usable" predicate.
    ///
    /// Prefers the requested stack when it has information, falls back
    /// to the other one, and reads no information as not online.
    pub fn is_online(&self, prefer_ipv6: bool) -> bool {
        let v4 = self.ipv4_online();
        let v6 = self.ipv6_online();
        if prefer_ipv6 && v6.is_some() {
            return v6.unwrap_or(false);
        }
        v4.or(v6).unwrap_or(false)
    }
}

/// Snapshot of the router's Multi-WAN configuration and status.
#[derive(Debug, Clone, Serialize)]
pub struct MultiWanState {
    pub mode: MultiWanMode,
    pub interfaces: BTreeMap<String, InterfaceInfo>,
    /// Interface currently considered primary, if any is online.
    pub primary: Option<String>,
}

impl Serialize for InterfaceStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let code: i64 = match self {
            Self::Online => 0,
            Self::Offline => 1,
            Self::Error => 2,
        };
        serializer.serialize_i64(code)
    }
}

impl Serialize for MultiWanMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(match self {
            Self::Failover => 0,
            Self::LoadBalancing => 1,
        })
    }
}

impl GlinetClient {
    /// Raw live status from `kmwan get_status`.
    pub async fn kmwan_status(&self) -> Result<KmwanStatus, Error> {
        self.call("kmwan", "get_status").await
    }

    /// Raw configuration from `kmwan get_config`.
    pub async fn kmwan_config(&self) -> Result<KmwanConfig, Error> {
        self.call("kmwan", "get_config").await
    }

    /// Fetch and join kmwan configuration and status into one snapshot,
    /// attaching modem details to `modem*` interfaces.
    pub async fn multiwan_state(&self, prefer_ipv6: bool) -> Result<MultiWanState, Error> {
        let config = self.kmwan_config().await?;
        let status = self.kmwan_status().await?;

        let mut interfaces: BTreeMap<String, InterfaceInfo> = BTreeMap::new();

        // First layer: config (metric / weight).
        for entry in config.interfaces {
            let info = interfaces
                .entry(entry.interface.clone())
                .or_insert_with(|| InterfaceInfo::new(entry.interface));
            info.metric = entry.metric;
            info.weight = entry.weight;
        }

        // Second layer: live status (per-stack online / offline).
        for entry in status.interfaces {
            let info = interfaces
                .entry(entry.interface.clone())
                .or_insert_with(|| InterfaceInfo::new(entry.interface));
            info.status_v4 = entry.status_v4.as_ref().and_then(InterfaceStatus::from_value);
            info.status_v6 = entry.status_v6.as_ref().and_then(InterfaceStatus::from_value);
        }

        let mode = MultiWanMode::from_code(config.mode);
        let primary = select_primary(&interfaces, mode, prefer_ipv6);

        // Attach modem details to modem interfaces if any exist.
        // BTreeMap iteration keeps modem_0001, modem_0002, ... ordered,
        // matching the firmware's modem list order.
        let modem_names: Vec<String> = interfaces
            .keys()
            .filter(|name| name.starts_with("modem"))
            .cloned()
            .collect();
        if !modem_names.is_empty() {
            debug!(count = modem_names.len(), "attaching modem details");
            let statuses = self.modem_status().await?;
            let infos = self.modem_info().await?;
            let mut statuses = statuses.into_iter();
            let mut infos = infos.into_iter();
            for name in modem_names {
                let details = ModemDetails {
                    status: statuses.next(),
                    info: infos.next(),
                };
                if let Some(info) = interfaces.get_mut(&name) {
                    info.modem = Some(details);
                }
            }
        }

        Ok(MultiWanState {
            mode,
            interfaces,
            primary,
        })
    }
}

/// Pick the primary interface from the online set.
///
/// Failover: lowest metric wins (missing metric sorts last).
/// Load balancing: highest weight wins, metric breaks ties.
fn select_primary(
    interfaces: &BTreeMap<String, InterfaceInfo>,
    mode: MultiWanMode,
    prefer_ipv6: bool,
) -> Option<String> {
    const NO_METRIC: i64 = 10_000;

    let online: Vec<&InterfaceInfo> = interfaces
        .values()
        .filter(|i| i.is_online(prefer_ipv6))
        .collect();

    let best = match mode {
        MultiWanMode::Failover => online
            .into_iter()
            .min_by_key(|i| i.metric.unwrap_or(NO_METRIC))?,
        MultiWanMode::LoadBalancing => online
            .into_iter()
            .min_by_key(|i| (-i.weight.unwrap_or(0), i.metric.unwrap_or(NO_METRIC)))?,
    };
    Some(best.name.clone())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use serde_json::json;

    use super::*;

    fn iface(name: &str, metric: Option<i64>, weight: Option<i64>, v4: Option<InterfaceStatus>) -> InterfaceInfo {
        InterfaceInfo {
            name: name.into(),
            metric,
            weight,
            status_v4: v4,
            status_v6: None,
            modem: None,
        }
    }

    fn map(entries: Vec<InterfaceInfo>) -> BTreeMap<String, InterfaceInfo> {
        entries.into_iter().map(|i| (i.name.clone(), i)).collect()
    }

    #[test]
    fn status_parses_lenient_values() {
        assert_eq!(
            InterfaceStatus::from_value(&json!(0)),
            Some(InterfaceStatus::Online)
        );
        assert_eq!(
            InterfaceStatus::from_value(&json!(true)),
            Some(InterfaceStatus::Online)
        );
        assert_eq!(
            InterfaceStatus::from_value(&json!("down")),
            Some(InterfaceStatus::Offline)
        );
        assert_eq!(
            InterfaceStatus::from_value(&json!("2")),
            Some(InterfaceStatus::Error)
        );
        assert_eq!(InterfaceStatus::from_value(&json!(null)), None);
    }

    #[test]
    fn is_online_prefers_requested_stack() {
        let mut info = iface("wan", None, None, Some(InterfaceStatus::Online));
        info.status_v6 = Some(InterfaceStatus::Offline);
        assert!(info.is_online(false));
        assert!(!info.is_online(true));

        // Only v6 known: used regardless of preference.
        let mut v6_only = iface("wwan", None, None, None);
        v6_only.status_v6 = Some(InterfaceStatus::Online);
        assert!(v6_only.is_online(false));

        // No information at all reads as offline.
        assert!(!iface("tethering", None, None, None).is_online(false));
    }

    #[test]
    fn failover_picks_lowest_metric_online() {
        let interfaces = map(vec![
            iface("wan", Some(1), None, Some(InterfaceStatus::Offline)),
            iface("wwan", Some(2), None, Some(InterfaceStatus::Online)),
            iface("modem_0001", Some(3), None, Some(InterfaceStatus::Online)),
        ]);
        let primary = select_primary(&interfaces, MultiWanMode::Failover, false);
        assert_eq!(primary.as_deref(), Some("wwan"));
    }

    #[test]
    fn balancing_picks_highest_weight() {
        let interfaces = map(vec![
            iface("wan", Some(1), Some(2), Some(InterfaceStatus::Online)),
            iface("secondwan", Some(2), Some(5), Some(InterfaceStatus::Online)),
        ]);
        let primary = select_primary(&interfaces, MultiWanMode::LoadBalancing, false);
        assert_eq!(primary.as_deref(), Some("secondwan"));
    }

    #[test]
    fn no_online_interface_means_no_primary() {
        let interfaces = map(vec![iface(
            "wan",
            Some(1),
            None,
            Some(InterfaceStatus::Offline),
        )]);
        assert_eq!(select_primary(&interfaces, MultiWanMode::Failover, false), None);
    }
}
