// Client (station) endpoints
//
// Listing of connected and statically-bound LAN/WLAN clients
// (`clients` and `lan` firmware modules).

use std::collections::HashMap;

use tracing::debug;

use crate::error::Error;
use crate::rpc::client::GlinetClient;
use crate::rpc::models::{ClientEntry, ClientList, StaticBindList, StaticLease};

impl GlinetClient {
    /// All clients the router knows about, online or not.
    ///
    /// `call [clients, get_list]`
    pub async fn clients(&self) -> Result<Vec<ClientEntry>, Error> {
        let list: ClientList = self.call("clients", "get_list").await?;
        Ok(list.clients)
    }

    /// Currently online clients, keyed by MAC address.
    pub async fn connected_clients(&self) -> Result<HashMap<String, ClientEntry>, Error> {
        let clients = self.clients().await?;
        let connected: HashMap<String, ClientEntry> = clients
            .into_iter()
            .filter(|c| c.online)
            .map(|c| (c.mac.clone(), c))
            .collect();
        debug!(count = connected.len(), "online clients");
        Ok(connected)
    }

    /// Static DHCP leases.
    ///
    /// `call [lan, get_static_bind_list]`
    pub async fn static_clients(&self) -> Result<Vec<StaticLease>, Error> {
        let list: StaticBindList = self.call("lan", "get_static_bind_list").await?;
        Ok(list.list)
    }
}
