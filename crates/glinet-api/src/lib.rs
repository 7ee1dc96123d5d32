// glinet-api: Async Rust client for the GL.iNet router firmware v4 JSON-RPC API

pub mod error;
pub mod rpc;
pub mod session;
pub mod transport;
pub mod version;

pub use error::Error;
pub use rpc::GlinetClient;
pub use session::SessionManager;
pub use transport::{TlsMode, TransportConfig};
pub use version::{InvalidVersion, NEW_VPN_CLIENT_VERSION, Version};
