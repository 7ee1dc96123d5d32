// RPC client modules
//
// Hand-written client for the GL.iNet firmware v4 JSON-RPC API. Every
// call is a POST to `{base}/rpc` wrapped in a JSON-RPC 2.0 envelope;
// authenticated calls carry the sid as the first params element. The
// endpoint surface is split per firmware module area.

pub mod client;
pub mod clients;
pub mod models;
pub mod modem;
pub mod system;
pub mod vpn;
pub mod wan;
pub mod wifi;

pub use client::GlinetClient;
