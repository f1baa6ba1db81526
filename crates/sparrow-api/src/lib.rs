// sparrow-api: Async Rust client for the Blues Notehub HTTP API

pub mod client;
pub mod devices;
pub mod error;
pub mod events;
pub mod models;
pub mod node_config;
pub mod transport;

pub use client::NotehubClient;
pub use error::Error;
pub use node_config::{ConfigPayload, ConfigResponse};
pub use transport::{TlsMode, TransportConfig};
