// sdnboard-api: Async Rust client for the SDN testbed backend, emulation agent, and Ryu

pub mod agent;
pub mod backend;
pub mod error;
mod response;
pub mod ryu;
pub mod transport;

pub use agent::{AgentClient, PingLines};
pub use backend::BackendClient;
pub use error::Error;
pub use ryu::RyuClient;
pub use transport::TransportConfig;
