// Emulation agent client modules
//
// The agent runs next to Mininet and executes commands inside host
// namespaces: launching/stopping video players and streaming ping output.

pub mod client;
pub mod models;
pub mod ping;
pub mod sse;

pub use client::AgentClient;
pub use ping::PingLines;
