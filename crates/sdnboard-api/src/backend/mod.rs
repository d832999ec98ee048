// Backend API client modules
//
// Hand-written client for the Flask backend that owns topology, server,
// client, configuration, statistics, and flow-rule state.

pub mod algorithms;
pub mod client;
pub mod clients;
pub mod models;
pub mod routing;
pub mod rules;
pub mod servers;
pub mod stats;
pub mod topology;

pub use client::BackendClient;
