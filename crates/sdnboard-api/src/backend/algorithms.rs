// Backend algorithm configuration endpoints
//
// Balancing and routing algorithm names are opaque strings to this
// client; the backend validates them.

use tracing::debug;

use crate::backend::client::BackendClient;
use crate::backend::models::{
    AlgorithmConfigDto, BalancingBody, MessageEnvelope, RoutingBody, WeightsBody,
};
use crate::error::Error;

impl BackendClient {
    /// `GET /config/current`
    pub async fn get_algorithm_config(&self) -> Result<AlgorithmConfigDto, Error> {
        let url = self.api_url("config/current")?;
        self.get(url).await
    }

    /// `GET /config/history`
    pub async fn get_algorithm_history(&self) -> Result<Vec<AlgorithmConfigDto>, Error> {
        let url = self.api_url("config/history")?;
        self.get(url).await
    }

    /// `POST /config/balanceo`
    pub async fn set_balancing_algorithm(&self, algorithm: &str) -> Result<String, Error> {
        let url = self.api_url("config/balanceo")?;
        debug!(algorithm, "setting balancing algorithm");
        let envelope: MessageEnvelope = self.post(url, &BalancingBody { algorithm }).await?;
        Ok(Self::message_of(envelope, "balancing algorithm saved"))
    }

    /// `POST /config/enrutamiento`
    pub async fn set_routing_algorithm(&self, algorithm: &str) -> Result<String, Error> {
        let url = self.api_url("config/enrutamiento")?;
        debug!(algorithm, "setting routing algorithm");
        let envelope: MessageEnvelope = self.post(url, &RoutingBody { algorithm }).await?;
        Ok(Self::message_of(envelope, "routing algorithm saved"))
    }

    /// Store per-server weights for weighted round robin.
    ///
    /// `POST /config/weights`
    pub async fn set_server_weights(&self, weights: &WeightsBody) -> Result<String, Error> {
        let url = self.api_url("config/weights")?;
        debug!(count = weights.len(), "saving server weights");
        let envelope: MessageEnvelope = self.post(url, weights).await?;
        Ok(Self::message_of(envelope, "weights saved"))
    }
}
