// Backend path computation endpoint

use tracing::debug;

use crate::backend::client::BackendClient;
use crate::backend::models::{PathPayload, PathRequestBody};
use crate::error::Error;

impl BackendClient {
    /// Compute the path between two hosts, identified by MAC.
    ///
    /// `POST /dijkstra/calculate_path`
    ///
    /// Only the hop list is returned; nothing is installed on the switches.
    pub async fn calculate_path(&self, src_mac: &str, dst_mac: &str) -> Result<PathPayload, Error> {
        let url = self.api_url("dijkstra/calculate_path")?;
        debug!(src_mac, dst_mac, "requesting path");
        self.post(url, &PathRequestBody { src_mac, dst_mac }).await
    }
}
