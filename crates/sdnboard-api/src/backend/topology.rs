// Backend topology endpoints
//
// Full topology snapshot plus link create/update/delete. Links are keyed
// by the `(id_origen, id_destino)` pair; there is no separate link id.

use tracing::debug;

use crate::backend::client::BackendClient;
use crate::backend::models::{LinkBody, LinkKeyBody, MessageEnvelope, TopologyPayload};
use crate::error::Error;

impl BackendClient {
    /// Fetch switches, hosts, and links in one snapshot.
    ///
    /// `GET /topology/get`
    pub async fn get_topology(&self) -> Result<TopologyPayload, Error> {
        let url = self.api_url("topology/get")?;
        self.get(url).await
    }

    /// Create a link between two switches.
    ///
    /// `POST /topology/enlace`
    pub async fn create_link(&self, source: i64, dest: i64, bandwidth: u32) -> Result<String, Error> {
        let url = self.api_url("topology/enlace")?;
        debug!(source, dest, bandwidth, "creating link");
        let body = LinkBody {
            source,
            dest,
            bandwidth,
        };
        let envelope: MessageEnvelope = self.post(url, &body).await?;
        Ok(Self::message_of(envelope, "link created"))
    }

    /// Change the bandwidth of an existing link.
    ///
    /// `PUT /topology/enlace`
    pub async fn update_link(&self, source: i64, dest: i64, bandwidth: u32) -> Result<String, Error> {
        let url = self.api_url("topology/enlace")?;
        debug!(source, dest, bandwidth, "updating link");
        let body = LinkBody {
            source,
            dest,
            bandwidth,
        };
        let envelope: MessageEnvelope = self.put(url, &body).await?;
        Ok(Self::message_of(envelope, "link updated"))
    }

    /// Remove a link.
    ///
    /// `DELETE /topology/enlace`
    pub async fn delete_link(&self, source: i64, dest: i64) -> Result<String, Error> {
        let url = self.api_url("topology/enlace")?;
        debug!(source, dest, "deleting link");
        let body = LinkKeyBody { source, dest };
        let envelope: MessageEnvelope = self.delete(url, Some(&body)).await?;
        Ok(Self::message_of(envelope, "link deleted"))
    }
}
