// Backend multicast server endpoints

use tracing::debug;

use crate::backend::client::BackendClient;
use crate::backend::models::{
    ActiveServerDto, HostNameBody, MessageEnvelope, ServerStartedDto, StartServerBody,
};
use crate::error::Error;

impl BackendClient {
    /// List hosts currently streaming as multicast servers.
    ///
    /// `GET /servers/active_servers`
    pub async fn list_active_servers(&self) -> Result<Vec<ActiveServerDto>, Error> {
        let url = self.api_url("servers/active_servers")?;
        self.get(url).await
    }

    /// Start a multicast video server on `host_name`.
    ///
    /// `POST /servers/add`
    ///
    /// The backend allocates the multicast group and returns it.
    pub async fn start_server(
        &self,
        host_name: &str,
        video_path: &str,
        weight: u32,
    ) -> Result<ServerStartedDto, Error> {
        let url = self.api_url("servers/add")?;
        debug!(host_name, video_path, weight, "starting server");
        let body = StartServerBody {
            host_name,
            video_path,
            server_weight: weight,
        };
        self.post(url, &body).await
    }

    /// Stop the server role on `host_name`.
    ///
    /// `POST /servers/remove`
    pub async fn stop_server(&self, host_name: &str) -> Result<String, Error> {
        let url = self.api_url("servers/remove")?;
        debug!(host_name, "stopping server");
        let envelope: MessageEnvelope = self.post(url, &HostNameBody { host_name }).await?;
        Ok(Self::message_of(envelope, "server stopped"))
    }
}
