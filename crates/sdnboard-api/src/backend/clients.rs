// Backend multicast client endpoints
//
// The backend only tracks and assigns clients; actually launching the
// player happens on the emulation agent (see `agent`).

use crate::backend::client::BackendClient;
use crate::backend::models::{
    ActiveClientDto, ActiveClientsPayload, HostCatalogPayload, StreamInfoDto,
};
use crate::error::Error;

impl BackendClient {
    /// List hosts currently consuming a multicast stream.
    ///
    /// `GET /client/active_clients`
    pub async fn list_active_clients(&self) -> Result<Vec<ActiveClientDto>, Error> {
        let url = self.api_url("client/active_clients")?;
        let payload: ActiveClientsPayload = self.get(url).await?;
        Ok(payload.active_clients)
    }

    /// Ask the backend which server a new client should join.
    ///
    /// `GET /client/get_multicast_stream_info`
    ///
    /// Answers 503 with an `{error}` body when no server is active.
    pub async fn get_stream_assignment(&self) -> Result<StreamInfoDto, Error> {
        let url = self.api_url("client/get_multicast_stream_info")?;
        self.get(url).await
    }

    /// List every emulated host name known to the backend.
    ///
    /// `GET /client/hosts`
    pub async fn list_host_names(&self) -> Result<Vec<String>, Error> {
        let url = self.api_url("client/hosts")?;
        let payload: HostCatalogPayload = self.get(url).await?;
        Ok(payload.hosts.into_iter().map(|h| h.name).collect())
    }
}
