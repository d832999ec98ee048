// Backend HTTP client
//
// Wraps `reqwest::Client` with URL construction and response decoding for
// the Flask backend. Endpoint groups (topology, servers, clients, ...) are
// implemented as inherent methods in sibling files to keep this module
// focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::backend::models::MessageEnvelope;
use crate::error::Error;
use crate::response::decode_json;
use crate::transport::TransportConfig;

/// Raw HTTP client for the SDN testbed backend.
///
/// Every method returns a typed payload; `{error}` bodies surface as
/// [`Error::Backend`] with the backend's message untouched.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a new backend client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a backend client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL: `{base}/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        decode_json(resp).await
    }

    /// Send a POST request with a JSON body and decode the response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        decode_json(resp).await
    }

    /// Send a PUT request with a JSON body and decode the response.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        decode_json(resp).await
    }

    /// Send a DELETE request, optionally with a JSON body.
    ///
    /// The link endpoint identifies the row through the body rather than
    /// the path, so the body is part of the contract here.
    pub(crate) async fn delete<T: DeserializeOwned>(
        &self,
        url: Url,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<T, Error> {
        debug!("DELETE {}", url);

        let mut builder = self.http.delete(url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await.map_err(Error::Transport)?;

        decode_json(resp).await
    }

    /// Reduce a `{message}` envelope to its message text.
    pub(crate) fn message_of(envelope: MessageEnvelope, fallback: &str) -> String {
        envelope.message.unwrap_or_else(|| fallback.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn api_url_joins_without_double_slashes() {
        let client = BackendClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:5000/").unwrap(),
        );
        let url = client.api_url("/topology/get").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/topology/get");
    }

    #[test]
    fn api_url_keeps_base_path_prefix() {
        let client = BackendClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://lab.example/sdn").unwrap(),
        );
        let url = client.api_url("servers/active_servers").unwrap();
        assert_eq!(url.as_str(), "http://lab.example/sdn/servers/active_servers");
    }
}
