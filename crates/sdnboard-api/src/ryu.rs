// Ryu controller client
//
// Only one endpoint is used: pushing a computed path so the controller
// installs the matching flows. Optional; most deployments let the backend
// do this.

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::backend::models::MessageEnvelope;
use crate::error::Error;
use crate::response::{embedded_error, parse_body, preview};
use crate::transport::TransportConfig;

/// Hop as expected by Ryu's `/add_path`: `[dpid, out_port, in_port]`.
pub type RyuHop = (u64, Option<i64>, Option<i64>);

#[derive(Debug, Serialize)]
struct AddPathBody<'a> {
    src_dpid: u64,
    dst_dpid: u64,
    path: &'a [RyuHop],
}

/// Raw HTTP client for the Ryu REST application.
#[derive(Clone)]
pub struct RyuClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RyuClient {
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url,
        })
    }

    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Install a path between two switches.
    ///
    /// `POST /add_path`
    pub async fn add_path(&self, src_dpid: u64, dst_dpid: u64, path: &[RyuHop]) -> Result<String, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let url = Url::parse(&format!("{base}/add_path"))?;
        debug!("POST {}", url);
        debug!(src_dpid, dst_dpid, hops = path.len(), "installing path");

        let body = AddPathBody {
            src_dpid,
            dst_dpid,
            path,
        };
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        // Ryu apps answer with plain text or JSON depending on the handler.
        let status = resp.status();
        let text = resp.text().await.map_err(Error::Transport)?;
        if let Some(message) = embedded_error(&text) {
            return Err(Error::Backend {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                message: preview(&text).to_owned(),
            });
        }

        let message = parse_body::<MessageEnvelope>(&text)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| match text.trim() {
                "" => "path installed".to_owned(),
                other => preview(other).to_owned(),
            });
        Ok(message)
    }
}
