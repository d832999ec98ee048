// Backend statistics endpoints
//
// Display-only data; nothing here feeds back into reconciliation.

use crate::backend::client::BackendClient;
use crate::backend::models::{AlgorithmComparisonDto, EventLogDto, SummaryRowDto};
use crate::error::Error;

impl BackendClient {
    /// Event counts grouped by type.
    ///
    /// `GET /stats/resumen`
    pub async fn get_stats_summary(&self) -> Result<Vec<SummaryRowDto>, Error> {
        let url = self.api_url("stats/resumen")?;
        self.get(url).await
    }

    /// Recent backend events.
    ///
    /// `GET /stats/logs`
    pub async fn get_event_logs(&self) -> Result<Vec<EventLogDto>, Error> {
        let url = self.api_url("stats/logs")?;
        self.get(url).await
    }

    /// Average RTT and jitter per routing algorithm.
    ///
    /// `GET /stats/comparar_algoritmos`
    pub async fn compare_algorithms(&self) -> Result<AlgorithmComparisonDto, Error> {
        let url = self.api_url("stats/comparar_algoritmos")?;
        self.get(url).await
    }
}
