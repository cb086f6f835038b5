//! Chart computation boundary.
//!
//! Charts come from an upstream computation API when credentials are
//! configured and it responds; otherwise the deterministic fallback
//! generator steps in and the result is marked `Computed::Degraded`.

pub mod client;
pub mod fallback;

pub use client::ChartComputeClient;

use crate::errors::Result;
use crate::errors::VedaRagError;
use crate::models::BirthData;
use crate::models::ChartPayload;
use crate::models::ChartType;
use crate::models::Computed;

/// Chart computation with per-type fallback
pub struct ChartComputeService {
    client: Option<ChartComputeClient>,
}

impl ChartComputeService {
    /// Create a service from configuration. Missing credentials disable the
    /// upstream client and route everything through the fallback.
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        let client = if config.chart_api.api_key.is_empty() || config.chart_api.user_id.is_empty()
        {
            tracing::warn!("Chart API credentials not configured, using fallback charts only");
            None
        } else {
            Some(ChartComputeClient::new(&config.chart_api)?)
        };
        Ok(Self { client })
    }

    /// Service that never calls upstream, used by tests
    #[must_use]
    pub fn offline() -> Self {
        Self { client: None }
    }

    /// Compute one chart, falling back to the deterministic generator on any
    /// upstream failure
    pub async fn compute_or_fallback(
        &self,
        chart_type: &ChartType,
        birth: &BirthData,
    ) -> Computed<ChartPayload> {
        if let Some(client) = &self.client {
            match client.compute(chart_type, birth).await {
                Ok(payload) => return Computed::Fresh(payload),
                Err(e) => {
                    tracing::warn!(
                        "Chart computation failed for {}, using fallback: {}",
                        chart_type,
                        e
                    );
                }
            }
        }
        Computed::Degraded(fallback::generate(chart_type, birth))
    }

    /// Compute the full core chart set concurrently.
    ///
    /// Succeeds when at least one chart was produced. With the fallback in
    /// place every type yields a payload, so failure here means the core set
    /// itself was empty.
    pub async fn generate_all(
        &self,
        birth: &BirthData,
    ) -> Result<Vec<(ChartType, Computed<ChartPayload>)>> {
        let chart_types = ChartType::all_computed();
        let computations = chart_types
            .iter()
            .map(|chart_type| async move {
                (
                    chart_type.clone(),
                    self.compute_or_fallback(chart_type, birth).await,
                )
            })
            .collect::<Vec<_>>();

        let results = futures::future::join_all(computations).await;
        if results.is_empty() {
            return Err(VedaRagError::ChartComputation(
                "No charts could be computed".to_string(),
            ));
        }
        Ok(results)
    }
}
