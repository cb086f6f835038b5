//! HTTP client for the upstream chart computation API

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::errors::Result;
use crate::errors::VedaRagError;
use crate::models::BirthData;
use crate::models::ChartPayload;
use crate::models::ChartType;

/// Client for the chart computation endpoints
pub struct ChartComputeClient {
    endpoint: String,
    user_id: String,
    api_key: String,
    client: Client,
}

impl ChartComputeClient {
    pub fn new(config: &crate::config::ChartApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            user_id: config.user_id.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    /// Upstream path for each computable chart type
    fn api_path(chart_type: &ChartType) -> Result<&'static str> {
        match chart_type {
            ChartType::BirthDetails => Ok("astro_details"),
            ChartType::PlanetaryPositions => Ok("planets"),
            ChartType::HouseChart => Ok("horo_chart"),
            ChartType::CurrentPeriod => Ok("current_vdasha"),
            ChartType::DoshaAnalysis => Ok("kalsarpa_details"),
            ChartType::Unknown(tag) => Err(VedaRagError::ChartComputation(format!(
                "No upstream endpoint for chart type: {tag}"
            ))),
        }
    }

    /// Compute one chart upstream
    pub async fn compute(
        &self,
        chart_type: &ChartType,
        birth: &BirthData,
    ) -> Result<ChartPayload> {
        #[derive(Serialize)]
        struct ChartRequest {
            day: u32,
            month: u32,
            year: i32,
            hour: u32,
            min: u32,
            lat: f64,
            lon: f64,
            tzone: f64,
        }

        let path = Self::api_path(chart_type)?;
        let url = format!("{}/{path}", self.endpoint);
        debug!("Calling chart computation API: {}", url);

        let request = ChartRequest {
            day: birth.day,
            month: birth.month,
            year: birth.year,
            hour: birth.hour,
            min: birth.minute,
            lat: birth.latitude,
            lon: birth.longitude,
            tzone: birth.timezone,
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.user_id, Some(&self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(VedaRagError::ChartComputation(format!(
                "Chart API error ({status}): {error_text}"
            )));
        }

        let raw: serde_json::Value = response.json().await.map_err(|e| {
            VedaRagError::ChartComputation(format!("Failed to parse response: {e}"))
        })?;

        Ok(ChartPayload::from_stored(chart_type, raw))
    }
}
