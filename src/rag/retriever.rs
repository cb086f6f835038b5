//! Semantic retrieval over per-user chart documents

use std::collections::BTreeMap;
use std::sync::Arc;

use super::RetrievalOutcome;
use super::RetrievedChunk;
use crate::index::IndexService;
use crate::Result;

/// Retriever over the per-user semantic indexes
pub struct ChartRetriever {
    index: Arc<IndexService>,
}

impl ChartRetriever {
    pub fn new(index: Arc<IndexService>) -> Self {
        Self { index }
    }

    /// Retrieve the top documents for a query, grouped by chart type.
    ///
    /// Returns `NoData` when the user has no documents at all; an empty
    /// match set for a user who does have data comes back as `Matches`
    /// with zero total.
    pub async fn retrieve_relevant(
        &self,
        user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<RetrievalOutcome> {
        let Some(results) = self.index.search(user_id, query, limit).await? else {
            tracing::warn!("No chart data found for user {}", user_id);
            return Ok(RetrievalOutcome::NoData);
        };

        let total = results.len();
        let mut charts: BTreeMap<String, Vec<RetrievedChunk>> = BTreeMap::new();
        for scored in results {
            charts
                .entry(scored.document.chart_type.as_str().to_string())
                .or_default()
                .push(RetrievedChunk {
                    content: scored.document.content,
                    metadata: scored.document.metadata,
                    score: scored.score,
                });
        }

        tracing::debug!(
            "Retrieved {} chunks across {} chart types for user {}",
            total,
            charts.len(),
            user_id
        );

        Ok(RetrievalOutcome::Matches { charts, total })
    }
}
