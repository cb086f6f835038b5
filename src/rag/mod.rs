//! RAG (Retrieval-Augmented Generation) module
//!
//! End-to-end retrieval for personalized astrology queries:
//! - Query classification into conversation tracks
//! - Semantic retrieval over the user's chart documents
//! - Context assembly with readiness gating
//! - LLM answer generation with chart selection
//!
//! # Examples
//!
//! ```rust,no_run
//! use vedarag::config::AppConfig;
//! use vedarag::rag::ChartRagService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = ChartRagService::new(&config).await?;
//!
//!     let answer = service.answer_query("user-1", "How is my career looking?", &[]).await?;
//!     println!("{}", answer.text);
//!
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod context;
pub mod pipeline;
pub mod retriever;

use std::collections::BTreeMap;

pub use classifier::Classification;
pub use classifier::QueryTrack;
pub use context::ContextAssembler;
pub use context::EnrichedContext;
pub use context::Readiness;
pub use pipeline::AllChartsResponse;
pub use pipeline::ChartAnswer;
pub use pipeline::ChartRagService;
pub use pipeline::ChartSearchResponse;
pub use pipeline::ImportResponse;
pub use pipeline::OnboardingOutcome;
pub use pipeline::StoreChartResponse;
pub use retriever::ChartRetriever;

use crate::models::DocumentMetadata;

/// One retrieved document with its score
#[derive(Debug, Clone, serde::Serialize)]
pub struct RetrievedChunk {
    pub content: String,
    pub metadata: DocumentMetadata,
    pub score: f32,
}

/// Result of a retrieval pass over one user's index.
///
/// `NoData` means the user has no synthesized documents at all, which is a
/// different situation from a query that matched nothing.
#[derive(Debug, Clone)]
pub enum RetrievalOutcome {
    NoData,
    Matches {
        /// Chunks grouped by chart type tag, rank order preserved per group
        charts: BTreeMap<String, Vec<RetrievedChunk>>,
        total: usize,
    },
}

impl RetrievalOutcome {
    /// True when there is nothing usable, whether from missing data or an
    /// empty match set
    pub fn is_empty(&self) -> bool {
        match self {
            RetrievalOutcome::NoData => true,
            RetrievalOutcome::Matches { total, .. } => *total == 0,
        }
    }
}
