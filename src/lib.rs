//! VedaRAG: hybrid retrieval backend for personalized Vedic astrology chat.
//!
//! SQLite holds user profiles, chart records, and the retrieval documents
//! synthesized from them; per-user semantic indexes are derived in-memory
//! state, LRU-bounded and rebuildable from the durable rows at any time.
//! `ChartRagService` is the facade over storage, retrieval, chart
//! computation, and answer generation.

pub mod astro;
pub mod config;
pub mod database;
pub mod embeddings;
pub mod errors;
pub mod index;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;
pub mod synthesizer;

#[cfg(test)]
pub mod tests;

pub use config::AppConfig;
pub use errors::*;
pub use rag::ChartRagService;
