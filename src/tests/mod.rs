pub mod service_tests;

use std::sync::Arc;

use crate::astro::ChartComputeService;
use crate::config::AppConfig;
use crate::config::RetrievalConfig;
use crate::database::Database;
use crate::embeddings::EmbeddingService;
use crate::llm::LlmService;
use crate::models::BirthData;
use crate::rag::ChartRagService;
use crate::Result;

/// Embedding dimension used by the offline test provider
pub const TEST_EMBEDDING_DIM: usize = 256;

/// Build a fully offline service: in-memory SQLite, hashed embeddings, no
/// upstream chart API. The LLM client is wired but never reached by these
/// tests.
pub async fn create_test_service() -> Result<ChartRagService> {
    create_test_service_with(RetrievalConfig::default()).await
}

/// Same as `create_test_service` but with custom retrieval settings
pub async fn create_test_service_with(retrieval: RetrievalConfig) -> Result<ChartRagService> {
    let database = Arc::new(Database::in_memory().await?);
    let embeddings = Arc::new(EmbeddingService::hashed(TEST_EMBEDDING_DIM));
    let astro = ChartComputeService::offline();
    let llm = LlmService::new(&AppConfig::default())?;
    Ok(ChartRagService::from_services(
        database, embeddings, astro, llm, &retrieval,
    ))
}

/// A fixed birth record shared across tests
pub fn test_birth_data() -> BirthData {
    BirthData {
        name: Some("Test User".to_string()),
        year: 1990,
        month: 5,
        day: 12,
        hour: 14,
        minute: 30,
        place_of_birth: Some("Mumbai, India".to_string()),
        latitude: 19.07,
        longitude: 72.88,
        timezone: 5.5,
    }
}
