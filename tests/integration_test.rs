//! Full lifecycle integration test over the public API.
//!
//! Runs entirely offline: in-memory SQLite, the hashed embedding provider,
//! and the deterministic fallback chart generator.

use std::sync::Arc;

use vedarag::astro::ChartComputeService;
use vedarag::config::AppConfig;
use vedarag::config::RetrievalConfig;
use vedarag::database::Database;
use vedarag::embeddings::EmbeddingService;
use vedarag::llm::LlmService;
use vedarag::models::BirthData;
use vedarag::ChartRagService;

async fn offline_service() -> ChartRagService {
    let database = Arc::new(Database::in_memory().await.unwrap());
    let embeddings = Arc::new(EmbeddingService::hashed(256));
    let astro = ChartComputeService::offline();
    let llm = LlmService::new(&AppConfig::default()).unwrap();
    ChartRagService::from_services(database, embeddings, astro, llm, &RetrievalConfig::default())
}

fn birth_data() -> BirthData {
    BirthData {
        name: Some("Asha".to_string()),
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

#[tokio::test]
async fn test_full_user_lifecycle() {
    let service = offline_service().await;

    // 1. Profile with birth data
    let profile = service
        .store_profile("asha", Some("Asha"), Some(&birth_data()))
        .await
        .unwrap();
    assert!(profile.has_birth_data());

    // 2. Onboarding generates and indexes the core chart set
    let outcome = service.onboard_user("asha").await.unwrap();
    assert_eq!(outcome.charts_generated, 5);
    assert!(outcome.degraded);

    let charts = service.get_all_charts("asha").await.unwrap();
    assert_eq!(charts.total_charts, 5);

    // 3. Retrieval finds the relevant houses for a career question
    let search = service
        .get_charts_for_query("asha", "How is my career and profession looking this year?")
        .await
        .unwrap();
    assert_eq!(search.status, "ok");
    assert!(search.total_results > 0);
    assert!(search.charts.contains_key("house-chart"));

    // 4. Repeated import is a no-op once documents exist
    let import = service.import_existing_charts("asha").await.unwrap();
    assert_eq!(import.imported_count, 0);

    // 5. Contacts ride along for compatibility questions
    service
        .store_contact("asha", "Ravi", None, Some("partner"), Some(&birth_data()))
        .await
        .unwrap();
    assert_eq!(service.get_contacts("asha").await.unwrap().len(), 1);

    // 6. Stats see everything
    let stats = service.stats().await.unwrap();
    assert_eq!(stats.store.profiles, 1);
    assert_eq!(stats.store.charts, 5);
    assert_eq!(stats.store.contacts, 1);

    // 7. Deletion wipes the account
    service.delete_user_data("asha").await.unwrap();
    let stats = service.stats().await.unwrap();
    assert_eq!(stats.store.profiles, 0);
    assert_eq!(stats.store.charts, 0);
    assert_eq!(stats.store.documents, 0);
    assert_eq!(stats.store.contacts, 0);
}

#[tokio::test]
async fn test_retrieval_survives_index_eviction() {
    let service = offline_service().await;
    service
        .store_profile("asha", None, Some(&birth_data()))
        .await
        .unwrap();
    service.onboard_user("asha").await.unwrap();

    let before = service
        .get_charts_for_query("asha", "marriage and partnerships")
        .await
        .unwrap();
    service.index().invalidate("asha").await;
    let after = service
        .get_charts_for_query("asha", "marriage and partnerships")
        .await
        .unwrap();

    assert_eq!(before.total_results, after.total_results);
    assert_eq!(
        before.charts.keys().collect::<Vec<_>>(),
        after.charts.keys().collect::<Vec<_>>()
    );
}
