//! Service-level tests against an in-memory store.
//!
//! Everything here runs fully offline: SQLite in memory, the hashed
//! embedding provider, and the fallback chart generator. Paths that would
//! reach the chat model are not exercised past their readiness gates.

#[cfg(test)]
mod service_tests {
    use crate::astro::fallback;
    use crate::config::RetrievalConfig;
    use crate::models::ChartType;
    use crate::rag::context::INCOMPLETE_CHART_MESSAGE;
    use crate::rag::context::NO_BIRTH_DATA_MESSAGE;
    use crate::tests::create_test_service;
    use crate::tests::create_test_service_with;
    use crate::tests::test_birth_data;

    // ====== Profile Tests ======

    #[tokio::test]
    async fn test_profile_upsert_and_fetch() {
        let service = create_test_service().await.unwrap();
        let birth = test_birth_data();

        let profile = service
            .store_profile("user-1", Some("Asha"), Some(&birth))
            .await
            .unwrap();
        assert_eq!(profile.user_id, "user-1");
        assert!(profile.has_birth_data());

        // Second upsert updates in place
        let updated = service
            .store_profile("user-1", Some("Asha K"), Some(&birth))
            .await
            .unwrap();
        assert_eq!(updated.display_name.as_deref(), Some("Asha K"));

        let fetched = service.get_profile("user-1").await.unwrap().unwrap();
        assert_eq!(fetched.display_name.as_deref(), Some("Asha K"));
        assert_eq!(fetched.birth_data, Some(birth));
    }

    #[tokio::test]
    async fn test_missing_profile_is_none() {
        let service = create_test_service().await.unwrap();
        assert!(service.get_profile("nobody").await.unwrap().is_none());
    }

    // ====== Chart Storage Tests ======

    #[tokio::test]
    async fn test_store_chart_synthesizes_documents() {
        let service = create_test_service().await.unwrap();
        let birth = test_birth_data();

        let payload = fallback::generate(&ChartType::PlanetaryPositions, &birth);
        let response = service
            .store_chart("user-1", &ChartType::PlanetaryPositions, &payload, true)
            .await
            .unwrap();

        // The fallback generator places all nine grahas
        assert_eq!(response.document_count, 9);
        assert!(response.degraded);

        let charts = service.get_all_charts("user-1").await.unwrap();
        assert_eq!(charts.total_charts, 1);
        assert!(charts.charts["planetary-positions"][0].degraded);
    }

    #[tokio::test]
    async fn test_restore_keeps_chart_history() {
        let service = create_test_service().await.unwrap();
        let birth = test_birth_data();

        let first = fallback::generate(&ChartType::BirthDetails, &birth);
        service
            .store_chart("user-1", &ChartType::BirthDetails, &first, true)
            .await
            .unwrap();

        let mut later = birth.clone();
        later.minute = 45;
        let second = fallback::generate(&ChartType::BirthDetails, &later);
        service
            .store_chart("user-1", &ChartType::BirthDetails, &second, false)
            .await
            .unwrap();

        // Both records survive, newest first, and the newest is authoritative
        let charts = service.get_all_charts("user-1").await.unwrap();
        assert_eq!(charts.total_charts, 2);
        let history = &charts.charts["birth-details"];
        assert_eq!(history.len(), 2);
        assert!(history[0].id > history[1].id);
        assert!(!history[0].degraded);
        assert!(history[1].degraded);

        let latest = service
            .database()
            .get_chart("user-1", &ChartType::BirthDetails)
            .await
            .unwrap()
            .unwrap();
        assert!(!latest.degraded);

        // Superseded degraded records no longer mark the user degraded
        assert!(!service
            .database()
            .has_degraded_charts("user-1")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_restore_replaces_document_set() {
        let service = create_test_service().await.unwrap();
        let birth = test_birth_data();

        let payload = fallback::generate(&ChartType::HouseChart, &birth);
        service
            .store_chart("user-1", &ChartType::HouseChart, &payload, false)
            .await
            .unwrap();
        let first = service
            .database()
            .count_documents("user-1", &ChartType::HouseChart)
            .await
            .unwrap();
        assert_eq!(first, 12);

        // Re-storing the same chart type must not accumulate documents
        service
            .store_chart("user-1", &ChartType::HouseChart, &payload, false)
            .await
            .unwrap();
        let second = service
            .database()
            .count_documents("user-1", &ChartType::HouseChart)
            .await
            .unwrap();
        assert_eq!(second, 12);
    }

    #[tokio::test]
    async fn test_unknown_chart_type_stores_and_retrieves() {
        let service = create_test_service().await.unwrap();
        let chart_type = ChartType::from("transit-forecast");
        let payload = crate::models::ChartPayload::Unknown(serde_json::json!({
            "transit": "Saturn return",
            "window": "2026"
        }));

        let response = service
            .store_chart("user-1", &chart_type, &payload, false)
            .await
            .unwrap();
        assert_eq!(response.chart_type, "transit-forecast");
        assert_eq!(response.document_count, 1);

        let search = service
            .get_charts_for_query("user-1", "Saturn return transit")
            .await
            .unwrap();
        assert_eq!(search.status, "ok");
        assert!(search.charts.contains_key("transit-forecast"));
    }

    // ====== Import Tests ======

    #[tokio::test]
    async fn test_import_is_idempotent() {
        let service = create_test_service().await.unwrap();
        let birth = test_birth_data();

        // Chart rows written below the service, so no documents exist yet
        for chart_type in [ChartType::BirthDetails, ChartType::CurrentPeriod] {
            let payload = fallback::generate(&chart_type, &birth);
            service
                .database()
                .insert_chart("user-1", &chart_type, &payload, true)
                .await
                .unwrap();
        }

        let first = service.import_existing_charts("user-1").await.unwrap();
        assert_eq!(first.imported_count, 2);

        let second = service.import_existing_charts("user-1").await.unwrap();
        assert_eq!(second.imported_count, 0);
    }

    #[tokio::test]
    async fn test_import_extends_a_warm_index_in_place() {
        let service = create_test_service().await.unwrap();
        let birth = test_birth_data();

        let payload = fallback::generate(&ChartType::BirthDetails, &birth);
        service
            .store_chart("user-1", &ChartType::BirthDetails, &payload, true)
            .await
            .unwrap();

        // Warm the cache and hold the cached index
        let index = service
            .index()
            .ensure_index("user-1")
            .await
            .unwrap()
            .unwrap();
        let before = index.read().await.len();

        // A chart row written below the service has no documents yet
        let houses = fallback::generate(&ChartType::HouseChart, &birth);
        service
            .database()
            .insert_chart("user-1", &ChartType::HouseChart, &houses, true)
            .await
            .unwrap();

        let import = service.import_existing_charts("user-1").await.unwrap();
        assert_eq!(import.imported_count, 1);

        // The already-cached index picked up the twelve house documents
        let after = index.read().await.len();
        assert_eq!(after, before + 12);

        let search = service
            .get_charts_for_query("user-1", "career and profession")
            .await
            .unwrap();
        assert!(search.charts.contains_key("house-chart"));
    }

    // ====== Onboarding Tests ======

    #[tokio::test]
    async fn test_onboarding_generates_core_set_offline() {
        let service = create_test_service().await.unwrap();
        service
            .store_profile("user-1", Some("Asha"), Some(&test_birth_data()))
            .await
            .unwrap();

        let outcome = service.onboard_user("user-1").await.unwrap();
        assert_eq!(outcome.charts_generated, 5);
        // Offline runs always come from the fallback generator
        assert!(outcome.degraded);
        // store_chart already synthesized documents for every chart
        assert_eq!(outcome.documents_imported, 0);

        let charts = service.get_all_charts("user-1").await.unwrap();
        assert_eq!(charts.total_charts, 5);
        assert!(charts.charts.values().flatten().all(|c| c.degraded));
    }

    #[tokio::test]
    async fn test_onboarding_twice_generates_nothing_new() {
        let service = create_test_service().await.unwrap();
        service
            .store_profile("user-1", None, Some(&test_birth_data()))
            .await
            .unwrap();

        service.onboard_user("user-1").await.unwrap();
        let again = service.onboard_user("user-1").await.unwrap();
        assert_eq!(again.charts_generated, 0);
        assert_eq!(again.documents_imported, 0);
    }

    #[tokio::test]
    async fn test_onboarding_requires_profile() {
        let service = create_test_service().await.unwrap();
        let result = service.onboard_user("ghost").await;
        assert!(matches!(
            result,
            Err(crate::VedaRagError::ProfileNotFound(_))
        ));
    }

    // ====== Retrieval Tests ======

    #[tokio::test]
    async fn test_career_query_surfaces_house_chart() {
        let service = create_test_service().await.unwrap();
        service
            .store_profile("user-1", Some("Asha"), Some(&test_birth_data()))
            .await
            .unwrap();
        service.onboard_user("user-1").await.unwrap();

        let search = service
            .get_charts_for_query("user-1", "How is my career and profession looking?")
            .await
            .unwrap();
        assert_eq!(search.status, "ok");
        assert!(search.total_results > 0);
        // The tenth house document talks about career and profession
        assert!(search.charts.contains_key("house-chart"));
        let house_chunks = &search.charts["house-chart"];
        assert!(house_chunks
            .iter()
            .any(|c| c.content.contains("Career, profession")));
    }

    #[tokio::test]
    async fn test_no_documents_is_distinct_from_zero_matches() {
        let service = create_test_service().await.unwrap();

        // User with no documents at all
        let search = service
            .get_charts_for_query("user-1", "anything")
            .await
            .unwrap();
        assert_eq!(search.status, "no-data");
        assert_eq!(search.total_results, 0);

        // User with documents gets "ok" even for an off-topic query
        let payload = fallback::generate(&ChartType::BirthDetails, &test_birth_data());
        service
            .store_chart("user-1", &ChartType::BirthDetails, &payload, true)
            .await
            .unwrap();
        let search = service
            .get_charts_for_query("user-1", "zzz qqq xyzzy")
            .await
            .unwrap();
        assert_eq!(search.status, "ok");
    }

    #[tokio::test]
    async fn test_rebuilt_index_matches_cached_results() {
        let service = create_test_service().await.unwrap();
        service
            .store_profile("user-1", None, Some(&test_birth_data()))
            .await
            .unwrap();
        service.onboard_user("user-1").await.unwrap();

        let query = "what does my moon sign say";
        let warm = service.get_charts_for_query("user-1", query).await.unwrap();

        // Eviction only drops derived state; the rebuild must reproduce it
        service.index().invalidate("user-1").await;
        let rebuilt = service.get_charts_for_query("user-1", query).await.unwrap();

        let warm_contents: Vec<_> = warm
            .charts
            .values()
            .flatten()
            .map(|c| c.content.clone())
            .collect();
        let rebuilt_contents: Vec<_> = rebuilt
            .charts
            .values()
            .flatten()
            .map(|c| c.content.clone())
            .collect();
        assert_eq!(warm_contents, rebuilt_contents);
    }

    #[tokio::test]
    async fn test_index_cache_is_bounded() {
        let retrieval = RetrievalConfig {
            index_cache_capacity: 2,
            ..RetrievalConfig::default()
        };
        let service = create_test_service_with(retrieval).await.unwrap();

        for user in ["user-1", "user-2", "user-3"] {
            service
                .store_profile(user, None, Some(&test_birth_data()))
                .await
                .unwrap();
            service.onboard_user(user).await.unwrap();
            service
                .get_charts_for_query(user, "career")
                .await
                .unwrap();
        }

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.cached_indexes, 2);
        // Evicted users are still fully queryable from the durable rows
        let search = service
            .get_charts_for_query("user-1", "career")
            .await
            .unwrap();
        assert_eq!(search.status, "ok");
    }

    // ====== Answer Gate Tests ======

    #[tokio::test]
    async fn test_answer_without_birth_data_asks_for_it() {
        let service = create_test_service().await.unwrap();
        let answer = service
            .answer_query("user-1", "what is my sun sign", &[])
            .await
            .unwrap();
        assert_eq!(answer.text, NO_BIRTH_DATA_MESSAGE);
        assert!((answer.confidence - 0.5).abs() < f32::EPSILON);
        assert!(!answer.degraded);
    }

    #[tokio::test]
    async fn test_answer_with_incomplete_charts_prompts_generation() {
        let service = create_test_service().await.unwrap();
        service
            .store_profile("user-1", None, Some(&test_birth_data()))
            .await
            .unwrap();

        let answer = service
            .answer_query("user-1", "what is my sun sign", &[])
            .await
            .unwrap();
        assert_eq!(answer.text, INCOMPLETE_CHART_MESSAGE);
        assert!((answer.confidence - 0.5).abs() < f32::EPSILON);
    }

    // ====== Contact Tests ======

    #[tokio::test]
    async fn test_contact_upsert_defaults_to_friend() {
        let service = create_test_service().await.unwrap();
        let contact = service
            .store_contact("user-1", "Ravi", None, None, None)
            .await
            .unwrap();
        assert_eq!(contact.relationship_type, "friend");
        assert!(contact.contact_user_id.is_none());

        let updated = service
            .store_contact(
                "user-1",
                "Ravi",
                Some("user-2"),
                Some("partner"),
                Some(&test_birth_data()),
            )
            .await
            .unwrap();
        assert_eq!(updated.relationship_type, "partner");
        assert_eq!(updated.contact_user_id.as_deref(), Some("user-2"));
        assert!(updated.birth_data.is_some());
        assert!(updated.updated_at >= updated.created_at);

        let contacts = service.get_contacts("user-1").await.unwrap();
        assert_eq!(contacts.len(), 1);

        let by_name = service
            .get_contact_by_name("user-1", "Ravi")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.relationship_type, "partner");
    }

    #[tokio::test]
    async fn test_contact_chart_data_survives_reupsert() {
        let service = create_test_service().await.unwrap();
        service
            .store_contact("user-1", "Ravi", None, None, None)
            .await
            .unwrap();

        let chart = serde_json::json!({ "sun_sign": "Leo" });
        let contact = service
            .update_contact_chart_data("user-1", "Ravi", &chart)
            .await
            .unwrap();
        assert!(contact.chart_data.is_some());

        // Re-upserting the contact must not wipe the attached chart data
        let again = service
            .store_contact("user-1", "Ravi", None, Some("brother"), None)
            .await
            .unwrap();
        assert!(again.chart_data.is_some());

        let missing = service
            .update_contact_chart_data("user-1", "Nobody", &chart)
            .await;
        assert!(matches!(
            missing,
            Err(crate::VedaRagError::ContactNotFound(_, _))
        ));
    }

    // ====== Deletion Tests ======

    #[tokio::test]
    async fn test_delete_user_data_clears_everything() {
        let service = create_test_service().await.unwrap();
        service
            .store_profile("user-1", Some("Asha"), Some(&test_birth_data()))
            .await
            .unwrap();
        service.onboard_user("user-1").await.unwrap();
        service
            .store_contact("user-1", "Ravi", None, None, None)
            .await
            .unwrap();

        service.delete_user_data("user-1").await.unwrap();

        assert!(service.get_profile("user-1").await.unwrap().is_none());
        assert!(!service.has_charts("user-1").await.unwrap());
        assert!(service.get_contacts("user-1").await.unwrap().is_empty());
        let search = service
            .get_charts_for_query("user-1", "career")
            .await
            .unwrap();
        assert_eq!(search.status, "no-data");
    }

    // ====== Stats Tests ======

    #[tokio::test]
    async fn test_stats_reflect_store_contents() {
        let service = create_test_service().await.unwrap();
        service
            .store_profile("user-1", None, Some(&test_birth_data()))
            .await
            .unwrap();
        service.onboard_user("user-1").await.unwrap();
        service
            .store_contact("user-1", "Ravi", None, None, None)
            .await
            .unwrap();

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.store.profiles, 1);
        assert_eq!(stats.store.charts, 5);
        assert_eq!(stats.store.contacts, 1);
        assert!(stats.store.documents >= 5);
    }
}
