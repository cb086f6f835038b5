//! End-to-end service facade.
//!
//! `ChartRagService` owns every component and exposes the boundary
//! operations: profile and chart CRUD, idempotent import, retrieval, and
//! the conversational answer path.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::classifier;
use super::classifier::QueryTrack;
use super::context::ContextAssembler;
use super::context::Readiness;
use super::context::INCOMPLETE_CHART_MESSAGE;
use super::context::NO_BIRTH_DATA_MESSAGE;
use super::retriever::ChartRetriever;
use super::RetrievalOutcome;
use super::RetrievedChunk;
use crate::astro::ChartComputeService;
use crate::database::Database;
use crate::database::StoreStats;
use crate::embeddings::EmbeddingService;
use crate::index::IndexService;
use crate::llm::tools;
use crate::llm::AstrologyPrompts;
use crate::llm::ChartSelection;
use crate::llm::ChatMessage;
use crate::llm::LlmService;
use crate::models::BirthData;
use crate::models::ChartPayload;
use crate::models::ChartType;
use crate::models::Contact;
use crate::models::UserProfile;
use crate::synthesizer;
use crate::Result;

/// Fixed reply when the model itself fails
const MODEL_ERROR_MESSAGE: &str =
    "I apologize, but I encountered an error processing your request. Please try again.";

/// Result of storing one chart
#[derive(Debug, Clone, Serialize)]
pub struct StoreChartResponse {
    pub chart_type: String,
    pub document_count: usize,
    pub degraded: bool,
}

/// Result of a retrieval query
#[derive(Debug, Clone, Serialize)]
pub struct ChartSearchResponse {
    pub charts: std::collections::BTreeMap<String, Vec<RetrievedChunk>>,
    pub total_results: usize,
    /// "ok" or "no-data"
    pub status: &'static str,
}

/// One stored chart record in a listing
#[derive(Debug, Clone, Serialize)]
pub struct ChartSummary {
    pub id: i64,
    pub chart_type: String,
    pub degraded: bool,
    pub payload: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Full chart history for a user, grouped by type with the newest record
/// first in each group
#[derive(Debug, Clone, Serialize)]
pub struct AllChartsResponse {
    pub charts: std::collections::BTreeMap<String, Vec<ChartSummary>>,
    pub total_charts: usize,
}

/// Result of an import pass
#[derive(Debug, Clone, Serialize)]
pub struct ImportResponse {
    pub imported_count: usize,
}

/// Result of onboarding a user
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingOutcome {
    pub charts_generated: usize,
    pub degraded: bool,
    pub documents_imported: usize,
}

/// A conversational answer
#[derive(Debug, Clone, Serialize)]
pub struct ChartAnswer {
    pub text: String,
    pub track: QueryTrack,
    pub confidence: f32,
    /// True when any chart backing the answer came from the fallback
    pub degraded: bool,
}

/// Service-level statistics
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    pub store: StoreStats,
    pub cached_indexes: usize,
}

/// The service facade
pub struct ChartRagService {
    database: Arc<Database>,
    index: Arc<IndexService>,
    retriever: ChartRetriever,
    assembler: ContextAssembler,
    llm: LlmService,
    astro: ChartComputeService,
    top_k: usize,
}

impl ChartRagService {
    /// Create a fully wired service from configuration
    pub async fn new(config: &crate::config::AppConfig) -> Result<Self> {
        let database = Arc::new(Database::from_config(config).await?);
        let embeddings = Arc::new(EmbeddingService::new(config)?);
        let astro = ChartComputeService::new(config)?;
        let llm = LlmService::new(config)?;
        Ok(Self::from_services(
            database,
            embeddings,
            astro,
            llm,
            &config.retrieval,
        ))
    }

    /// Wire a service from pre-built components
    pub fn from_services(
        database: Arc<Database>,
        embeddings: Arc<EmbeddingService>,
        astro: ChartComputeService,
        llm: LlmService,
        retrieval: &crate::config::RetrievalConfig,
    ) -> Self {
        let index = Arc::new(IndexService::new(
            database.clone(),
            embeddings,
            retrieval.index_cache_capacity,
        ));
        let retriever = ChartRetriever::new(index.clone());
        let assembler = ContextAssembler::new(database.clone(), retrieval.max_context_length);
        Self {
            database,
            index,
            retriever,
            assembler,
            llm,
            astro,
            top_k: retrieval.top_k,
        }
    }

    /// Underlying database handle
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// The index cache manager
    pub fn index(&self) -> &IndexService {
        &self.index
    }

    // ---- Profiles ----

    /// Create or update a profile
    pub async fn store_profile(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        birth_data: Option<&BirthData>,
    ) -> Result<UserProfile> {
        self.database
            .upsert_profile(user_id, display_name, birth_data)
            .await
    }

    /// Fetch a profile
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        self.database.get_profile(user_id).await
    }

    // ---- Charts ----

    /// Store one chart and regenerate its document set.
    ///
    /// History is append-only: the new record joins any earlier ones of the
    /// same type and becomes authoritative. The (user, type) document set
    /// is replaced from it, then the user's cached index is dropped so the
    /// next search rebuilds from the durable rows.
    pub async fn store_chart(
        &self,
        user_id: &str,
        chart_type: &ChartType,
        payload: &ChartPayload,
        degraded: bool,
    ) -> Result<StoreChartResponse> {
        let record = self
            .database
            .insert_chart(user_id, chart_type, payload, degraded)
            .await?;

        let documents = synthesizer::synthesize(&record)?;
        let document_count = self
            .database
            .replace_documents(user_id, chart_type, &documents)
            .await?;
        self.index.invalidate(user_id).await;

        tracing::info!(
            "Stored chart {} for user {}: {} documents",
            chart_type,
            user_id,
            document_count
        );

        Ok(StoreChartResponse {
            chart_type: chart_type.as_str().to_string(),
            document_count,
            degraded,
        })
    }

    /// Retrieve chart chunks relevant to a query
    pub async fn get_charts_for_query(
        &self,
        user_id: &str,
        query: &str,
    ) -> Result<ChartSearchResponse> {
        match self
            .retriever
            .retrieve_relevant(user_id, query, self.top_k)
            .await?
        {
            RetrievalOutcome::NoData => Ok(ChartSearchResponse {
                charts: std::collections::BTreeMap::new(),
                total_results: 0,
                status: "no-data",
            }),
            RetrievalOutcome::Matches { charts, total } => Ok(ChartSearchResponse {
                charts,
                total_results: total,
                status: "ok",
            }),
        }
    }

    /// List the full chart history for a user, grouped by type.
    /// `list_charts` returns newest first, so each group is newest first too.
    pub async fn get_all_charts(&self, user_id: &str) -> Result<AllChartsResponse> {
        let records = self.database.list_charts(user_id).await?;
        let total_charts = records.len();
        let mut charts: std::collections::BTreeMap<String, Vec<ChartSummary>> =
            std::collections::BTreeMap::new();
        for record in &records {
            charts
                .entry(record.chart_type.as_str().to_string())
                .or_default()
                .push(ChartSummary {
                    id: record.id,
                    chart_type: record.chart_type.as_str().to_string(),
                    degraded: record.degraded,
                    payload: record.payload.to_value()?,
                    created_at: record.created_at,
                });
        }
        Ok(AllChartsResponse {
            charts,
            total_charts,
        })
    }

    /// Whether the user has any charts stored
    pub async fn has_charts(&self, user_id: &str) -> Result<bool> {
        self.database.has_charts(user_id).await
    }

    /// Synthesize documents for charts that have none yet.
    ///
    /// Idempotent: chart types that already have documents are skipped, so a
    /// second call imports nothing. Only zero-document types are touched, so
    /// the new documents can be appended straight into a warm cached index
    /// without duplicating anything already embedded there.
    pub async fn import_existing_charts(&self, user_id: &str) -> Result<ImportResponse> {
        let records = self.database.latest_charts(user_id).await?;
        let mut imported_count = 0;

        for record in &records {
            let existing = self
                .database
                .count_documents(user_id, &record.chart_type)
                .await?;
            if existing > 0 {
                continue;
            }
            let documents = synthesizer::synthesize(record)?;
            self.database
                .replace_documents(user_id, &record.chart_type, &documents)
                .await?;
            self.index.append_documents(user_id, &documents).await?;
            imported_count += 1;
        }

        if imported_count > 0 {
            tracing::info!(
                "Imported documents for {} chart types for user {}",
                imported_count,
                user_id
            );
        }

        Ok(ImportResponse { imported_count })
    }

    /// Delete everything stored for a user: documents, charts, contacts,
    /// profile, and the cached index
    pub async fn delete_user_data(&self, user_id: &str) -> Result<()> {
        self.database.delete_documents(user_id).await?;
        self.database.delete_charts(user_id).await?;
        self.database.delete_contacts(user_id).await?;
        self.database.delete_profile(user_id).await?;
        self.index.invalidate(user_id).await;
        tracing::info!("Deleted all data for user {}", user_id);
        Ok(())
    }

    // ---- Contacts ----

    /// Create or update a contact
    pub async fn store_contact(
        &self,
        user_id: &str,
        contact_name: &str,
        contact_user_id: Option<&str>,
        relationship_type: Option<&str>,
        birth_data: Option<&BirthData>,
    ) -> Result<Contact> {
        self.database
            .upsert_contact(
                user_id,
                contact_name,
                contact_user_id,
                relationship_type,
                birth_data,
            )
            .await
    }

    /// List a user's contacts
    pub async fn get_contacts(&self, user_id: &str) -> Result<Vec<Contact>> {
        self.database.list_contacts(user_id).await
    }

    /// Attach computed chart payloads to a saved contact
    pub async fn update_contact_chart_data(
        &self,
        user_id: &str,
        contact_name: &str,
        chart_data: &serde_json::Value,
    ) -> Result<Contact> {
        self.database
            .update_contact_chart_data(user_id, contact_name, chart_data)
            .await
    }

    /// Fetch one contact by name
    pub async fn get_contact_by_name(
        &self,
        user_id: &str,
        contact_name: &str,
    ) -> Result<Option<Contact>> {
        self.database.get_contact(user_id, contact_name).await
    }

    // ---- Onboarding ----

    /// Generate and store the core chart set for a user who has birth data
    /// but no charts yet, then make sure every chart is indexed.
    pub async fn onboard_user(&self, user_id: &str) -> Result<OnboardingOutcome> {
        let profile = self
            .database
            .get_profile(user_id)
            .await?
            .ok_or_else(|| crate::VedaRagError::ProfileNotFound(user_id.to_string()))?;

        let mut charts_generated = 0;
        let mut degraded = false;

        if let Some(birth) = &profile.birth_data {
            if !self.database.has_charts(user_id).await? {
                let results = self.astro.generate_all(birth).await?;
                for (chart_type, computed) in results {
                    let is_degraded = computed.is_degraded();
                    degraded |= is_degraded;
                    let payload = computed.into_inner();
                    self.store_chart(user_id, &chart_type, &payload, is_degraded)
                        .await?;
                    charts_generated += 1;
                }
            }
        }

        let import = self.import_existing_charts(user_id).await?;

        Ok(OnboardingOutcome {
            charts_generated,
            degraded,
            documents_imported: import.imported_count,
        })
    }

    // ---- Conversation ----

    /// Answer a query against the user's charts.
    ///
    /// Readiness gates run first; a ready user gets retrieval plus an LLM
    /// turn with the chart-selection tool. Model failures produce a fixed
    /// apologetic answer instead of an error.
    pub async fn answer_query(
        &self,
        user_id: &str,
        query: &str,
        history: &[ChatMessage],
    ) -> Result<ChartAnswer> {
        let classification = classifier::classify(query);
        let context = self.assembler.build(user_id).await?;
        let degraded = self.database.has_degraded_charts(user_id).await?;

        match context.readiness() {
            Readiness::NoBirthData => {
                return Ok(ChartAnswer {
                    text: NO_BIRTH_DATA_MESSAGE.to_string(),
                    track: classification.track,
                    confidence: 0.5,
                    degraded: false,
                });
            }
            Readiness::IncompleteChartData => {
                return Ok(ChartAnswer {
                    text: INCOMPLETE_CHART_MESSAGE.to_string(),
                    track: classification.track,
                    confidence: 0.5,
                    degraded,
                });
            }
            Readiness::Ready => {}
        }

        let outcome = self
            .retriever
            .retrieve_relevant(user_id, query, self.top_k)
            .await?;
        let rendered = self.assembler.render(&context, &outcome)?;

        let system = AstrologyPrompts::system().render(&HashMap::from([
            ("track".to_string(), format!("{:?}", classification.track)),
            ("context".to_string(), rendered),
        ]));

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system));
        messages.extend(history.iter().cloned());
        messages.push(ChatMessage::user(query));

        let tool_specs = [tools::select_relevant_charts()];

        let turn = match self.llm.complete(&messages, &tool_specs).await {
            Ok(turn) => turn,
            Err(e) => {
                tracing::error!("Model error answering query for {}: {}", user_id, e);
                return Ok(ChartAnswer {
                    text: MODEL_ERROR_MESSAGE.to_string(),
                    track: classification.track,
                    confidence: 0.2,
                    degraded,
                });
            }
        };

        // A tool call without text gets one follow-up turn carrying the
        // selected charts' documents
        let text = match (turn.content, turn.tool_call) {
            (Some(text), _) => text,
            (None, Some(call)) => {
                match self
                    .follow_up_with_selection(user_id, &call, messages)
                    .await
                {
                    Ok(Some(text)) => text,
                    Ok(None) | Err(_) => MODEL_ERROR_MESSAGE.to_string(),
                }
            }
            (None, None) => MODEL_ERROR_MESSAGE.to_string(),
        };

        let confidence = if text == MODEL_ERROR_MESSAGE { 0.2 } else { 0.9 };

        Ok(ChartAnswer {
            text,
            track: classification.track,
            confidence,
            degraded,
        })
    }

    async fn follow_up_with_selection(
        &self,
        user_id: &str,
        call: &crate::llm::ToolCall,
        mut messages: Vec<ChatMessage>,
    ) -> Result<Option<String>> {
        let selection = ChartSelection::from_tool_call(call)?;
        tracing::debug!(
            "Model selected charts {:?}: {}",
            selection.chart_types,
            selection.reasoning
        );

        let selected = selection.chart_types();
        let documents = self.database.list_documents(user_id).await?;
        let mut chart_text = String::new();
        for doc in documents
            .iter()
            .filter(|d| selected.contains(&d.chart_type))
        {
            chart_text.push_str(&doc.content);
            chart_text.push_str("\n\n");
        }

        messages.push(ChatMessage::assistant(format!(
            "Selected charts: {}",
            selection.chart_types.join(", ")
        )));
        messages.push(ChatMessage::user(format!(
            "Here is the selected chart data:\n{chart_text}\nNow answer the original question."
        )));

        // No tools on the retry so the model must produce text
        let turn = self.llm.complete(&messages, &[]).await?;
        Ok(turn.content)
    }

    /// Service statistics
    pub async fn stats(&self) -> Result<ServiceStats> {
        Ok(ServiceStats {
            store: self.database.stats().await?,
            cached_indexes: self.index.cached_indexes().await,
        })
    }
}
