//! Per-user in-memory semantic indexes.
//!
//! Indexes are derived state: they are rebuilt on demand from the
//! chart_documents table and can be evicted at any time. The cache is
//! LRU-bounded so a long-running process serving many users holds a fixed
//! number of indexes in memory.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::Mutex;
use tokio::sync::RwLock;

use crate::database::Database;
use crate::embeddings::EmbeddingService;
use crate::models::ChartDocument;
use crate::Result;

/// Cosine similarity between two vectors of equal length
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// A document with its score from one search
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: ChartDocument,
    pub score: f32,
}

/// An in-memory vector index over one user's synthesized documents
pub struct SemanticIndex {
    entries: Vec<(ChartDocument, Vec<f32>)>,
}

impl SemanticIndex {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add one embedded document
    pub fn add(&mut self, document: ChartDocument, vector: Vec<f32>) {
        self.entries.push((document, vector));
    }

    /// Top-k cosine search. Sort is stable so equal scores keep insertion
    /// order, which keeps results deterministic.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<ScoredDocument> {
        let mut scored: Vec<ScoredDocument> = self
            .entries
            .iter()
            .map(|(document, vector)| ScoredDocument {
                document: document.clone(),
                score: cosine_similarity(query, vector),
            })
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        scored
    }
}

impl Default for SemanticIndex {
    fn default() -> Self {
        Self::new()
    }
}

type SharedIndex = Arc<RwLock<SemanticIndex>>;

/// Manages the per-user index cache and its rebuilds.
///
/// The cache mutex is held only to look up or insert a slot, never across an
/// embedding call. Concurrent rebuilds for the same user are allowed; both
/// produce the same index from the same durable rows, last writer wins.
pub struct IndexService {
    database: Arc<Database>,
    embeddings: Arc<EmbeddingService>,
    cache: Mutex<LruCache<String, SharedIndex>>,
}

impl IndexService {
    pub fn new(
        database: Arc<Database>,
        embeddings: Arc<EmbeddingService>,
        capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            database,
            embeddings,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Get the user's index, rebuilding it from the database on a cache miss.
    /// Returns None when the user has no documents at all.
    pub async fn ensure_index(&self, user_id: &str) -> Result<Option<SharedIndex>> {
        if let Some(index) = self.cache.lock().await.get(user_id).cloned() {
            return Ok(Some(index));
        }

        let documents = self.database.list_documents(user_id).await?;
        if documents.is_empty() {
            return Ok(None);
        }

        let index = Arc::new(RwLock::new(self.build_index(documents).await?));
        self.cache
            .lock()
            .await
            .put(user_id.to_string(), index.clone());

        tracing::debug!("Rebuilt semantic index for user {}", user_id);
        Ok(Some(index))
    }

    /// Append freshly synthesized documents to the cached index, if any.
    /// On a cache miss this is a no-op; the next search rebuilds from the
    /// database, which already holds the new rows.
    pub async fn append_documents(&self, user_id: &str, documents: &[ChartDocument]) -> Result<()> {
        let cached = self.cache.lock().await.get(user_id).cloned();
        let Some(index) = cached else {
            return Ok(());
        };

        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let vectors = self.embeddings.generate_batch(texts).await?;
        let mut guard = index.write().await;
        for (document, vector) in documents.iter().cloned().zip(vectors) {
            guard.add(document, vector);
        }
        Ok(())
    }

    /// Drop the cached index for a user. The durable rows are untouched.
    pub async fn invalidate(&self, user_id: &str) {
        self.cache.lock().await.pop(user_id);
    }

    /// Search the user's index. None means the user has no documents.
    pub async fn search(
        &self,
        user_id: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Option<Vec<ScoredDocument>>> {
        let Some(index) = self.ensure_index(user_id).await? else {
            return Ok(None);
        };

        let query_vector = self.embeddings.generate(query).await?;
        let results = index.read().await.search(&query_vector, top_k);
        Ok(Some(results))
    }

    /// Number of indexes currently cached
    pub async fn cached_indexes(&self) -> usize {
        self.cache.lock().await.len()
    }

    async fn build_index(&self, documents: Vec<ChartDocument>) -> Result<SemanticIndex> {
        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let vectors = self.embeddings.generate_batch(texts).await?;

        let mut index = SemanticIndex::new();
        for (document, vector) in documents.into_iter().zip(vectors) {
            index.add(document, vector);
        }
        Ok(index)
    }
}
