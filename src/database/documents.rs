use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;

use super::Database;
use crate::models::ChartDocument;
use crate::models::ChartType;
use crate::models::DocumentMetadata;
use crate::Result;

#[derive(Debug, FromRow)]
struct DocumentRow {
    user_id: String,
    chart_type: String,
    content: String,
    metadata: String,
    created_at: DateTime<Utc>,
}

impl DocumentRow {
    fn into_document(self) -> Result<ChartDocument> {
        let metadata: DocumentMetadata = serde_json::from_str(&self.metadata)?;
        Ok(ChartDocument {
            user_id: self.user_id,
            chart_type: ChartType::from(self.chart_type),
            content: self.content,
            metadata,
            created_at: self.created_at,
        })
    }
}

impl Database {
    /// Replace the synthesized document set for one chart type.
    /// Delete and insert run in one transaction so readers never observe a
    /// partially written set.
    pub async fn replace_documents(
        &self,
        user_id: &str,
        chart_type: &ChartType,
        documents: &[ChartDocument],
    ) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM chart_documents WHERE user_id = ? AND chart_type = ?")
            .bind(user_id)
            .bind(chart_type.as_str())
            .execute(&mut *tx)
            .await?;

        for doc in documents {
            let metadata_json = serde_json::to_string(&doc.metadata)?;
            sqlx::query(
                "INSERT INTO chart_documents (user_id, chart_type, content, metadata, created_at)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(user_id)
            .bind(doc.chart_type.as_str())
            .bind(&doc.content)
            .bind(&metadata_json)
            .bind(doc.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(documents.len())
    }

    /// Load all documents for a user, newest first
    pub async fn list_documents(&self, user_id: &str) -> Result<Vec<ChartDocument>> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            "SELECT user_id, chart_type, content, metadata, created_at
             FROM chart_documents WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DocumentRow::into_document).collect()
    }

    /// Count documents for one chart type
    pub async fn count_documents(&self, user_id: &str, chart_type: &ChartType) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chart_documents WHERE user_id = ? AND chart_type = ?",
        )
        .bind(user_id)
        .bind(chart_type.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Count all documents for a user
    pub async fn count_all_documents(&self, user_id: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM chart_documents WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Delete all documents for a user
    pub async fn delete_documents(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM chart_documents WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
