use chrono::Utc;

use super::Database;
use crate::models::ChartPayload;
use crate::models::ChartRecord;
use crate::models::ChartRow;
use crate::models::ChartType;
use crate::Result;

impl Database {
    /// Insert a chart record. Chart history is append-only, so storing a
    /// chart of an existing type adds a new row rather than replacing the
    /// old one. Returns the stored record.
    pub async fn insert_chart(
        &self,
        user_id: &str,
        chart_type: &ChartType,
        payload: &ChartPayload,
        degraded: bool,
    ) -> Result<ChartRecord> {
        let payload_json = serde_json::to_string(&payload.to_value()?)?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO chart_data (user_id, chart_type, payload, degraded, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(chart_type.as_str())
        .bind(&payload_json)
        .bind(degraded)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(ChartRecord {
            id: result.last_insert_rowid(),
            user_id: user_id.to_string(),
            chart_type: chart_type.clone(),
            payload: payload.clone(),
            degraded,
            created_at: now,
        })
    }

    /// Get the newest chart record of one type
    pub async fn get_chart(
        &self,
        user_id: &str,
        chart_type: &ChartType,
    ) -> Result<Option<ChartRecord>> {
        let row: Option<ChartRow> = sqlx::query_as(
            "SELECT * FROM chart_data WHERE user_id = ? AND chart_type = ?
             ORDER BY id DESC LIMIT 1",
        )
        .bind(user_id)
        .bind(chart_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ChartRecord::try_from).transpose()
    }

    /// List every chart record for a user, newest first, including
    /// superseded history
    pub async fn list_charts(&self, user_id: &str) -> Result<Vec<ChartRecord>> {
        let rows: Vec<ChartRow> =
            sqlx::query_as("SELECT * FROM chart_data WHERE user_id = ? ORDER BY id DESC")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(ChartRecord::try_from).collect()
    }

    /// The newest record of each chart type stored for a user
    pub async fn latest_charts(&self, user_id: &str) -> Result<Vec<ChartRecord>> {
        let rows: Vec<ChartRow> = sqlx::query_as(
            "SELECT * FROM chart_data
             WHERE id IN (
                 SELECT MAX(id) FROM chart_data WHERE user_id = ? GROUP BY chart_type
             )
             ORDER BY chart_type",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ChartRecord::try_from).collect()
    }

    /// Whether the user has at least one chart stored
    pub async fn has_charts(&self, user_id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chart_data WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Whether the authoritative (newest per type) charts include any that
    /// came from the fallback generator. Superseded history does not count.
    pub async fn has_degraded_charts(&self, user_id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chart_data
             WHERE id IN (
                 SELECT MAX(id) FROM chart_data WHERE user_id = ? GROUP BY chart_type
             )
             AND degraded = 1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Distinct chart types stored for a user
    pub async fn stored_chart_types(&self, user_id: &str) -> Result<Vec<ChartType>> {
        let types: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT chart_type FROM chart_data WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(types.into_iter().map(ChartType::from).collect())
    }

    /// Delete all chart records for a user
    pub async fn delete_charts(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM chart_data WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
