use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;

use super::Database;
use crate::models::BirthData;
use crate::models::UserProfile;
use crate::Result;

#[derive(Debug, FromRow)]
struct ProfileRow {
    user_id: String,
    display_name: Option<String>,
    birth_data: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> Result<UserProfile> {
        let birth_data: Option<BirthData> = match self.birth_data {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };
        Ok(UserProfile {
            user_id: self.user_id,
            display_name: self.display_name,
            birth_data,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl Database {
    /// Upsert a user profile, preserving created_at on update
    pub async fn upsert_profile(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        birth_data: Option<&BirthData>,
    ) -> Result<UserProfile> {
        let birth_json = match birth_data {
            Some(data) => Some(serde_json::to_string(data)?),
            None => None,
        };
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO user_profiles (user_id, display_name, birth_data, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (user_id) DO UPDATE SET
                 display_name = excluded.display_name,
                 birth_data = excluded.birth_data,
                 updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(display_name)
        .bind(&birth_json)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_profile(user_id).await.and_then(|opt| {
            opt.ok_or_else(|| crate::VedaRagError::ProfileNotFound(user_id.to_string()))
        })
    }

    /// Get user profile by user id
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let row: Option<ProfileRow> =
            sqlx::query_as("SELECT * FROM user_profiles WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(ProfileRow::into_profile).transpose()
    }

    /// Delete a user profile row
    pub async fn delete_profile(&self, user_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM user_profiles WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
