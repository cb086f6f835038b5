use chrono::Utc;

use super::Database;
use crate::models::BirthData;
use crate::models::Contact;
use crate::Result;

impl Database {
    /// Upsert a contact, keyed on (user_id, contact_name)
    pub async fn upsert_contact(
        &self,
        user_id: &str,
        contact_name: &str,
        contact_user_id: Option<&str>,
        relationship_type: Option<&str>,
        birth_data: Option<&BirthData>,
    ) -> Result<Contact> {
        let birth_json = match birth_data {
            Some(data) => Some(serde_json::to_string(data)?),
            None => None,
        };
        let relationship = relationship_type.unwrap_or("friend");
        let now = Utc::now();

        // chart_data survives re-upserts; it only changes via
        // update_contact_chart_data
        sqlx::query(
            "INSERT INTO user_contacts
                 (user_id, contact_name, contact_user_id, relationship_type,
                  birth_data, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (user_id, contact_name) DO UPDATE SET
                 contact_user_id = excluded.contact_user_id,
                 relationship_type = excluded.relationship_type,
                 birth_data = excluded.birth_data,
                 updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(contact_name)
        .bind(contact_user_id)
        .bind(relationship)
        .bind(&birth_json)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_contact(user_id, contact_name)
            .await
            .and_then(|opt| {
                opt.ok_or_else(|| {
                    crate::VedaRagError::ContactNotFound(
                        user_id.to_string(),
                        contact_name.to_string(),
                    )
                })
            })
    }

    /// Attach computed chart payloads to an existing contact
    pub async fn update_contact_chart_data(
        &self,
        user_id: &str,
        contact_name: &str,
        chart_data: &serde_json::Value,
    ) -> Result<Contact> {
        let chart_json = serde_json::to_string(chart_data)?;
        let result = sqlx::query(
            "UPDATE user_contacts SET chart_data = ?, updated_at = ?
             WHERE user_id = ? AND contact_name = ?",
        )
        .bind(&chart_json)
        .bind(Utc::now())
        .bind(user_id)
        .bind(contact_name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(crate::VedaRagError::ContactNotFound(
                user_id.to_string(),
                contact_name.to_string(),
            ));
        }

        self.get_contact(user_id, contact_name)
            .await
            .and_then(|opt| {
                opt.ok_or_else(|| {
                    crate::VedaRagError::ContactNotFound(
                        user_id.to_string(),
                        contact_name.to_string(),
                    )
                })
            })
    }

    /// Get one contact by name
    pub async fn get_contact(&self, user_id: &str, contact_name: &str) -> Result<Option<Contact>> {
        let contact = sqlx::query_as(
            "SELECT * FROM user_contacts WHERE user_id = ? AND contact_name = ?",
        )
        .bind(user_id)
        .bind(contact_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(contact)
    }

    /// List all contacts for a user
    pub async fn list_contacts(&self, user_id: &str) -> Result<Vec<Contact>> {
        let contacts = sqlx::query_as(
            "SELECT * FROM user_contacts WHERE user_id = ? ORDER BY contact_name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(contacts)
    }

    /// Delete all contacts for a user
    pub async fn delete_contacts(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM user_contacts WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
