//! Context assembly and readiness gating

use std::sync::Arc;

use super::RetrievalOutcome;
use crate::database::Database;
use crate::models::ChartRecord;
use crate::models::ChartType;
use crate::models::UserProfile;
use crate::Result;

/// Reply sent when the user has not provided birth data yet
pub const NO_BIRTH_DATA_MESSAGE: &str = "I'd love to dive into your astrological journey with \
you! To give you personalized cosmic insights, I just need your birth details - date, time, and \
place of birth. Once you save these in your profile, I'll remember them for all our future chats!";

/// Reply sent when birth data exists but the chart set is still incomplete
pub const INCOMPLETE_CHART_MESSAGE: &str = "I can see your birth details! While I have your \
basic information, your complete birth chart hasn't been generated yet. For the most accurate \
and detailed astrological insights, please generate your full birth chart. That will give me \
access to your planetary positions, houses, and other important elements for truly personalized \
guidance.";

/// Whether a user is ready for personalized chart analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    NoBirthData,
    IncompleteChartData,
    Ready,
}

/// Everything known about a user before answering a query
#[derive(Debug, Clone)]
pub struct EnrichedContext {
    pub profile: Option<UserProfile>,
    /// Newest stored record of each chart type
    pub charts: Vec<ChartRecord>,
    pub has_complete_chart_data: bool,
}

impl EnrichedContext {
    pub fn readiness(&self) -> Readiness {
        let has_birth_data = self
            .profile
            .as_ref()
            .is_some_and(UserProfile::has_birth_data);
        if !has_birth_data {
            return Readiness::NoBirthData;
        }
        if !self.has_complete_chart_data {
            return Readiness::IncompleteChartData;
        }
        Readiness::Ready
    }
}

/// Assembler for user context and retrieved chart text
pub struct ContextAssembler {
    database: Arc<Database>,
    max_context_length: usize,
}

impl ContextAssembler {
    #[must_use]
    pub fn new(database: Arc<Database>, max_context_length: usize) -> Self {
        Self {
            database,
            max_context_length,
        }
    }

    /// Load the user's profile and the newest record of each chart type
    pub async fn build(&self, user_id: &str) -> Result<EnrichedContext> {
        let profile = self.database.get_profile(user_id).await?;
        let charts = self.database.latest_charts(user_id).await?;
        let types: Vec<ChartType> = charts.iter().map(|c| c.chart_type.clone()).collect();
        let has_complete_chart_data = has_complete_chart_data(&types);

        Ok(EnrichedContext {
            profile,
            charts,
            has_complete_chart_data,
        })
    }

    /// Render retrieved chunks plus the full structured chart payloads into
    /// a bounded textual context for the LLM. Retrieved chunks go first so
    /// the most relevant text survives the length budget, then each chart's
    /// payload is embedded as JSON until the budget is hit.
    pub fn render(&self, context: &EnrichedContext, outcome: &RetrievalOutcome) -> Result<String> {
        let mut rendered = String::new();
        let mut total_length = 0;

        if let RetrievalOutcome::Matches { charts, .. } = outcome {
            for (chart_type, chunks) in charts {
                for (idx, chunk) in chunks.iter().enumerate() {
                    let entry = format!(
                        "\n[{chart_type} {n}]\n{content}\n",
                        n = idx + 1,
                        content = chunk.content
                    );
                    if total_length + entry.len() > self.max_context_length {
                        return Ok(rendered);
                    }
                    rendered.push_str(&entry);
                    total_length += entry.len();
                }
            }
        }

        for record in &context.charts {
            let payload = serde_json::to_string(&record.payload.to_value()?)?;
            let entry = format!(
                "\n[{chart_type} payload]\n{payload}\n",
                chart_type = record.chart_type
            );
            if total_length + entry.len() > self.max_context_length {
                break;
            }
            rendered.push_str(&entry);
            total_length += entry.len();
        }

        Ok(rendered)
    }
}

/// At least two of the three essential chart types must be stored
pub fn has_complete_chart_data(stored: &[ChartType]) -> bool {
    let essential = ChartType::ESSENTIAL
        .iter()
        .filter(|t| stored.contains(t))
        .count();
    essential >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completeness_requires_two_essential_types() {
        assert!(!has_complete_chart_data(&[]));
        assert!(!has_complete_chart_data(&[ChartType::BirthDetails]));
        assert!(!has_complete_chart_data(&[
            ChartType::BirthDetails,
            ChartType::CurrentPeriod,
            ChartType::DoshaAnalysis,
        ]));
        assert!(has_complete_chart_data(&[
            ChartType::BirthDetails,
            ChartType::PlanetaryPositions,
        ]));
        assert!(has_complete_chart_data(&[
            ChartType::PlanetaryPositions,
            ChartType::HouseChart,
            ChartType::DoshaAnalysis,
        ]));
    }

    #[test]
    fn readiness_gates_in_order() {
        let mut ctx = EnrichedContext {
            profile: None,
            charts: vec![],
            has_complete_chart_data: false,
        };
        assert_eq!(ctx.readiness(), Readiness::NoBirthData);

        let now = chrono::Utc::now();
        ctx.profile = Some(UserProfile {
            user_id: "user-1".to_string(),
            display_name: None,
            birth_data: None,
            created_at: now,
            updated_at: now,
        });
        // A profile without birth data still gates on birth data
        assert_eq!(ctx.readiness(), Readiness::NoBirthData);

        if let Some(profile) = ctx.profile.as_mut() {
            profile.birth_data = Some(crate::models::BirthData {
                name: None,
                year: 1990,
                month: 5,
                day: 12,
                hour: 14,
                minute: 30,
                place_of_birth: None,
                latitude: 19.07,
                longitude: 72.88,
                timezone: 5.5,
            });
        }
        assert_eq!(ctx.readiness(), Readiness::IncompleteChartData);

        ctx.has_complete_chart_data = true;
        assert_eq!(ctx.readiness(), Readiness::Ready);
    }

    #[tokio::test]
    async fn render_embeds_full_chart_payloads() {
        let database = Arc::new(crate::database::Database::in_memory().await.unwrap());
        let assembler = ContextAssembler::new(database, 8000);

        let payload = crate::models::ChartPayload::CurrentPeriod(crate::models::PeriodPayload {
            main_period: "Jupiter".to_string(),
            sub_period: Some("Venus".to_string()),
            period: Some("2020-01-01 to 2027-01-01".to_string()),
            description: None,
        });
        let ctx = EnrichedContext {
            profile: None,
            charts: vec![ChartRecord {
                id: 1,
                user_id: "user-1".to_string(),
                chart_type: ChartType::CurrentPeriod,
                payload,
                degraded: false,
                created_at: chrono::Utc::now(),
            }],
            has_complete_chart_data: false,
        };

        let rendered = assembler.render(&ctx, &RetrievalOutcome::NoData).unwrap();
        assert!(rendered.contains("[current-period payload]"));
        assert!(rendered.contains("Jupiter"));
    }

    #[tokio::test]
    async fn render_respects_the_length_budget() {
        let database = Arc::new(crate::database::Database::in_memory().await.unwrap());
        let assembler = ContextAssembler::new(database, 10);

        let ctx = EnrichedContext {
            profile: None,
            charts: vec![ChartRecord {
                id: 1,
                user_id: "user-1".to_string(),
                chart_type: ChartType::DoshaAnalysis,
                payload: crate::models::ChartPayload::Unknown(serde_json::json!({
                    "note": "far larger than the ten character budget",
                })),
                degraded: false,
                created_at: chrono::Utc::now(),
            }],
            has_complete_chart_data: false,
        };

        let rendered = assembler.render(&ctx, &RetrievalOutcome::NoData).unwrap();
        assert!(rendered.is_empty());
    }
}
