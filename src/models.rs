use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Birth data required for chart computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthData {
    pub name: Option<String>,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub place_of_birth: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Offset from UTC in hours, e.g. 5.5 for IST
    pub timezone: f64,
}

/// Current user profile (latest state only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: Option<String>,
    pub birth_data: Option<BirthData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Whether this profile carries enough birth data to compute charts
    pub fn has_birth_data(&self) -> bool {
        self.birth_data.is_some()
    }
}

/// Chart record categories.
///
/// The set is closed over the chart kinds the synthesizer understands;
/// anything else round-trips through `Unknown` so upstream additions are
/// stored and retrievable without a code change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChartType {
    BirthDetails,
    PlanetaryPositions,
    HouseChart,
    CurrentPeriod,
    DoshaAnalysis,
    Unknown(String),
}

impl ChartType {
    /// The three chart types a profile needs (any two) to be considered ready
    pub const ESSENTIAL: [ChartType; 3] = [
        ChartType::BirthDetails,
        ChartType::PlanetaryPositions,
        ChartType::HouseChart,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ChartType::BirthDetails => "birth-details",
            ChartType::PlanetaryPositions => "planetary-positions",
            ChartType::HouseChart => "house-chart",
            ChartType::CurrentPeriod => "current-period",
            ChartType::DoshaAnalysis => "dosha-analysis",
            ChartType::Unknown(tag) => tag,
        }
    }

    /// All chart types computed during onboarding
    pub fn all_computed() -> [ChartType; 5] {
        [
            ChartType::BirthDetails,
            ChartType::PlanetaryPositions,
            ChartType::HouseChart,
            ChartType::CurrentPeriod,
            ChartType::DoshaAnalysis,
        ]
    }
}

impl From<String> for ChartType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "birth-details" => ChartType::BirthDetails,
            "planetary-positions" => ChartType::PlanetaryPositions,
            "house-chart" => ChartType::HouseChart,
            "current-period" => ChartType::CurrentPeriod,
            "dosha-analysis" => ChartType::DoshaAnalysis,
            _ => ChartType::Unknown(value),
        }
    }
}

impl From<&str> for ChartType {
    fn from(value: &str) -> Self {
        ChartType::from(value.to_string())
    }
}

impl From<ChartType> for String {
    fn from(value: ChartType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Birth details chart payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthDetailsPayload {
    pub name: Option<String>,
    pub birth_date: String,
    pub birth_time: String,
    pub birth_place: String,
    pub sun_sign: String,
    pub moon_sign: String,
    pub ascendant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nakshatra: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A single planet placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetPosition {
    pub name: String,
    pub sign: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house: Option<u8>,
    pub degree: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A single house placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousePlacement {
    /// 1-based house number
    pub house: u8,
    pub sign: String,
    #[serde(default)]
    pub planets: Vec<String>,
}

/// Current planetary period (dasha) payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodPayload {
    pub main_period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Dosha (affliction) analysis payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoshaPayload {
    pub dosha_type: String,
    pub is_present: bool,
    #[serde(default)]
    pub affected_planets: Vec<String>,
    #[serde(default)]
    pub remedies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Typed chart payload.
///
/// Parsed from the stored JSON by chart type; payloads for unrecognized
/// types are carried verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartPayload {
    BirthDetails(BirthDetailsPayload),
    PlanetaryPositions(Vec<PlanetPosition>),
    HouseChart(Vec<HousePlacement>),
    CurrentPeriod(PeriodPayload),
    DoshaAnalysis(DoshaPayload),
    Unknown(serde_json::Value),
}

impl ChartPayload {
    /// Parse a raw JSON payload according to the chart type it was stored
    /// under. Malformed payloads for known types fall back to `Unknown`
    /// rather than failing the read path.
    pub fn from_stored(chart_type: &ChartType, raw: serde_json::Value) -> Self {
        let parsed = match chart_type {
            ChartType::BirthDetails => {
                serde_json::from_value(raw.clone()).map(ChartPayload::BirthDetails)
            }
            ChartType::PlanetaryPositions => {
                serde_json::from_value(raw.clone()).map(ChartPayload::PlanetaryPositions)
            }
            ChartType::HouseChart => {
                serde_json::from_value(raw.clone()).map(ChartPayload::HouseChart)
            }
            ChartType::CurrentPeriod => {
                serde_json::from_value(raw.clone()).map(ChartPayload::CurrentPeriod)
            }
            ChartType::DoshaAnalysis => {
                serde_json::from_value(raw.clone()).map(ChartPayload::DoshaAnalysis)
            }
            ChartType::Unknown(_) => return ChartPayload::Unknown(raw),
        };
        parsed.unwrap_or(ChartPayload::Unknown(raw))
    }

    /// Serialize back to the JSON stored in the chart_data table
    pub fn to_value(&self) -> crate::Result<serde_json::Value> {
        let value = match self {
            ChartPayload::BirthDetails(p) => serde_json::to_value(p)?,
            ChartPayload::PlanetaryPositions(p) => serde_json::to_value(p)?,
            ChartPayload::HouseChart(p) => serde_json::to_value(p)?,
            ChartPayload::CurrentPeriod(p) => serde_json::to_value(p)?,
            ChartPayload::DoshaAnalysis(p) => serde_json::to_value(p)?,
            ChartPayload::Unknown(v) => v.clone(),
        };
        Ok(value)
    }
}

/// A stored chart record.
///
/// Records are append-only history: storing a new chart of the same type
/// inserts a new row and the highest id per (user, type) is authoritative.
#[derive(Debug, Clone)]
pub struct ChartRecord {
    pub id: i64,
    pub user_id: String,
    pub chart_type: ChartType,
    pub payload: ChartPayload,
    /// True when the payload came from the offline fallback generator
    /// instead of the upstream computation service
    pub degraded: bool,
    pub created_at: DateTime<Utc>,
}

/// Raw chart row as stored in SQLite
#[derive(Debug, Clone, FromRow)]
pub struct ChartRow {
    pub id: i64,
    pub user_id: String,
    pub chart_type: String,
    pub payload: String,
    pub degraded: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ChartRow> for ChartRecord {
    type Error = crate::VedaRagError;

    fn try_from(row: ChartRow) -> crate::Result<Self> {
        let chart_type = ChartType::from(row.chart_type);
        let raw: serde_json::Value = serde_json::from_str(&row.payload)?;
        Ok(ChartRecord {
            id: row.id,
            user_id: row.user_id,
            payload: ChartPayload::from_stored(&chart_type, raw),
            chart_type,
            degraded: row.degraded,
            created_at: row.created_at,
        })
    }
}

/// Structured metadata attached to every synthesized document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun_sign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moon_sign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascendant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_number: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosha_type: Option<String>,
}

/// A synthesized retrieval document derived from a chart record
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDocument {
    pub user_id: String,
    pub chart_type: ChartType,
    pub content: String,
    pub metadata: DocumentMetadata,
    pub created_at: DateTime<Utc>,
}

/// A saved contact whose charts can be read for compatibility questions
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contact {
    pub user_id: String,
    pub contact_name: String,
    /// The contact's own account, when they are also a user here
    pub contact_user_id: Option<String>,
    pub relationship_type: String,
    pub birth_data: Option<String>,
    /// Chart payloads computed for this contact, stored as JSON
    pub chart_data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Marks whether a computed value came from the real upstream or the
/// deterministic offline fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum Computed<T> {
    Fresh(T),
    Degraded(T),
}

impl<T> Computed<T> {
    pub fn into_inner(self) -> T {
        match self {
            Computed::Fresh(v) | Computed::Degraded(v) => v,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Computed::Degraded(_))
    }

    pub fn as_ref(&self) -> Computed<&T> {
        match self {
            Computed::Fresh(v) => Computed::Fresh(v),
            Computed::Degraded(v) => Computed::Degraded(v),
        }
    }
}
