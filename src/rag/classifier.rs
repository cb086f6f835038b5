//! Keyword-based query classification.
//!
//! Queries route to one of three conversation tracks by counting keyword
//! hits. Ties resolve astrology first, then wellness, then compatibility.
//! Queries with no hits are `General` and handled downstream like astrology.

use serde::Serialize;

const ASTROLOGY_KEYWORDS: &[&str] = &[
    "birth chart",
    "horoscope",
    "zodiac",
    "planets",
    "transits",
    "natal chart",
    "astrology",
    "sun",
    "moon",
    "signs",
    "mercury",
    "venus",
    "mars",
    "jupiter",
    "saturn",
    "uranus",
    "neptune",
    "pluto",
    "aries",
    "taurus",
    "gemini",
    "cancer",
    "leo",
    "virgo",
    "libra",
    "scorpio",
    "sagittarius",
    "capricorn",
    "aquarius",
    "pisces",
    "ascendant",
    "rising",
    "nakshatra",
    "dasha",
    "kundli",
    "kundali",
    "vedic",
    "western",
    "personality",
    "life path",
    "destiny",
    "fate",
    "cosmic",
    "celestial",
    "planetary",
    "house",
    "houses",
    "aspect",
    "aspects",
    "conjunction",
    "opposition",
    "trine",
    "square",
    "retrograde",
    "direct",
    "stationary",
    "lunar",
    "solar",
    "eclipse",
    "transit",
    "chart",
    "charts",
    "data",
    "access",
    "horo",
    "astro",
    "birth",
    "time",
    "date",
    "place",
    "plan",
    "daily",
    "routine",
    "schedule",
    "day",
    "hour",
    "morning",
    "evening",
    "activity",
    "finance",
    "money",
    "wealth",
    "income",
    "savings",
    "investment",
    "budget",
    "financial",
    "economy",
    "career",
    "job",
    "work",
    "profession",
    "business",
    "success",
    "achievement",
    "goals",
    "love",
    "relationship",
    "romance",
    "marriage",
    "partnership",
    "dating",
    "health",
    "wellness",
    "fitness",
    "healing",
    "recovery",
    "vitality",
    "education",
    "learning",
    "knowledge",
    "wisdom",
    "study",
    "academic",
    "travel",
    "journey",
    "adventure",
    "exploration",
    "migration",
    "family",
    "home",
    "property",
    "real estate",
    "domestic",
    "spirituality",
    "religion",
    "faith",
    "belief",
    "meditation",
    "prayer",
    "friendship",
    "social",
    "community",
    "networking",
    "connections",
    "creativity",
    "art",
    "music",
    "writing",
    "expression",
    "talent",
    "balance",
    "harmony",
    "peace",
    "stability",
    "security",
    "protection",
];

const WELLNESS_KEYWORDS: &[&str] = &[
    "yoga",
    "meditation",
    "dosha",
    "ayurveda",
    "wellness",
    "health",
    "mindfulness",
    "chakra",
    "pranayama",
    "asana",
    "kundalini",
    "energy",
    "healing",
    "therapy",
    "balance",
    "harmony",
    "vata",
    "pitta",
    "kapha",
    "prakriti",
    "vikriti",
    "agni",
    "ojas",
    "tejas",
];

const COMPATIBILITY_KEYWORDS: &[&str] = &[
    "compatibility",
    "relationship",
    "match",
    "partner",
    "love",
    "marriage",
    "romance",
    "soulmate",
    "twin flame",
    "karmic",
    "synastry",
    "composite",
    "relationship chart",
    "love life",
    "dating",
    "commitment",
    "intimacy",
    "chemistry",
    "connection",
];

/// Conversation tracks a query can route to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryTrack {
    Astrology,
    Wellness,
    Compatibility,
    /// No keyword hits. Downstream treats this like astrology.
    General,
}

/// A classified query with its keyword hit count
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub track: QueryTrack,
    pub score: usize,
}

fn count_hits(query: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| query.contains(*k)).count()
}

/// Classify a query by case-insensitive substring counting
pub fn classify(query: &str) -> Classification {
    let lower = query.to_lowercase();

    let astrology = count_hits(&lower, ASTROLOGY_KEYWORDS);
    let wellness = count_hits(&lower, WELLNESS_KEYWORDS);
    let compatibility = count_hits(&lower, COMPATIBILITY_KEYWORDS);

    tracing::debug!(
        "Query classification scores: astrology={}, wellness={}, compatibility={}",
        astrology,
        wellness,
        compatibility
    );

    if astrology == 0 && wellness == 0 && compatibility == 0 {
        return Classification {
            track: QueryTrack::General,
            score: 0,
        };
    }

    if astrology >= wellness && astrology >= compatibility {
        Classification {
            track: QueryTrack::Astrology,
            score: astrology,
        }
    } else if wellness >= compatibility {
        Classification {
            track: QueryTrack::Wellness,
            score: wellness,
        }
    } else {
        Classification {
            track: QueryTrack::Compatibility,
            score: compatibility,
        }
    }
}
