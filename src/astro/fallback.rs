//! Deterministic offline chart generation.
//!
//! When the upstream computation service is unreachable, charts are derived
//! purely from the birth data so the same input always produces the same
//! payload. These are placeholders for conversation flow, not real
//! ephemeris math, and every record built from them is marked degraded.

use crate::models::BirthData;
use crate::models::BirthDetailsPayload;
use crate::models::ChartPayload;
use crate::models::ChartType;
use crate::models::DoshaPayload;
use crate::models::HousePlacement;
use crate::models::PeriodPayload;
use crate::models::PlanetPosition;

const SIGNS: [&str; 12] = [
    "Aries",
    "Taurus",
    "Gemini",
    "Cancer",
    "Leo",
    "Virgo",
    "Libra",
    "Scorpio",
    "Sagittarius",
    "Capricorn",
    "Aquarius",
    "Pisces",
];

const PLANETS: [&str; 9] = [
    "Sun", "Moon", "Mars", "Mercury", "Jupiter", "Venus", "Saturn", "Rahu", "Ketu",
];

const NAKSHATRAS: [&str; 27] = [
    "Ashwini",
    "Bharani",
    "Krittika",
    "Rohini",
    "Mrigashira",
    "Ardra",
    "Punarvasu",
    "Pushya",
    "Ashlesha",
    "Magha",
    "Purva Phalguni",
    "Uttara Phalguni",
    "Hasta",
    "Chitra",
    "Swati",
    "Vishakha",
    "Anuradha",
    "Jyeshtha",
    "Mula",
    "Purva Ashadha",
    "Uttara Ashadha",
    "Shravana",
    "Dhanishta",
    "Shatabhisha",
    "Purva Bhadrapada",
    "Uttara Bhadrapada",
    "Revati",
];

/// Western sun sign from the month/day cusp table
pub fn sun_sign(month: u32, day: u32) -> &'static str {
    // Day of month on which each sign begins; January's cusp opens Aquarius
    const SIGN_DATES: [u32; 12] = [21, 21, 21, 21, 22, 22, 23, 23, 23, 23, 22, 22];
    let month_index = (month.clamp(1, 12) - 1) as usize;
    let sign_index = if day >= SIGN_DATES[month_index] {
        (month_index + 10) % 12
    } else {
        (month_index + 9) % 12
    };
    SIGNS[sign_index]
}

/// Simplified moon sign
pub fn moon_sign(month: u32, day: u32) -> &'static str {
    SIGNS[((month + day) % 12) as usize]
}

/// Ascendant from the birth hour
pub fn ascendant(hour: u32) -> &'static str {
    SIGNS[((hour / 2) % 12) as usize]
}

/// Nakshatra from the month/day sum
pub fn nakshatra(month: u32, day: u32) -> &'static str {
    NAKSHATRAS[((month + day) % 27) as usize]
}

/// Stable per-birth seed for the hash-derived placements
fn seed(birth: &BirthData, salt: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    let key = format!(
        "{}-{}-{}-{}-{}-{salt}",
        birth.year, birth.month, birth.day, birth.hour, birth.minute
    );
    for byte in key.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn derived_sign(birth: &BirthData, salt: &str) -> &'static str {
    SIGNS[(seed(birth, salt) % 12) as usize]
}

fn derived_degree(birth: &BirthData, salt: &str) -> f64 {
    (seed(birth, salt) % 30) as f64
}

fn derived_planet(birth: &BirthData, salt: &str) -> &'static str {
    PLANETS[(seed(birth, salt) % 9) as usize]
}

/// Generate a fallback payload for one chart type
pub fn generate(chart_type: &ChartType, birth: &BirthData) -> ChartPayload {
    match chart_type {
        ChartType::BirthDetails => ChartPayload::BirthDetails(birth_details(birth)),
        ChartType::PlanetaryPositions => ChartPayload::PlanetaryPositions(planets(birth)),
        ChartType::HouseChart => ChartPayload::HouseChart(houses(birth)),
        ChartType::CurrentPeriod => ChartPayload::CurrentPeriod(period(birth)),
        ChartType::DoshaAnalysis => ChartPayload::DoshaAnalysis(dosha(birth)),
        ChartType::Unknown(tag) => ChartPayload::Unknown(serde_json::json!({
            "chart_type": tag,
            "note": "No fallback generator for this chart type",
        })),
    }
}

fn birth_details(birth: &BirthData) -> BirthDetailsPayload {
    BirthDetailsPayload {
        name: birth.name.clone(),
        birth_date: format!("{}/{}/{}", birth.day, birth.month, birth.year),
        birth_time: format!("{:02}:{:02}", birth.hour, birth.minute),
        birth_place: birth
            .place_of_birth
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        sun_sign: sun_sign(birth.month, birth.day).to_string(),
        moon_sign: moon_sign(birth.month, birth.day).to_string(),
        ascendant: ascendant(birth.hour).to_string(),
        nakshatra: Some(nakshatra(birth.month, birth.day).to_string()),
        details: None,
    }
}

fn planets(birth: &BirthData) -> Vec<PlanetPosition> {
    PLANETS
        .iter()
        .map(|&name| {
            let sign = match name {
                "Sun" => sun_sign(birth.month, birth.day),
                "Moon" => moon_sign(birth.month, birth.day),
                _ => derived_sign(birth, name),
            };
            PlanetPosition {
                name: name.to_string(),
                sign: sign.to_string(),
                house: Some(((seed(birth, name) % 12) + 1) as u8),
                degree: derived_degree(birth, name),
                status: None,
                description: None,
            }
        })
        .collect()
}

fn houses(birth: &BirthData) -> Vec<HousePlacement> {
    (1..=12u8)
        .map(|house| {
            let salt = format!("house-{house}");
            // Sparse occupancy: only the first three houses get a planet
            let planets = if house <= 3 {
                vec![derived_planet(birth, &salt).to_string()]
            } else {
                vec![]
            };
            HousePlacement {
                house,
                sign: derived_sign(birth, &salt).to_string(),
                planets,
            }
        })
        .collect()
}

fn period(birth: &BirthData) -> PeriodPayload {
    PeriodPayload {
        main_period: derived_planet(birth, "main-dasha").to_string(),
        sub_period: Some(derived_planet(birth, "sub-dasha").to_string()),
        period: Some("2020-01-01 to 2027-01-01".to_string()),
        description: None,
    }
}

fn dosha(birth: &BirthData) -> DoshaPayload {
    let present = seed(birth, "kalsarpa") % 2 == 0;
    DoshaPayload {
        dosha_type: if seed(birth, "kalsarpa-type") % 2 == 0 {
            "Partial".to_string()
        } else {
            "Complete".to_string()
        },
        is_present: present,
        affected_planets: vec![
            "Mars".to_string(),
            "Mercury".to_string(),
            "Jupiter".to_string(),
        ],
        remedies: vec![
            "Wear red coral".to_string(),
            "Chant Hanuman Chalisa".to_string(),
            "Donate red items on Tuesday".to_string(),
        ],
        description: None,
    }
}
