//! Chart record to retrieval document synthesis.
//!
//! Every stored chart is flattened into one or more plain-text documents
//! sized for embedding: birth details become a single summary document,
//! planetary positions fan out to one document per planet, house charts to
//! one document per house. Unrecognized chart types fall back to a JSON dump
//! so their data stays retrievable.

use chrono::DateTime;
use chrono::Utc;

use crate::models::ChartDocument;
use crate::models::ChartPayload;
use crate::models::ChartRecord;
use crate::models::ChartType;
use crate::models::DocumentMetadata;
use crate::Result;

/// What each astrological house governs
pub fn house_meaning(house_number: u8) -> &'static str {
    match house_number {
        1 => "Self, personality, physical appearance, and first impressions",
        2 => "Wealth, family, speech, and material possessions",
        3 => "Siblings, courage, short journeys, and communication",
        4 => "Mother, home, property, and emotional foundation",
        5 => "Children, intelligence, creativity, and romance",
        6 => "Health, enemies, obstacles, and service to others",
        7 => "Marriage, partnerships, and business relationships",
        8 => "Longevity, transformation, and occult knowledge",
        9 => "Religion, higher education, and long-distance travel",
        10 => "Career, profession, and social status",
        11 => "Gains, income, and fulfillment of desires",
        12 => "Losses, expenses, spirituality, and foreign lands",
        _ => "Astrological house",
    }
}

/// Synthesize the retrieval document set for one chart record
pub fn synthesize(record: &ChartRecord) -> Result<Vec<ChartDocument>> {
    let now = record.created_at;
    let documents = match &record.payload {
        ChartPayload::BirthDetails(details) => {
            let name = details.name.as_deref().unwrap_or("User");
            let content = format!(
                "Astrological Details for {name}:\n\
                 Sun Sign: {}\n\
                 Moon Sign: {}\n\
                 Ascendant: {}\n\
                 Birth Date: {}\n\
                 Birth Time: {}\n\
                 Birth Place: {}\n\
                 {}",
                details.sun_sign,
                details.moon_sign,
                details.ascendant,
                details.birth_date,
                details.birth_time,
                details.birth_place,
                details.details.as_deref().unwrap_or(""),
            );
            vec![document(
                record,
                content,
                DocumentMetadata {
                    sun_sign: Some(details.sun_sign.clone()),
                    moon_sign: Some(details.moon_sign.clone()),
                    ascendant: Some(details.ascendant.clone()),
                    ..DocumentMetadata::default()
                },
                now,
            )]
        }
        ChartPayload::PlanetaryPositions(planets) => planets
            .iter()
            .map(|planet| {
                let house = planet
                    .house
                    .map_or_else(|| "N/A".to_string(), |h| h.to_string());
                let content = format!(
                    "Planetary Position:\n\
                     Planet: {}\n\
                     Sign: {}\n\
                     House: {house}\n\
                     Degree: {}\n\
                     Status: {}\n\
                     {}",
                    planet.name,
                    planet.sign,
                    planet.degree,
                    planet.status.as_deref().unwrap_or("N/A"),
                    planet.description.as_deref().unwrap_or(""),
                );
                document(
                    record,
                    content,
                    DocumentMetadata {
                        planet: Some(planet.name.clone()),
                        sign: Some(planet.sign.clone()),
                        house_number: planet.house,
                        ..DocumentMetadata::default()
                    },
                    now,
                )
            })
            .collect(),
        ChartPayload::HouseChart(houses) => houses
            .iter()
            .map(|house| {
                let planet_list = if house.planets.is_empty() {
                    "No planets".to_string()
                } else {
                    house.planets.join(", ")
                };
                let content = format!(
                    "House {} ({}):\n\
                     Planets: {planet_list}\n\
                     House represents: {}",
                    house.house,
                    house.sign,
                    house_meaning(house.house),
                );
                document(
                    record,
                    content,
                    DocumentMetadata {
                        house_number: Some(house.house),
                        sign: Some(house.sign.clone()),
                        ..DocumentMetadata::default()
                    },
                    now,
                )
            })
            .collect(),
        ChartPayload::CurrentPeriod(period) => {
            let content = format!(
                "Current Vimshottari Dasha:\n\
                 Main Dasha: {}\n\
                 Sub Dasha: {}\n\
                 Period: {}\n\
                 {}",
                period.main_period,
                period.sub_period.as_deref().unwrap_or("N/A"),
                period.period.as_deref().unwrap_or("N/A"),
                period.description.as_deref().unwrap_or(""),
            );
            vec![document(
                record,
                content,
                DocumentMetadata {
                    main_period: Some(period.main_period.clone()),
                    ..DocumentMetadata::default()
                },
                now,
            )]
        }
        ChartPayload::DoshaAnalysis(dosha) => {
            let content = format!(
                "KalSarpa Dosha Analysis:\n\
                 Type: {}\n\
                 Present: {}\n\
                 Affected Planets: {}\n\
                 Remedies: {}\n\
                 {}",
                dosha.dosha_type,
                if dosha.is_present { "Yes" } else { "No" },
                dosha.affected_planets.join(", "),
                dosha.remedies.join("; "),
                dosha.description.as_deref().unwrap_or(""),
            );
            vec![document(
                record,
                content,
                DocumentMetadata {
                    dosha_type: Some(dosha.dosha_type.clone()),
                    ..DocumentMetadata::default()
                },
                now,
            )]
        }
        ChartPayload::Unknown(raw) => {
            let content = serde_json::to_string_pretty(raw)?;
            vec![document(record, content, DocumentMetadata::default(), now)]
        }
    };

    Ok(documents)
}

fn document(
    record: &ChartRecord,
    content: String,
    metadata: DocumentMetadata,
    created_at: DateTime<Utc>,
) -> ChartDocument {
    ChartDocument {
        user_id: record.user_id.clone(),
        chart_type: record.chart_type.clone(),
        content,
        metadata,
        created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BirthDetailsPayload;
    use crate::models::HousePlacement;
    use crate::models::PlanetPosition;

    fn record(chart_type: ChartType, payload: ChartPayload) -> ChartRecord {
        ChartRecord {
            id: 1,
            user_id: "user-1".to_string(),
            chart_type,
            payload,
            degraded: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn birth_details_produce_single_document() {
        let payload = ChartPayload::BirthDetails(BirthDetailsPayload {
            name: Some("Asha".to_string()),
            birth_date: "12/5/1990".to_string(),
            birth_time: "14:30".to_string(),
            birth_place: "Mumbai".to_string(),
            sun_sign: "Taurus".to_string(),
            moon_sign: "Cancer".to_string(),
            ascendant: "Leo".to_string(),
            nakshatra: None,
            details: None,
        });
        let docs = synthesize(&record(ChartType::BirthDetails, payload)).unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].content.contains("Sun Sign: Taurus"));
        assert_eq!(docs[0].metadata.sun_sign.as_deref(), Some("Taurus"));
    }

    #[test]
    fn planets_fan_out_to_one_document_each() {
        let planets = vec![
            PlanetPosition {
                name: "Sun".to_string(),
                sign: "Leo".to_string(),
                house: Some(1),
                degree: 12.0,
                status: None,
                description: None,
            },
            PlanetPosition {
                name: "Saturn".to_string(),
                sign: "Capricorn".to_string(),
                house: None,
                degree: 3.0,
                status: Some("Retrograde".to_string()),
                description: None,
            },
        ];
        let docs =
            synthesize(&record(ChartType::PlanetaryPositions, ChartPayload::PlanetaryPositions(planets)))
                .unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[1].content.contains("Status: Retrograde"));
        assert!(docs[1].content.contains("House: N/A"));
        assert_eq!(docs[0].metadata.planet.as_deref(), Some("Sun"));
    }

    #[test]
    fn houses_carry_their_meaning() {
        let houses = vec![HousePlacement {
            house: 10,
            sign: "Aries".to_string(),
            planets: vec!["Mars".to_string()],
        }];
        let docs =
            synthesize(&record(ChartType::HouseChart, ChartPayload::HouseChart(houses))).unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0]
            .content
            .contains("Career, profession, and social status"));
        assert!(docs[0].content.contains("Planets: Mars"));
        assert_eq!(docs[0].metadata.house_number, Some(10));
    }

    #[test]
    fn empty_house_lists_say_so() {
        let houses = vec![HousePlacement {
            house: 3,
            sign: "Gemini".to_string(),
            planets: vec![],
        }];
        let docs =
            synthesize(&record(ChartType::HouseChart, ChartPayload::HouseChart(houses))).unwrap();
        assert!(docs[0].content.contains("Planets: No planets"));
    }

    #[test]
    fn unknown_chart_types_dump_json() {
        let raw = serde_json::json!({ "transit": "Saturn return", "year": 2026 });
        let docs =
            synthesize(&record(ChartType::Unknown("transit-forecast".to_string()),
                ChartPayload::Unknown(raw)))
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].content.contains("Saturn return"));
        assert_eq!(docs[0].chart_type.as_str(), "transit-forecast");
    }

    #[test]
    fn house_meaning_covers_all_twelve() {
        for house in 1..=12u8 {
            assert_ne!(house_meaning(house), "Astrological house");
        }
        assert_eq!(house_meaning(13), "Astrological house");
    }
}
