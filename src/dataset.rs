//! Static dataset: language records and country outlines.
//!
//! Both inputs are loaded once at startup and never mutated afterwards.
//! Parsing is tolerant of data-quality issues in the world outline (features
//! without a code or with unsupported geometry are kept but never matched or
//! drawn) and strict about the language records.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while parsing one of the input files.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("language '{iso_code}' has an invalid speaker count: {value}")]
    InvalidSpeakers { iso_code: String, value: f64 },
}

/// One spoken language as listed in the language dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    /// Unique key (e.g. "en")
    pub iso_code: String,

    /// Display name (e.g. "English")
    pub name: String,

    /// Estimated total speakers, in millions
    pub total_speakers_millions: f64,

    /// ISO-3166 alpha-2 codes where the language is spoken (may repeat)
    #[serde(default, rename = "countries_iso2")]
    pub country_codes: Vec<String>,
}

/// A closed ring of (longitude, latitude) points.
pub type Ring = Vec<(f64, f64)>;

/// Country outline: a list of polygons, each polygon a list of rings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    pub polygons: Vec<Vec<Ring>>,
}

impl Shape {
    pub fn is_empty(&self) -> bool {
        self.polygons.iter().all(|rings| rings.iter().all(Vec::is_empty))
    }

    /// Iterate over every point of every ring.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.polygons
            .iter()
            .flat_map(|rings| rings.iter())
            .flat_map(|ring| ring.iter().copied())
    }
}

/// One feature of the world outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    /// Upper-cased ISO-3166 alpha-2 code
    pub iso_a2: String,
    pub name: String,
    pub shape: Shape,
}

// ==================== GeoJSON wire types ====================

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<FeatureProperties>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Default, Deserialize)]
struct FeatureProperties {
    #[serde(default)]
    iso_a2: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// GeoJSON positions may carry an altitude; only the first two values are used.
type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Unsupported,
}

fn to_ring(positions: Vec<Position>) -> Ring {
    positions
        .into_iter()
        .filter_map(|p| match p.as_slice() {
            [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Some((*lon, *lat)),
            _ => None,
        })
        .collect()
}

impl From<Option<Geometry>> for Shape {
    fn from(geometry: Option<Geometry>) -> Self {
        let polygons = match geometry {
            Some(Geometry::Polygon { coordinates }) => {
                vec![coordinates.into_iter().map(to_ring).collect()]
            }
            Some(Geometry::MultiPolygon { coordinates }) => coordinates
                .into_iter()
                .map(|polygon| polygon.into_iter().map(to_ring).collect())
                .collect(),
            Some(Geometry::Unsupported) | None => Vec::new(),
        };
        Shape { polygons }
    }
}

/// Parse the language dataset (a JSON array of language records).
pub fn parse_languages(bytes: &[u8]) -> Result<Vec<Language>, DatasetError> {
    let languages: Vec<Language> = serde_json::from_slice(bytes)?;

    for language in &languages {
        let value = language.total_speakers_millions;
        if !value.is_finite() || value < 0.0 {
            return Err(DatasetError::InvalidSpeakers {
                iso_code: language.iso_code.clone(),
                value,
            });
        }
    }

    Ok(languages)
}

/// Parse the world outline (a GeoJSON feature collection).
pub fn parse_world(bytes: &[u8]) -> Result<Vec<Country>, DatasetError> {
    let collection: FeatureCollection = serde_json::from_slice(bytes)?;

    let countries = collection
        .features
        .into_iter()
        .map(|feature| {
            let properties = feature.properties.unwrap_or_default();
            let iso_a2 = properties
                .iso_a2
                .unwrap_or_default()
                .trim()
                .to_ascii_uppercase();
            let name = properties.name.unwrap_or_else(|| iso_a2.clone());
            Country {
                iso_a2,
                name,
                shape: Shape::from(feature.geometry),
            }
        })
        .collect();

    Ok(countries)
}

/// The immutable dataset shared by every view.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    languages: Vec<Language>,
    language_by_code: HashMap<String, usize>,
    countries: Vec<Country>,
    country_by_code: HashMap<String, usize>,
}

impl Dataset {
    /// Build the dataset, keeping source order.
    ///
    /// Duplicate language codes keep the first record. Duplicate country codes
    /// (outline sources reuse placeholders such as "-99") are all drawn, but
    /// lookups by code resolve to the first feature.
    pub fn new(languages: Vec<Language>, countries: Vec<Country>) -> Self {
        let mut kept = Vec::with_capacity(languages.len());
        let mut language_by_code = HashMap::with_capacity(languages.len());

        for language in languages {
            if language_by_code.contains_key(&language.iso_code) {
                warn!(
                    "Ignoring duplicate language record '{}' ({})",
                    language.iso_code, language.name
                );
                continue;
            }
            language_by_code.insert(language.iso_code.clone(), kept.len());
            kept.push(language);
        }

        let mut country_by_code = HashMap::with_capacity(countries.len());
        for (position, country) in countries.iter().enumerate() {
            if !country.iso_a2.is_empty() {
                country_by_code
                    .entry(country.iso_a2.clone())
                    .or_insert(position);
            }
        }

        debug!(
            "Dataset ready: {} languages, {} countries",
            kept.len(),
            countries.len()
        );

        Self {
            languages: kept,
            language_by_code,
            countries,
            country_by_code,
        }
    }

    /// All languages, in dataset order.
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn language(&self, iso_code: &str) -> Option<&Language> {
        self.language_by_code
            .get(iso_code)
            .map(|&position| &self.languages[position])
    }

    pub fn contains_language(&self, iso_code: &str) -> bool {
        self.language_by_code.contains_key(iso_code)
    }

    /// Every language code in the dataset.
    pub fn all_codes(&self) -> BTreeSet<String> {
        self.languages
            .iter()
            .map(|language| language.iso_code.clone())
            .collect()
    }

    /// The selected languages, in dataset order. Unknown codes are skipped.
    pub fn selected<'a>(&'a self, codes: &BTreeSet<String>) -> Vec<&'a Language> {
        self.languages
            .iter()
            .filter(|language| codes.contains(&language.iso_code))
            .collect()
    }

    /// All country features, in source order.
    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// Look up a country by code, case-insensitively.
    pub fn country(&self, iso_a2: &str) -> Option<&Country> {
        self.country_by_code
            .get(&iso_a2.trim().to_ascii_uppercase())
            .map(|&position| &self.countries[position])
    }
}
