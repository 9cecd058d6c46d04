//! Reach summary: naive speaker total and share of world population.
//!
//! The total is a plain sum of per-language speaker counts. People who speak
//! several of the selected languages are counted once per language.

use crate::dataset::Language;
use serde::Serialize;

/// Approximate 2023 world population.
pub const WORLD_POPULATION: f64 = 8_100_000_000.0;

/// Message shown instead of a percentage when nothing is selected.
pub const NO_SELECTION_MESSAGE: &str = "No languages selected";

/// Derived summary numbers for one selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub selected_count: usize,
    pub total_speakers_millions: f64,
    pub percent_of_world: f64,
}

impl Summary {
    pub fn compute<'a, I>(languages: I) -> Self
    where
        I: IntoIterator<Item = &'a Language>,
    {
        let (selected_count, total_speakers_millions) = languages
            .into_iter()
            .fold((0usize, 0.0f64), |(count, total), language| {
                (count + 1, total + language.total_speakers_millions)
            });

        let percent_of_world = if selected_count == 0 {
            0.0
        } else {
            percent_of_world(total_speakers_millions)
        };

        Self {
            selected_count,
            total_speakers_millions,
            percent_of_world,
        }
    }

    /// True when no language is selected.
    pub fn is_empty(&self) -> bool {
        self.selected_count == 0
    }

    pub fn total_people(&self) -> f64 {
        self.total_speakers_millions * 1_000_000.0
    }

    /// e.g. "2.10B people"
    pub fn people_text(&self) -> String {
        format!("{:.2}B people", self.total_people() / 1_000_000_000.0)
    }

    /// e.g. "25.9% of world population"
    pub fn percent_text(&self) -> String {
        format!("{:.1}% of world population", self.percent_of_world)
    }
}

pub fn percent_of_world(total_speakers_millions: f64) -> f64 {
    total_speakers_millions * 1_000_000.0 / WORLD_POPULATION * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn language(code: &str, speakers: f64) -> Language {
        Language {
            iso_code: code.to_string(),
            name: code.to_uppercase(),
            total_speakers_millions: speakers,
            country_codes: Vec::new(),
        }
    }

    #[test]
    fn test_empty_selection() {
        let summary = Summary::compute(std::iter::empty());
        assert!(summary.is_empty());
        assert_eq!(summary.total_speakers_millions, 0.0);
        assert_eq!(summary.percent_of_world, 0.0);
    }

    #[test]
    fn test_english_only() {
        let languages = [language("en", 1500.0)];
        let summary = Summary::compute(&languages);

        assert_eq!(summary.selected_count, 1);
        assert_eq!(summary.total_speakers_millions, 1500.0);
        assert!((summary.percent_of_world - 18.518_518).abs() < 1e-4);
        assert_eq!(summary.people_text(), "1.50B people");
        assert_eq!(summary.percent_text(), "18.5% of world population");
    }

    #[test]
    fn test_english_and_spanish() {
        let languages = [language("en", 1500.0), language("es", 600.0)];
        let summary = Summary::compute(&languages);

        assert_eq!(summary.total_speakers_millions, 2100.0);
        assert_eq!(summary.people_text(), "2.10B people");
        assert_eq!(summary.percent_text(), "25.9% of world population");
    }

    #[test]
    fn test_zero_speaker_language_is_not_empty() {
        let languages = [language("xx", 0.0)];
        let summary = Summary::compute(&languages);

        assert!(!summary.is_empty());
        assert_eq!(summary.percent_text(), "0.0% of world population");
    }

    proptest! {
        #[test]
        fn prop_total_is_additive_over_disjoint_sets(
            left in prop::collection::vec(0u32..5000, 0..10),
            right in prop::collection::vec(0u32..5000, 0..10),
        ) {
            let left: Vec<_> = left.iter().enumerate()
                .map(|(i, s)| language(&format!("a{}", i), *s as f64)).collect();
            let right: Vec<_> = right.iter().enumerate()
                .map(|(i, s)| language(&format!("b{}", i), *s as f64)).collect();

            let union = Summary::compute(left.iter().chain(right.iter()));
            let sum = Summary::compute(&left).total_speakers_millions
                + Summary::compute(&right).total_speakers_millions;
            prop_assert_eq!(union.total_speakers_millions, sum);
        }

        #[test]
        fn prop_percent_never_decreases_as_languages_are_added(
            speakers in prop::collection::vec(0u32..5000, 1..12),
        ) {
            let languages: Vec<_> = speakers.iter().enumerate()
                .map(|(i, s)| language(&format!("l{}", i), *s as f64)).collect();

            let mut previous = 0.0;
            for end in 0..=languages.len() {
                let percent = Summary::compute(&languages[..end]).percent_of_world;
                prop_assert!(percent >= previous);
                previous = percent;
            }
        }
    }
}
