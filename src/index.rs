//! Reverse index: country code -> names of the selected languages spoken there.
//!
//! The index is rebuilt from scratch on every selection change and never
//! patched in place. A country with no selected language is absent from the
//! index; there are never empty entries.

use crate::dataset::Dataset;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Normalise a country code for matching (codes compare case-insensitively).
pub fn normalize_country_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Derived mapping from upper-cased country code to language names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountryLanguageIndex {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl CountryLanguageIndex {
    /// Languages spoken in `country_code`, or `None` when it is not highlighted.
    pub fn get(&self, country_code: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(&normalize_country_code(country_code))
    }

    pub fn contains(&self, country_code: &str) -> bool {
        self.get(country_code).is_some()
    }

    /// Number of highlighted countries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries
            .iter()
            .map(|(code, names)| (code.as_str(), names))
    }

    pub fn country_codes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn insert(&mut self, country_code: &str, language_name: &str) {
        let code = normalize_country_code(country_code);
        if code.is_empty() {
            return;
        }
        self.entries
            .entry(code)
            .or_default()
            .insert(language_name.to_string());
    }
}

/// Strategy for building the index; boxed by the synchronizer so tests can
/// substitute a counting builder.
pub trait IndexBuilder {
    fn build(&self, dataset: &Dataset, selected: &BTreeSet<String>) -> CountryLanguageIndex;
}

/// The standard builder, see [`build`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReverseIndexBuilder;

impl IndexBuilder for ReverseIndexBuilder {
    fn build(&self, dataset: &Dataset, selected: &BTreeSet<String>) -> CountryLanguageIndex {
        build(dataset, selected)
    }
}

/// Build the reverse index for the selected language codes.
///
/// Runs in time proportional to the country/language pairs of the selected
/// languages: each selected code is resolved through the dataset's code map
/// rather than by scanning every record. Unknown codes contribute nothing.
pub fn build(dataset: &Dataset, selected: &BTreeSet<String>) -> CountryLanguageIndex {
    let mut index = CountryLanguageIndex::default();

    for language in selected.iter().filter_map(|code| dataset.language(code)) {
        for country_code in &language.country_codes {
            index.insert(country_code, &language.name);
        }
    }

    index
}
