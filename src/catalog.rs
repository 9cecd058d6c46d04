//! Language picker: options sorted by speakers, with search filtering.
//!
//! Filtering only hides options; it never changes the selection.

use crate::dataset::Dataset;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageOption {
    pub iso_code: String,
    /// e.g. "English (1.50B)"
    pub label: String,
    pub hidden: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    options: Vec<LanguageOption>,
    query: String,
}

impl Catalog {
    /// Options ordered by speaker count, largest first (ties keep dataset order).
    pub fn new(dataset: &Dataset) -> Self {
        let mut languages: Vec<_> = dataset.languages().iter().collect();
        languages.sort_by(|a, b| {
            b.total_speakers_millions
                .total_cmp(&a.total_speakers_millions)
        });

        let options = languages
            .into_iter()
            .map(|language| LanguageOption {
                iso_code: language.iso_code.clone(),
                label: format!(
                    "{} ({:.2}B)",
                    language.name,
                    language.total_speakers_millions / 1000.0
                ),
                hidden: false,
            })
            .collect();

        Self {
            options,
            query: String::new(),
        }
    }

    pub fn options(&self) -> &[LanguageOption] {
        &self.options
    }

    pub fn visible(&self) -> impl Iterator<Item = &LanguageOption> {
        self.options.iter().filter(|option| !option.hidden)
    }

    /// The most spoken language, used for the default selection.
    pub fn top(&self) -> Option<&str> {
        self.options.first().map(|option| option.iso_code.as_str())
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Hide options whose label does not contain `query` (case-insensitive).
    pub fn filter(&mut self, query: &str) {
        self.query = query.trim().to_lowercase();
        for option in &mut self.options {
            option.hidden = !option.label.to_lowercase().contains(&self.query);
        }
    }
}
