//! Selection state: the set of language codes chosen for visualisation.
//!
//! Mutation is crate-private. Every change goes through [`crate::app::App`],
//! which commits the change and runs exactly one synchronisation pass.

use crate::dataset::Dataset;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    /// Shared so that `members()` snapshots are O(1) and unaffected by later edits
    members: Arc<BTreeSet<String>>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only snapshot of the current members.
    pub fn members(&self) -> Arc<BTreeSet<String>> {
        Arc::clone(&self.members)
    }

    pub fn contains(&self, iso_code: &str) -> bool {
        self.members.contains(iso_code)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Flip membership of a known language. Unknown codes are ignored.
    ///
    /// Returns whether the membership changed.
    pub(crate) fn toggle(&mut self, dataset: &Dataset, iso_code: &str) -> bool {
        if !dataset.contains_language(iso_code) {
            return false;
        }

        let members = Arc::make_mut(&mut self.members);
        if !members.remove(iso_code) {
            members.insert(iso_code.to_string());
        }
        true
    }

    pub(crate) fn select_all(&mut self, dataset: &Dataset) {
        self.members = Arc::new(dataset.all_codes());
    }

    pub(crate) fn clear(&mut self) {
        self.members = Arc::new(BTreeSet::new());
    }

    /// Replace the whole selection, keeping only known codes.
    pub(crate) fn replace<I, S>(&mut self, dataset: &Dataset, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.members = Arc::new(
            codes
                .into_iter()
                .filter(|code| dataset.contains_language(code.as_ref()))
                .map(|code| code.as_ref().to_string())
                .collect(),
        );
    }
}
