//! Application controller.
//!
//! `App` owns the dataset, the selection and the synchroniser. All selection
//! changes enter through [`App::apply`], which commits the change and then
//! runs exactly one synchronisation pass, so batch operations never trigger
//! per-language re-renders.

use crate::catalog::Catalog;
use crate::dataset::Dataset;
use crate::index::IndexBuilder;
use crate::selection::SelectionState;
use crate::sync::{SyncSnapshot, ViewSynchronizer};
use crate::views::{tooltip_text, ChartView, MapView, Renderer, SummaryView, Viewport};
use anyhow::bail;
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Initial selection applied when the app starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultSelection {
    /// The most spoken language
    #[default]
    Top,
    Empty,
    All,
}

impl FromStr for DefaultSelection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(DefaultSelection::Top),
            "none" => Ok(DefaultSelection::Empty),
            "all" => Ok(DefaultSelection::All),
            other => bail!("Unknown default selection '{}' (expected top, none or all)", other),
        }
    }
}

/// A user interaction that changes the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Toggle(String),
    SelectAll,
    Clear,
    Replace(Vec<String>),
}

pub struct App {
    dataset: Dataset,
    catalog: Catalog,
    selection: SelectionState,
    sync: ViewSynchronizer,
}

impl App {
    pub fn new(dataset: Dataset, renderers: Vec<Box<dyn Renderer>>) -> Self {
        let sync = ViewSynchronizer::new(renderers);
        Self::from_parts(dataset, sync)
    }

    pub fn with_builder(
        dataset: Dataset,
        builder: Box<dyn IndexBuilder>,
        renderers: Vec<Box<dyn Renderer>>,
    ) -> Self {
        let sync = ViewSynchronizer::with_builder(builder, renderers);
        Self::from_parts(dataset, sync)
    }

    /// App with the map, chart and summary views.
    pub fn standard(dataset: Dataset, viewport: Viewport) -> Self {
        let renderers: Vec<Box<dyn Renderer>> = vec![
            Box::new(MapView::new(dataset.countries(), viewport)),
            Box::new(ChartView::new()),
            Box::new(SummaryView),
        ];
        Self::new(dataset, renderers)
    }

    fn from_parts(dataset: Dataset, sync: ViewSynchronizer) -> Self {
        Self {
            catalog: Catalog::new(&dataset),
            dataset,
            selection: SelectionState::new(),
            sync,
        }
    }

    /// Apply the default selection and run the first synchronisation pass.
    pub fn initialize(&mut self, default: DefaultSelection) -> &SyncSnapshot {
        let change = match default {
            DefaultSelection::Top => {
                SelectionChange::Replace(self.catalog.top().map(String::from).into_iter().collect())
            }
            DefaultSelection::Empty => SelectionChange::Clear,
            DefaultSelection::All => SelectionChange::SelectAll,
        };
        info!(
            "Initialising with {} languages, default selection {:?}",
            self.dataset.languages().len(),
            default
        );
        self.apply(change)
    }

    /// Commit one selection change, then synchronise the views once.
    pub fn apply(&mut self, change: SelectionChange) -> &SyncSnapshot {
        match &change {
            SelectionChange::Toggle(code) => {
                if !self.selection.toggle(&self.dataset, code) {
                    debug!("Ignoring toggle of unknown language '{}'", code);
                }
            }
            SelectionChange::SelectAll => self.selection.select_all(&self.dataset),
            SelectionChange::Clear => self.selection.clear(),
            SelectionChange::Replace(codes) => self.selection.replace(&self.dataset, codes),
        }
        debug!("Applied {:?}, {} selected", change, self.selection.len());

        self.sync.on_selection_changed(&self.dataset, &self.selection)
    }

    pub fn toggle(&mut self, iso_code: &str) -> &SyncSnapshot {
        self.apply(SelectionChange::Toggle(iso_code.to_string()))
    }

    pub fn select_all(&mut self) -> &SyncSnapshot {
        self.apply(SelectionChange::SelectAll)
    }

    pub fn clear(&mut self) -> &SyncSnapshot {
        self.apply(SelectionChange::Clear)
    }

    /// Filter the picker. Does not touch the selection.
    pub fn search(&mut self, query: &str) -> &Catalog {
        self.catalog.filter(query);
        &self.catalog
    }

    /// Re-lay out views for a new viewport without a selection change.
    pub fn relayout(&mut self, viewport: Viewport) -> &SyncSnapshot {
        self.sync.relayout(&self.dataset, viewport)
    }

    /// Hover text for a country, from the latest synchronised index.
    ///
    /// Never fails: unknown codes fall back to the code as the name.
    pub fn hover(&self, country_code: &str) -> String {
        let name = self
            .dataset
            .country(country_code)
            .map(|country| country.name.clone())
            .unwrap_or_else(|| country_code.trim().to_ascii_uppercase());
        tooltip_text(&name, self.sync.snapshot().index.get(country_code))
    }

    pub fn members(&self) -> Arc<BTreeSet<String>> {
        self.selection.members()
    }

    pub fn snapshot(&self) -> &SyncSnapshot {
        self.sync.snapshot()
    }

    pub fn synchronizer(&self) -> &ViewSynchronizer {
        &self.sync
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
