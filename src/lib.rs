//! Language reach explorer.
//!
//! Load a language dataset and a world outline, select languages, and keep a
//! choropleth map, a speaker-share pie chart and a reach summary in step with
//! the selection.

pub mod app;
pub mod catalog;
pub mod config;
pub mod dataset;
pub mod index;
pub mod loader;
pub mod selection;
pub mod summary;
pub mod sync;
pub mod views;

pub use app::{App, DefaultSelection, SelectionChange};
pub use dataset::{Country, Dataset, Language};
pub use index::{CountryLanguageIndex, IndexBuilder, ReverseIndexBuilder};
pub use selection::SelectionState;
pub use summary::{Summary, WORLD_POPULATION};
pub use sync::{SyncSnapshot, ViewSynchronizer};
