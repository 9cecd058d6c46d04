//! Views: headless renderers for the map, the pie chart and the summary.
//!
//! Each view is a function of one [`RenderFrame`] and keeps no state between
//! renders apart from caches (the map caches projected outlines). The concrete
//! views produce structured output that serialises to SVG or text, so the same
//! frame can be checked in tests or written to disk by the host.

mod chart;
mod map;
mod summary;

pub use chart::{default_tooltip_label, ChartOutput, ChartView, Slice, PALETTE};
pub use map::{tooltip_text, CountryPath, MapOutput, MapView, Projection};
pub use summary::{SummaryOutput, SummaryView};

use crate::dataset::Language;
use crate::index::CountryLanguageIndex;
use crate::summary::Summary;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Identifies one of the three views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViewKind {
    Map,
    Chart,
    Summary,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewKind::Map => "map",
            ViewKind::Chart => "chart",
            ViewKind::Summary => "summary",
        };
        f.write_str(name)
    }
}

/// Drawing area for views that lay themselves out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(900.0, 480.0)
    }
}

/// Everything a view needs for one render.
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    /// Selected languages, in dataset order
    pub selected: &'a [&'a Language],
    pub index: &'a CountryLanguageIndex,
    pub summary: &'a Summary,
}

#[derive(Debug, Error)]
pub enum ViewError {
    /// A rendering collaborator the view depends on is missing.
    #[error("{kind} backend unavailable: {reason}")]
    BackendUnavailable { kind: ViewKind, reason: String },
}

/// Static text standing in for a view that cannot render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placeholder {
    pub kind: ViewKind,
    pub message: String,
}

impl Placeholder {
    pub fn unavailable(kind: ViewKind) -> Self {
        let message = match kind {
            ViewKind::Map => "Map unavailable",
            ViewKind::Chart => "Chart unavailable",
            ViewKind::Summary => "Summary unavailable",
        };
        Self {
            kind,
            message: message.to_string(),
        }
    }
}

/// Output of one render.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutput {
    Map(MapOutput),
    Chart(ChartOutput),
    Summary(SummaryOutput),
    Placeholder(Placeholder),
}

impl ViewOutput {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewOutput::Map(_) => ViewKind::Map,
            ViewOutput::Chart(_) => ViewKind::Chart,
            ViewOutput::Summary(_) => ViewKind::Summary,
            ViewOutput::Placeholder(placeholder) => placeholder.kind,
        }
    }

    /// File name the host writes this output to.
    pub fn file_name(&self) -> String {
        match self {
            ViewOutput::Map(_) | ViewOutput::Chart(_) => format!("{}.svg", self.kind()),
            ViewOutput::Summary(_) | ViewOutput::Placeholder(_) => format!("{}.txt", self.kind()),
        }
    }

    /// Serialised document (SVG for graphics, plain text otherwise).
    pub fn to_document(&self) -> String {
        match self {
            ViewOutput::Map(map) => map.to_svg(),
            ViewOutput::Chart(chart) => chart.to_svg(),
            ViewOutput::Summary(summary) => summary.to_text(),
            ViewOutput::Placeholder(placeholder) => format!("{}\n", placeholder.message),
        }
    }
}

/// A swappable view adapter.
pub trait Renderer {
    fn kind(&self) -> ViewKind;

    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<ViewOutput, ViewError>;

    /// Adapt to a new viewport. Returns true when the view needs re-rendering.
    fn resize(&mut self, _viewport: Viewport) -> bool {
        false
    }
}

/// Escape text for inclusion in SVG/XML content and attributes.
pub(crate) fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
