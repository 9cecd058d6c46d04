//! View synchronisation: one pass per committed selection change.
//!
//! A pass rebuilds the reverse index from the full selection snapshot,
//! recomputes the summary, then renders every view from the same frame. A view
//! whose rendering backend is unavailable is replaced by a static placeholder;
//! the other views are unaffected.

use crate::dataset::Dataset;
use crate::index::{CountryLanguageIndex, IndexBuilder, ReverseIndexBuilder};
use crate::selection::SelectionState;
use crate::summary::Summary;
use crate::views::{Placeholder, RenderFrame, Renderer, ViewKind, ViewOutput, Viewport};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Synchronisation counters.
#[derive(Debug, Default)]
pub struct SyncMetrics {
    /// Completed synchronisation passes
    passes: AtomicUsize,

    /// Renders that fell back to a placeholder
    view_failures: AtomicUsize,

    /// Viewport changes that re-rendered at least one view
    relayouts: AtomicUsize,
}

impl SyncMetrics {
    pub fn record_pass(&self) {
        self.passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_view_failure(&self) {
        self.view_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_relayout(&self) {
        self.relayouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn passes(&self) -> usize {
        self.passes.load(Ordering::Relaxed)
    }

    pub fn view_failures(&self) -> usize {
        self.view_failures.load(Ordering::Relaxed)
    }

    pub fn relayouts(&self) -> usize {
        self.relayouts.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> SyncReport {
        SyncReport {
            passes: self.passes(),
            view_failures: self.view_failures(),
            relayouts: self.relayouts(),
        }
    }
}

/// Point-in-time copy of [`SyncMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub passes: usize,
    pub view_failures: usize,
    pub relayouts: usize,
}

/// Result of the latest synchronisation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncSnapshot {
    /// Selection the pass was computed from
    pub selection: Arc<BTreeSet<String>>,
    pub index: CountryLanguageIndex,
    pub summary: Summary,
    /// One output per renderer, in registration order
    pub outputs: Vec<ViewOutput>,
}

impl SyncSnapshot {
    pub fn output(&self, kind: ViewKind) -> Option<&ViewOutput> {
        self.outputs.iter().find(|output| output.kind() == kind)
    }
}

pub struct ViewSynchronizer {
    builder: Box<dyn IndexBuilder>,
    renderers: Vec<Box<dyn Renderer>>,
    snapshot: SyncSnapshot,
    metrics: SyncMetrics,
}

impl ViewSynchronizer {
    pub fn new(renderers: Vec<Box<dyn Renderer>>) -> Self {
        Self::with_builder(Box::new(ReverseIndexBuilder), renderers)
    }

    pub fn with_builder(builder: Box<dyn IndexBuilder>, renderers: Vec<Box<dyn Renderer>>) -> Self {
        Self {
            builder,
            renderers,
            snapshot: SyncSnapshot::default(),
            metrics: SyncMetrics::default(),
        }
    }

    pub fn snapshot(&self) -> &SyncSnapshot {
        &self.snapshot
    }

    pub fn metrics(&self) -> &SyncMetrics {
        &self.metrics
    }

    /// Recompute derived state for `selection` and push it to every view.
    ///
    /// Calling this again without an intervening selection change yields an
    /// identical snapshot.
    pub fn on_selection_changed(
        &mut self,
        dataset: &Dataset,
        selection: &SelectionState,
    ) -> &SyncSnapshot {
        let members = selection.members();

        let index = self.builder.build(dataset, &members);
        let selected = dataset.selected(&members);
        let summary = Summary::compute(selected.iter().copied());

        let frame = RenderFrame {
            selected: &selected,
            index: &index,
            summary: &summary,
        };
        let outputs = self
            .renderers
            .iter_mut()
            .map(|renderer| render_or_placeholder(renderer.as_mut(), &frame, &self.metrics))
            .collect();

        self.metrics.record_pass();
        debug!(
            "Synchronised {} selected languages: {} countries highlighted, {:.1}% of world",
            selected.len(),
            index.len(),
            summary.percent_of_world
        );

        self.snapshot = SyncSnapshot {
            selection: members,
            index,
            summary,
            outputs,
        };
        &self.snapshot
    }

    /// Apply a new viewport. Views that re-lay themselves out are re-rendered
    /// from the last snapshot; selection, index and summary are untouched.
    pub fn relayout(&mut self, dataset: &Dataset, viewport: Viewport) -> &SyncSnapshot {
        let changed: Vec<usize> = self
            .renderers
            .iter_mut()
            .enumerate()
            .filter_map(|(position, renderer)| renderer.resize(viewport).then_some(position))
            .collect();

        if changed.is_empty() {
            return &self.snapshot;
        }

        let selected = dataset.selected(&self.snapshot.selection);
        let frame = RenderFrame {
            selected: &selected,
            index: &self.snapshot.index,
            summary: &self.snapshot.summary,
        };

        let mut outputs = self.snapshot.outputs.clone();
        for position in changed {
            let output =
                render_or_placeholder(self.renderers[position].as_mut(), &frame, &self.metrics);
            match outputs.get_mut(position) {
                Some(slot) => *slot = output,
                None => outputs.push(output),
            }
        }

        self.metrics.record_relayout();
        self.snapshot.outputs = outputs;
        &self.snapshot
    }
}

fn render_or_placeholder(
    renderer: &mut dyn Renderer,
    frame: &RenderFrame<'_>,
    metrics: &SyncMetrics,
) -> ViewOutput {
    let kind = renderer.kind();
    match renderer.render(frame) {
        Ok(output) => output,
        Err(e) => {
            metrics.record_view_failure();
            warn!("Rendering {} view failed, showing placeholder: {}", kind, e);
            ViewOutput::Placeholder(Placeholder::unavailable(kind))
        }
    }
}
