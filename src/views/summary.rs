use super::{RenderFrame, Renderer, ViewError, ViewKind, ViewOutput};
use crate::summary::NO_SELECTION_MESSAGE;

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutput {
    NoSelection { message: String },
    Reach { people: String, percent: String },
}

impl SummaryOutput {
    pub fn to_text(&self) -> String {
        match self {
            SummaryOutput::NoSelection { message } => format!("{}\n", message),
            SummaryOutput::Reach { people, percent } => format!("{}\n{}\n", people, percent),
        }
    }
}

/// Total reach versus world population.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryView;

impl Renderer for SummaryView {
    fn kind(&self) -> ViewKind {
        ViewKind::Summary
    }

    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<ViewOutput, ViewError> {
        let output = if frame.summary.is_empty() {
            SummaryOutput::NoSelection {
                message: NO_SELECTION_MESSAGE.to_string(),
            }
        } else {
            SummaryOutput::Reach {
                people: frame.summary.people_text(),
                percent: frame.summary.percent_text(),
            }
        };
        Ok(ViewOutput::Summary(output))
    }
}
