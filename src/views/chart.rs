use super::{escape_xml, RenderFrame, Renderer, ViewError, ViewKind, ViewOutput};
use std::f64::consts::PI;
use std::fmt;
use std::fmt::Write as _;

/// Slice colours, cycled when more languages are selected than colours exist.
pub const PALETTE: [&str; 15] = [
    "#2563eb", "#f97316", "#10b981", "#ef4444", "#8b5cf6", "#14b8a6", "#f59e0b", "#ec4899",
    "#3b82f6", "#a3e635", "#0ea5e9", "#9333ea", "#e11d48", "#22c55e", "#6366f1",
];

/// Shown in place of the pie while nothing is selected.
const PLACEHOLDER_TEXT: &str = "Select at least one language to see its share";

const SIZE: f64 = 320.0;
const RADIUS: f64 = 150.0;
const LEGEND_ROW: f64 = 20.0;

/// One pie slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    /// Speakers, in millions
    pub value: f64,
    pub color: &'static str,
    /// Percentage of the selected total
    pub share: f64,
    pub tooltip: String,
}

/// Tooltip label: "<label>: <value>M (<share>%)".
pub fn default_tooltip_label(slice: &Slice) -> String {
    if slice.share == 0.0 && slice.value == 0.0 {
        format!("{}: {:.0}M (0%)", slice.label, slice.value)
    } else {
        format!("{}: {:.0}M ({:.1}%)", slice.label, slice.value, slice.share)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOutput {
    pub slices: Vec<Slice>,
    pub placeholder_visible: bool,
}

impl ChartOutput {
    pub fn labels(&self) -> Vec<&str> {
        self.slices.iter().map(|slice| slice.label.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.slices.iter().map(|slice| slice.value).collect()
    }

    pub fn to_svg(&self) -> String {
        let height = SIZE + LEGEND_ROW * self.slices.len() as f64;
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {} {}\">\n",
            SIZE, height
        );

        if self.placeholder_visible {
            let _ = writeln!(
                svg,
                "<text x=\"{c}\" y=\"{c}\" text-anchor=\"middle\">{}</text>",
                PLACEHOLDER_TEXT,
                c = SIZE / 2.0
            );
        } else {
            self.write_slices(&mut svg);
        }

        for (row, slice) in self.slices.iter().enumerate() {
            let y = SIZE + LEGEND_ROW * row as f64 + 14.0;
            let _ = writeln!(
                svg,
                "<rect x=\"10\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{}\"/>\
                 <text x=\"28\" y=\"{:.1}\">{}</text>",
                y - 10.0,
                slice.color,
                y,
                escape_xml(&slice.label)
            );
        }

        svg.push_str("</svg>\n");
        svg
    }

    fn write_slices(&self, svg: &mut String) {
        let center = SIZE / 2.0;
        let point = |angle: f64| {
            (
                center + RADIUS * angle.cos(),
                center + RADIUS * angle.sin(),
            )
        };

        let mut angle = -PI / 2.0;
        for slice in self.slices.iter().filter(|slice| slice.share > 0.0) {
            let title = escape_xml(&slice.tooltip);
            if slice.share >= 100.0 {
                let _ = writeln!(
                    svg,
                    "<circle cx=\"{c}\" cy=\"{c}\" r=\"{}\" fill=\"{}\" stroke=\"#ffffff\" stroke-width=\"2\"><title>{}</title></circle>",
                    RADIUS,
                    slice.color,
                    title,
                    c = center
                );
                continue;
            }

            let sweep = slice.share / 100.0 * 2.0 * PI;
            let (x1, y1) = point(angle);
            let (x2, y2) = point(angle + sweep);
            let large_arc = if sweep > PI { 1 } else { 0 };
            let _ = writeln!(
                svg,
                "<path d=\"M{c:.1},{c:.1} L{:.1},{:.1} A{r},{r} 0 {} 1 {:.1},{:.1} Z\" fill=\"{}\" stroke=\"#ffffff\" stroke-width=\"2\"><title>{}</title></path>",
                x1,
                y1,
                large_arc,
                x2,
                y2,
                slice.color,
                title,
                c = center,
                r = RADIUS
            );
            angle += sweep;
        }
    }
}

/// Pie chart of relative speaker share among the selected languages.
#[derive(Clone)]
pub struct ChartView {
    label_formatter: fn(&Slice) -> String,
}

impl fmt::Debug for ChartView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartView").finish_non_exhaustive()
    }
}

impl ChartView {
    pub fn new() -> Self {
        Self {
            label_formatter: default_tooltip_label,
        }
    }

    /// Use a custom tooltip label formatter.
    pub fn with_label_formatter(mut self, formatter: fn(&Slice) -> String) -> Self {
        self.label_formatter = formatter;
        self
    }
}

impl Default for ChartView {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for ChartView {
    fn kind(&self) -> ViewKind {
        ViewKind::Chart
    }

    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<ViewOutput, ViewError> {
        let total: f64 = frame
            .selected
            .iter()
            .map(|language| language.total_speakers_millions)
            .sum();

        let slices = frame
            .selected
            .iter()
            .enumerate()
            .map(|(position, language)| {
                let value = language.total_speakers_millions;
                let share = if total > 0.0 { value / total * 100.0 } else { 0.0 };
                let mut slice = Slice {
                    label: language.name.clone(),
                    value,
                    color: PALETTE[position % PALETTE.len()],
                    share,
                    tooltip: String::new(),
                };
                slice.tooltip = (self.label_formatter)(&slice);
                slice
            })
            .collect();

        Ok(ViewOutput::Chart(ChartOutput {
            slices,
            placeholder_visible: frame.selected.is_empty(),
        }))
    }
}
