use super::{escape_xml, RenderFrame, Renderer, ViewError, ViewKind, ViewOutput, Viewport};
use crate::dataset::{Country, Ring};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use tracing::debug;

/// Equirectangular projection fitted to a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    scale: f64,
    min_lon: f64,
    max_lat: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Projection {
    /// Fit the bounds of `points` into `viewport`, centred.
    ///
    /// Returns `None` when there is nothing to fit or the viewport is empty.
    pub fn fit<I>(points: I, viewport: Viewport) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        if !(viewport.width > 0.0 && viewport.height > 0.0) {
            return None;
        }

        let (min_lon, max_lon, min_lat, max_lat) = points.into_iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(x0, x1, y0, y1), (lon, lat)| (x0.min(lon), x1.max(lon), y0.min(lat), y1.max(lat)),
        );
        if !min_lon.is_finite() || !min_lat.is_finite() {
            return None;
        }

        let span_x = max_lon - min_lon;
        let span_y = max_lat - min_lat;
        let scale = match (span_x > 0.0, span_y > 0.0) {
            (true, true) => (viewport.width / span_x).min(viewport.height / span_y),
            (true, false) => viewport.width / span_x,
            (false, true) => viewport.height / span_y,
            (false, false) => return None,
        };

        Some(Self {
            scale,
            min_lon,
            max_lat,
            offset_x: (viewport.width - span_x * scale) / 2.0,
            offset_y: (viewport.height - span_y * scale) / 2.0,
        })
    }

    pub fn project(&self, (lon, lat): (f64, f64)) -> (f64, f64) {
        (
            self.offset_x + (lon - self.min_lon) * self.scale,
            self.offset_y + (self.max_lat - lat) * self.scale,
        )
    }

    /// SVG path data for a set of polygons.
    fn path(&self, polygons: &[Vec<Ring>]) -> String {
        let mut d = String::new();
        for ring in polygons.iter().flatten().filter(|ring| ring.len() >= 2) {
            for (i, point) in ring.iter().enumerate() {
                let (x, y) = self.project(*point);
                let command = if i == 0 { 'M' } else { 'L' };
                let _ = write!(d, "{}{:.1},{:.1}", command, x, y);
            }
            d.push('Z');
        }
        d
    }
}

/// Hover text for one country.
pub fn tooltip_text(country_name: &str, languages: Option<&BTreeSet<String>>) -> String {
    match languages {
        Some(names) if !names.is_empty() => {
            let joined = names.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
            format!("{}\nLanguages: {}", country_name, joined)
        }
        _ => format!("{}\nNo selected language", country_name),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryPath {
    pub iso_a2: String,
    pub name: String,
    pub path: String,
    pub highlighted: bool,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapOutput {
    pub viewport: Viewport,
    pub countries: Vec<CountryPath>,
}

impl MapOutput {
    pub fn highlighted_codes(&self) -> BTreeSet<&str> {
        self.countries
            .iter()
            .filter(|country| country.highlighted)
            .map(|country| country.iso_a2.as_str())
            .collect()
    }

    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {} {}\" preserveAspectRatio=\"xMidYMid meet\">\n",
            self.viewport.width, self.viewport.height
        );
        svg.push_str(
            "<style>.country{fill:#e5e7eb;stroke:#ffffff;stroke-width:0.5}\
             .country.highlighted{fill:#2563eb}</style>\n",
        );
        for country in &self.countries {
            let class = if country.highlighted {
                "country highlighted"
            } else {
                "country"
            };
            let _ = writeln!(
                svg,
                "<path class=\"{}\" data-iso=\"{}\" d=\"{}\"><title>{}</title></path>",
                class,
                escape_xml(&country.iso_a2),
                country.path,
                escape_xml(&country.tooltip)
            );
        }
        svg.push_str("</svg>\n");
        svg
    }
}

#[derive(Debug, Clone)]
struct Outline {
    iso_a2: String,
    name: String,
    path: String,
}

/// Choropleth-style map highlighting countries present in the index.
#[derive(Debug, Clone)]
pub struct MapView {
    countries: Vec<Country>,
    viewport: Viewport,
    /// Projected outlines; empty when no projection could be fitted
    outlines: Vec<Outline>,
}

impl MapView {
    pub fn new(countries: &[Country], viewport: Viewport) -> Self {
        let mut view = Self {
            countries: countries.to_vec(),
            viewport,
            outlines: Vec::new(),
        };
        view.layout();
        view
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn layout(&mut self) {
        let projection = Projection::fit(
            self.countries.iter().flat_map(|country| country.shape.points()),
            self.viewport,
        );

        self.outlines = match projection {
            Some(projection) => self
                .countries
                .iter()
                .filter(|country| !country.shape.is_empty())
                .map(|country| Outline {
                    iso_a2: country.iso_a2.clone(),
                    name: country.name.clone(),
                    path: projection.path(&country.shape.polygons),
                })
                .collect(),
            None => Vec::new(),
        };

        debug!(
            "Map laid out at {}x{} with {} outlines",
            self.viewport.width,
            self.viewport.height,
            self.outlines.len()
        );
    }
}

impl Renderer for MapView {
    fn kind(&self) -> ViewKind {
        ViewKind::Map
    }

    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<ViewOutput, ViewError> {
        if self.outlines.is_empty() {
            return Err(ViewError::BackendUnavailable {
                kind: ViewKind::Map,
                reason: "no drawable country outlines".to_string(),
            });
        }

        let countries = self
            .outlines
            .iter()
            .map(|outline| {
                let languages = frame.index.get(&outline.iso_a2);
                CountryPath {
                    iso_a2: outline.iso_a2.clone(),
                    name: outline.name.clone(),
                    path: outline.path.clone(),
                    highlighted: !outline.iso_a2.is_empty() && languages.is_some(),
                    tooltip: tooltip_text(&outline.name, languages),
                }
            })
            .collect();

        Ok(ViewOutput::Map(MapOutput {
            viewport: self.viewport,
            countries,
        }))
    }

    fn resize(&mut self, viewport: Viewport) -> bool {
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        self.layout();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, Language, Shape};
    use crate::index;
    use crate::summary::Summary;

    // ==================== Helper Functions ====================

    fn square(iso: &str, name: &str, lon: f64, lat: f64) -> Country {
        Country {
            iso_a2: iso.to_string(),
            name: name.to_string(),
            shape: Shape {
                polygons: vec![vec![vec![
                    (lon, lat),
                    (lon + 10.0, lat),
                    (lon + 10.0, lat - 10.0),
                    (lon, lat - 10.0),
                ]]],
            },
        }
    }

    fn countries() -> Vec<Country> {
        vec![
            square("US", "United States", -100.0, 40.0),
            square("GB", "United Kingdom", 0.0, 60.0),
            square("ES", "Spain", -10.0, 40.0),
        ]
    }

    fn english() -> Language {
        Language {
            iso_code: "en".to_string(),
            name: "English".to_string(),
            total_speakers_millions: 1500.0,
            country_codes: vec!["us".to_string(), "GB".to_string()],
        }
    }

    // ==================== Projection Tests ====================

    #[test]
    fn test_projection_fits_bounds_inside_viewport() {
        let points = vec![(-180.0, 90.0), (180.0, -90.0)];
        let projection = Projection::fit(points, Viewport::new(900.0, 480.0)).unwrap();

        let (x0, y0) = projection.project((-180.0, 90.0));
        let (x1, y1) = projection.project((180.0, -90.0));
        // Width-bound: 2.5px per degree, centred vertically
        assert!(x0.abs() < 1e-9);
        assert!((x1 - 900.0).abs() < 1e-9);
        assert!((y0 - 15.0).abs() < 1e-9);
        assert!((y1 - 465.0).abs() < 1e-9);
    }

    #[test]
    fn test_projection_none_without_points_or_area() {
        assert!(Projection::fit(Vec::<(f64, f64)>::new(), Viewport::default()).is_none());
        assert!(Projection::fit(vec![(1.0, 1.0)], Viewport::default()).is_none());
        assert!(Projection::fit(vec![(0.0, 0.0), (1.0, 1.0)], Viewport::new(0.0, 10.0)).is_none());
    }

    // ==================== tooltip_text Tests ====================

    #[test]
    fn test_tooltip_lists_languages() {
        let names: BTreeSet<String> = ["Spanish", "English"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            tooltip_text("United States", Some(&names)),
            "United States\nLanguages: English, Spanish"
        );
    }

    #[test]
    fn test_tooltip_absent_and_empty_are_identical() {
        let empty = BTreeSet::new();
        assert_eq!(tooltip_text("Chad", None), "Chad\nNo selected language");
        assert_eq!(tooltip_text("Chad", Some(&empty)), tooltip_text("Chad", None));
    }

    // ==================== MapView Tests ====================

    #[test]
    fn test_render_highlights_indexed_countries() {
        let dataset = Dataset::new(vec![english()], countries());
        let selected = dataset.all_codes();
        let index = index::build(&dataset, &selected);
        let languages = dataset.selected(&selected);
        let summary = Summary::compute(languages.iter().copied());

        let mut view = MapView::new(dataset.countries(), Viewport::default());
        let frame = RenderFrame {
            selected: &languages,
            index: &index,
            summary: &summary,
        };

        let ViewOutput::Map(output) = view.render(&frame).unwrap() else {
            panic!("Expected map output");
        };
        assert_eq!(output.countries.len(), 3);
        assert_eq!(output.highlighted_codes(), BTreeSet::from(["GB", "US"]));

        let svg = output.to_svg();
        assert!(svg.contains("class=\"country highlighted\" data-iso=\"US\""));
        assert!(svg.contains("class=\"country\" data-iso=\"ES\""));
        assert!(svg.contains("Spain\nNo selected language"));
    }

    #[test]
    fn test_render_without_outlines_reports_unavailable_backend() {
        let mut view = MapView::new(&[], Viewport::default());
        let index = crate::index::CountryLanguageIndex::default();
        let summary = Summary::default();
        let frame = RenderFrame {
            selected: &[],
            index: &index,
            summary: &summary,
        };

        let err = view.render(&frame).unwrap_err();
        assert!(matches!(
            err,
            ViewError::BackendUnavailable {
                kind: ViewKind::Map,
                ..
            }
        ));
    }

    #[test]
    fn test_resize_relayouts_only_on_change() {
        let mut view = MapView::new(&countries(), Viewport::default());
        let before = view.outlines[0].path.clone();

        assert!(!view.resize(Viewport::default()));
        assert!(view.resize(Viewport::new(450.0, 240.0)));
        assert_eq!(view.viewport(), Viewport::new(450.0, 240.0));
        assert_ne!(view.outlines[0].path, before);
    }
}
