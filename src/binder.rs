//! [`RegionDataBinder`]: load the map and the dataset, bind records to shapes,
//! and drive the tooltip, detail panel and chart from pointer events.
//!
//! A host forwards its events:
//!
//! ```no_run
//! use regionmap::{BinderConfig, Client, RegionDataBinder};
//!
//! let config = BinderConfig::new("regions.svg", "https://example.org/regions.xlsx");
//! let mut binder = RegionDataBinder::initialize(config, &Client::default());
//! println!("{}", binder.status());
//!
//! if let Some(shape) = binder.shape_handle("R1") {
//!     binder.pointer_move(shape, 120.0, 80.0);
//!     binder.click(shape);
//! }
//! let svg = binder.render_svg()?;
//! # Ok::<(), regionmap::Error>(())
//! ```
//!
//! Everything is built once. To pick up changed data, construct a new binder.

use crate::api::Client;
use crate::chart::{ChartPanel, RenderedChart};
use crate::config::BinderConfig;
use crate::error::{Error, Result};
use crate::map::{MapDocument, ShapeDecoration, ShapeKind, ShapeStyle, base_stylesheet};
use crate::models::{DEFAULT_COLOR, RegionIndex, RegionRecord};
use crate::normalize::{Normalized, RowRejected, normalize};
use crate::status::{Severity, Status};
use crate::viz::{self, render_legend_svg};
use crate::workbook;

pub const FILL_OPACITY: f64 = 0.8;
pub const FALLBACK_FILL: &str = DEFAULT_COLOR;
pub const DEFAULT_STROKE: &str = "#333333";
pub const DEFAULT_STROKE_WIDTH: f64 = 0.5;
pub const HIGHLIGHT_STROKE_WIDTH: f64 = 3.0;
/// Tooltip position relative to the pointer.
pub const TOOLTIP_OFFSET: (f64, f64) = (10.0, 10.0);

/// Position of a shape in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeHandle(pub usize);

/// Which handlers a shape carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Hover and click.
    Selectable,
    /// Hover only; the shape has no data.
    HoverOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeBinding {
    pub id: String,
    pub kind: ShapeKind,
    pub record: Option<RegionRecord>,
    pub style: ShapeStyle,
    pub interaction: Interaction,
}

impl ShapeBinding {
    fn new(id: &str, kind: ShapeKind, record: Option<&RegionRecord>) -> Self {
        let (fill, interaction) = match record {
            Some(r) => (r.color.clone(), Interaction::Selectable),
            None => (FALLBACK_FILL.to_string(), Interaction::HoverOnly),
        };
        Self {
            id: id.to_string(),
            kind,
            record: record.cloned(),
            style: ShapeStyle {
                fill,
                fill_opacity: FILL_OPACITY,
                stroke: DEFAULT_STROKE.into(),
                stroke_width: DEFAULT_STROKE_WIDTH,
            },
            interaction,
        }
    }

    /// Text shown while hovering.
    pub fn tooltip_text(&self) -> String {
        match &self.record {
            Some(r) => r.display_name.clone(),
            None => format!("{}: no data", self.id),
        }
    }

    fn reset_stroke(&mut self) {
        self.style.stroke = DEFAULT_STROKE.into();
        self.style.stroke_width = DEFAULT_STROKE_WIDTH;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tooltip {
    pub visible: bool,
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Contents of the description panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailPanel {
    pub title: Option<String>,
    pub body: String,
}

impl DetailPanel {
    fn message(body: impl Into<String>) -> Self {
        Self {
            title: None,
            body: body.into(),
        }
    }

    pub fn to_text(&self) -> String {
        match &self.title {
            Some(t) => format!("{t}\n\n{}", self.body),
            None => self.body.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegionDataBinder {
    config: BinderConfig,
    map: Option<MapDocument>,
    index: RegionIndex,
    rejected: Vec<RowRejected>,
    bindings: Vec<ShapeBinding>,
    selected: Option<ShapeHandle>,
    tooltip: Tooltip,
    detail: DetailPanel,
    chart: ChartPanel,
    status: Status,
}

impl RegionDataBinder {
    /// Load, normalize and bind. Never fails: a fatal error leaves an empty
    /// binder whose status and detail panel carry the message.
    pub fn initialize(config: BinderConfig, client: &Client) -> Self {
        match Self::try_initialize(config.clone(), client) {
            Ok(b) => b,
            Err(e) => {
                log::error!("initialization failed: {e}");
                Self::failed(config, &e)
            }
        }
    }

    /// Like [`Self::initialize`] but returns the typed error.
    pub fn try_initialize(config: BinderConfig, client: &Client) -> Result<Self> {
        let map = MapDocument::load(client, &config.map)?;
        let normalized = load_dataset(&config, client)?;
        Ok(Self::from_parts(config, map, normalized))
    }

    /// Bind an already-parsed map to already-normalized data.
    pub fn from_parts(config: BinderConfig, map: MapDocument, normalized: Normalized) -> Self {
        let mut b = Self {
            config,
            map: Some(map),
            index: normalized.index,
            rejected: normalized.rejected,
            bindings: Vec::new(),
            selected: None,
            tooltip: Tooltip::default(),
            detail: DetailPanel::default(),
            chart: ChartPanel::default(),
            status: Status::NoShapes,
        };
        b.bind();
        b
    }

    fn failed(config: BinderConfig, e: &Error) -> Self {
        let status = Status::Failed(e.to_string());
        Self {
            config,
            map: None,
            index: RegionIndex::default(),
            rejected: Vec::new(),
            bindings: Vec::new(),
            selected: None,
            tooltip: Tooltip::default(),
            detail: DetailPanel::message(status.to_string()),
            chart: ChartPanel::default(),
            status,
        }
    }

    /// (Re)compute every shape binding from the map and the index, then the status.
    /// Clears selection, tooltip and chart; running it twice gives the same state.
    pub fn bind(&mut self) {
        let Some(map) = &self.map else {
            return;
        };
        self.bindings = map
            .shapes()
            .iter()
            .map(|s| ShapeBinding::new(&s.id, s.kind, self.index.get(&s.id)))
            .collect();
        self.selected = None;
        self.tooltip = Tooltip::default();
        self.chart.clear();
        self.status = Status::evaluate(self.bindings.iter().map(|b| b.id.as_str()), &self.index);
        match self.status.severity() {
            Severity::Success => log::info!("{}", self.status),
            _ => log::warn!("{}", self.status),
        }
        self.detail = DetailPanel::message(self.status.to_string());
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn index(&self) -> &RegionIndex {
        &self.index
    }

    pub fn rejected(&self) -> &[RowRejected] {
        &self.rejected
    }

    pub fn bindings(&self) -> &[ShapeBinding] {
        &self.bindings
    }

    pub fn binding(&self, shape: ShapeHandle) -> Option<&ShapeBinding> {
        self.bindings.get(shape.0)
    }

    /// First shape carrying `id`.
    pub fn shape_handle(&self, id: &str) -> Option<ShapeHandle> {
        self.bindings.iter().position(|b| b.id == id).map(ShapeHandle)
    }

    pub fn selected(&self) -> Option<ShapeHandle> {
        self.selected
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn detail(&self) -> &DetailPanel {
        &self.detail
    }

    pub fn chart(&self) -> Option<&RenderedChart> {
        self.chart.current()
    }

    /// Pointer moved over a shape: show its tooltip next to the pointer.
    pub fn pointer_move(&mut self, shape: ShapeHandle, x: f64, y: f64) -> Option<&Tooltip> {
        let text = self.bindings.get(shape.0)?.tooltip_text();
        self.tooltip = Tooltip {
            visible: true,
            text,
            x: x + TOOLTIP_OFFSET.0,
            y: y + TOOLTIP_OFFSET.1,
        };
        Some(&self.tooltip)
    }

    /// Pointer left a shape.
    pub fn pointer_leave(&mut self, shape: ShapeHandle) {
        if self.bindings.get(shape.0).is_some() {
            self.tooltip.visible = false;
        }
    }

    /// Click on a shape. Returns false (and changes nothing) for shapes without data.
    pub fn click(&mut self, shape: ShapeHandle) -> bool {
        let record = match self.bindings.get(shape.0) {
            Some(ShapeBinding {
                interaction: Interaction::Selectable,
                record: Some(r),
                ..
            }) => r.clone(),
            _ => return false,
        };

        for b in &mut self.bindings {
            b.reset_stroke();
        }
        let clicked = &mut self.bindings[shape.0];
        clicked.style.stroke = record.color.clone();
        clicked.style.stroke_width = HIGHLIGHT_STROKE_WIDTH;
        self.selected = Some(shape);

        self.detail = DetailPanel {
            title: Some(record.display_name.clone()),
            body: record.description.clone(),
        };
        self.show_chart(&record.id);
        log::debug!("selected {}", record.id);
        true
    }

    /// Render the chart and legend for `id`. Without a record the chart and
    /// legend are cleared instead; this is not an error.
    pub fn show_chart(&mut self, id: &str) -> Option<&RenderedChart> {
        match self.index.get(id) {
            Some(record) => Some(self.chart.show(record, &self.config.labels)),
            None => {
                log::debug!("no record for {id}; clearing chart");
                self.chart.clear();
                None
            }
        }
    }

    /// Select a region by id, as if its first shape was clicked. Ids without a
    /// selectable shape reset the selection.
    pub fn select(&mut self, id: &str) -> bool {
        if let Some(h) = self.shape_handle(id)
            && self.click(h)
        {
            return true;
        }
        self.reset_selection();
        false
    }

    /// Drop the highlight, the chart and the legend.
    pub fn reset_selection(&mut self) {
        for b in &mut self.bindings {
            b.reset_stroke();
        }
        self.selected = None;
        self.chart.clear();
    }

    /// The map with fills, strokes, tooltips and the shared stylesheet applied.
    pub fn render_svg(&self) -> Result<String> {
        let map = self
            .map
            .as_ref()
            .ok_or_else(|| Error::Render("no map loaded".into()))?;
        let decorations: Vec<ShapeDecoration> = self
            .bindings
            .iter()
            .map(|b| ShapeDecoration {
                style: b.style.clone(),
                title: b.tooltip_text(),
            })
            .collect();
        map.render(
            &base_stylesheet(DEFAULT_STROKE, DEFAULT_STROKE_WIDTH),
            &decorations,
        )
    }

    /// Chart SVG for the current selection, if any.
    pub fn render_chart_svg(&self) -> Result<Option<String>> {
        self.chart
            .current()
            .map(|c| viz::render_chart_svg(&c.descriptor, &self.config.render))
            .transpose()
    }

    /// Legend SVG for the current selection; an empty panel when nothing is selected.
    pub fn render_legend_svg(&self) -> Result<String> {
        render_legend_svg(self.chart.legend())
    }
}

/// Fetch, decode and normalize the configured dataset.
pub fn load_dataset(config: &BinderConfig, client: &Client) -> Result<Normalized> {
    let bytes = client.fetch_bytes(&config.data)?;
    let wb = workbook::decode(&bytes)?;
    let sheet = wb.sheet(config.sheet.as_deref())?;
    log::info!(
        "read {} row(s) from sheet \"{}\" of {}",
        sheet.rows.len(),
        sheet.name,
        config.data
    );
    Ok(normalize(&sheet.rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, Row};

    const MAP: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
        <path id="R1" d="M0 0h10v10z"/>
        <polygon id="R2" points="0,0 1,1 1,0"/>
        <circle id="R9" cx="1" cy="1" r="1"/>
    </svg>"#;

    fn row(id: &str, color: &str, d1: &str, d2: &str) -> Row {
        [("id", id), ("color", color), ("data1", d1), ("data2", d2)]
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.to_string(), Cell::Text(v.to_string())))
            .collect()
    }

    fn binder() -> RegionDataBinder {
        let rows = vec![
            row("R1", "#3366FF", "10", "20.5"),
            row("R2", "", "1", "2"),
            row("R5", "#000", "1", "2"),
        ];
        RegionDataBinder::from_parts(
            BinderConfig::default(),
            MapDocument::parse(MAP).unwrap(),
            normalize(&rows),
        )
    }

    #[test]
    fn fills_follow_records_and_fallback() {
        let b = binder();
        let fills: Vec<_> = b
            .bindings()
            .iter()
            .map(|x| (x.id.as_str(), x.style.fill.as_str(), x.interaction))
            .collect();
        assert_eq!(
            fills,
            vec![
                ("R1", "#3366FF", Interaction::Selectable),
                ("R2", "lightgray", Interaction::Selectable),
                ("R9", "lightgray", Interaction::HoverOnly),
            ]
        );
        assert!(b.bindings().iter().all(|x| x.style.fill_opacity == 0.8));
        assert_eq!(b.status(), &Status::Bound { matched: 2 });
    }

    #[test]
    fn hover_shows_offset_tooltip_and_leave_hides_it() {
        let mut b = binder();
        let r1 = b.shape_handle("R1").unwrap();
        let t = b.pointer_move(r1, 100.0, 50.0).unwrap().clone();
        assert_eq!(
            t,
            Tooltip {
                visible: true,
                text: "R1".into(),
                x: 110.0,
                y: 60.0
            }
        );
        let r9 = b.shape_handle("R9").unwrap();
        assert_eq!(b.pointer_move(r9, 0.0, 0.0).unwrap().text, "R9: no data");
        b.pointer_leave(r9);
        assert!(!b.tooltip().visible);
    }

    #[test]
    fn click_highlights_only_latest_shape() {
        let mut b = binder();
        let r1 = b.shape_handle("R1").unwrap();
        let r2 = b.shape_handle("R2").unwrap();
        assert!(b.click(r1));
        assert!(b.click(r2));
        let highlighted: Vec<_> = b
            .bindings()
            .iter()
            .filter(|x| x.style.stroke_width == HIGHLIGHT_STROKE_WIDTH)
            .map(|x| x.id.as_str())
            .collect();
        assert_eq!(highlighted, vec!["R2"]);
        let first = b.binding(r1).unwrap();
        assert_eq!(first.style.stroke, DEFAULT_STROKE);
        assert_eq!(first.style.stroke_width, DEFAULT_STROKE_WIDTH);
        assert_eq!(b.binding(r2).unwrap().style.stroke, "lightgray");
        assert_eq!(b.selected(), Some(r2));
        assert_eq!(b.chart().unwrap().region_id, "R2");
        assert_eq!(b.chart().unwrap().instance, 2);
    }

    #[test]
    fn click_on_shape_without_data_is_ignored() {
        let mut b = binder();
        let r1 = b.shape_handle("R1").unwrap();
        b.click(r1);
        let before = b.bindings().to_vec();
        assert!(!b.click(b.shape_handle("R9").unwrap()));
        assert!(!b.click(ShapeHandle(99)));
        assert_eq!(b.bindings(), before.as_slice());
        assert_eq!(b.chart().unwrap().region_id, "R1");
    }

    #[test]
    fn click_fills_detail_panel() {
        let mut b = binder();
        b.select("R1");
        assert_eq!(b.detail().title.as_deref(), Some("R1"));
        assert_eq!(b.detail().body, "No description available for R1.");
    }

    #[test]
    fn show_chart_without_record_clears() {
        let mut b = binder();
        b.select("R1");
        assert!(b.chart().is_some());
        assert!(b.show_chart("nope").is_none());
        assert!(b.chart().is_none());
        assert!(b.render_chart_svg().unwrap().is_none());
        assert!(b.render_legend_svg().is_ok());
    }

    #[test]
    fn select_unknown_id_resets_selection() {
        let mut b = binder();
        assert!(b.select("R1"));
        assert!(!b.select("R5")); // data but no shape
        assert_eq!(b.selected(), None);
        assert!(b.chart().is_none());
        assert!(
            b.bindings()
                .iter()
                .all(|x| x.style.stroke_width == DEFAULT_STROKE_WIDTH)
        );
    }

    #[test]
    fn bind_is_idempotent() {
        let mut b = binder();
        b.select("R1");
        b.bind();
        let once = b.bindings().to_vec();
        let status = b.status().clone();
        b.bind();
        assert_eq!(b.bindings(), once.as_slice());
        assert_eq!(b.status(), &status);
        assert!(b.chart().is_none());
    }

    #[test]
    fn rendered_svg_carries_styles_and_titles() {
        let mut b = binder();
        b.select("R1");
        let svg = b.render_svg().unwrap();
        assert!(svg.contains("fill: #3366FF; fill-opacity: 0.8; stroke: #3366FF; stroke-width: 3"));
        assert!(svg.contains("<title>R9: no data</title>"));
        assert!(svg.contains("<style>"));
        assert!(b.render_chart_svg().unwrap().is_some());
    }

    #[test]
    fn failed_binder_reports_in_detail_panel() {
        let cfg = BinderConfig::new("/no/such/map.svg", "/no/such/data.csv");
        let b = RegionDataBinder::initialize(cfg, &Client::default());
        assert!(matches!(b.status(), Status::Failed(_)));
        assert!(b.detail().body.starts_with("Failed to initialize the map"));
        assert!(b.bindings().is_empty());
        assert!(b.render_svg().is_err());
    }
}
