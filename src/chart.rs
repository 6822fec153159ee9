//! The chart/legend pair for the selected region.
//!
//! [`ChartPanel`] owns at most one live chart. Showing a new record always
//! destroys the previous chart before creating the next one; the legend lives
//! and dies with its chart.

use crate::color::adjust_color;
use crate::models::{RegionRecord, SeriesLabels};
use serde::Serialize;

/// Lightness shift for the first / second bar and swatch.
pub const BAR_SHIFT: [i32; 2] = [-30, 30];
/// Lightness shift for the first / second bar border and swatch border.
pub const BORDER_SHIFT: [i32; 2] = [-50, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Vec<String>,
    pub border_color: Vec<String>,
    pub border_width: u32,
}

/// Renderer-agnostic description of the bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDescriptor {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub begin_at_zero: bool,
    pub show_legend: bool,
}

impl ChartDescriptor {
    pub fn for_record(record: &RegionRecord, labels: &SeriesLabels) -> Self {
        let shifted = |amounts: [i32; 2]| {
            amounts
                .iter()
                .map(|a| adjust_color(&record.color, *a))
                .collect::<Vec<_>>()
        };
        Self {
            kind: ChartKind::Bar,
            title: record.display_name.clone(),
            labels: vec![labels.data1.clone(), labels.data2.clone()],
            datasets: vec![Dataset {
                label: record.display_name.clone(),
                data: vec![record.data1, record.data2],
                background_color: shifted(BAR_SHIFT),
                border_color: shifted(BORDER_SHIFT),
                border_width: 1,
            }],
            begin_at_zero: true,
            show_legend: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub value: f64,
    pub swatch: String,
    pub border: String,
}

impl LegendEntry {
    /// `"Data 1: 10"`; values use the shortest float form.
    pub fn text(&self) -> String {
        format!("{}: {}", self.label, self.value)
    }
}

pub fn legend_for(record: &RegionRecord, labels: &SeriesLabels) -> Vec<LegendEntry> {
    [
        (&labels.data1, record.data1, 0),
        (&labels.data2, record.data2, 1),
    ]
    .into_iter()
    .map(|(label, value, i)| LegendEntry {
        label: label.clone(),
        value,
        swatch: adjust_color(&record.color, BAR_SHIFT[i]),
        border: adjust_color(&record.color, BORDER_SHIFT[i]),
    })
    .collect()
}

/// A live chart instance with its legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedChart {
    pub region_id: String,
    /// Increments with every chart created by the owning panel.
    pub instance: u64,
    pub descriptor: ChartDescriptor,
    pub legend: Vec<LegendEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct ChartPanel {
    current: Option<RenderedChart>,
    created: u64,
}

impl ChartPanel {
    pub fn current(&self) -> Option<&RenderedChart> {
        self.current.as_ref()
    }

    /// Legend entries of the live chart; empty when cleared.
    pub fn legend(&self) -> &[LegendEntry] {
        self.current.as_ref().map(|c| c.legend.as_slice()).unwrap_or(&[])
    }

    /// Replace whatever is shown with a fresh chart for `record`.
    pub fn show(&mut self, record: &RegionRecord, labels: &SeriesLabels) -> &RenderedChart {
        self.destroy();
        self.created += 1;
        log::debug!("creating chart #{} for {}", self.created, record.id);
        self.current.insert(RenderedChart {
            region_id: record.id.clone(),
            instance: self.created,
            descriptor: ChartDescriptor::for_record(record, labels),
            legend: legend_for(record, labels),
        })
    }

    /// Destroy the chart (and with it the legend). Returns whether one was live.
    pub fn destroy(&mut self) -> bool {
        self.current.take().is_some()
    }

    pub fn clear(&mut self) {
        if self.destroy() {
            log::debug!("chart cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RegionRecord {
        RegionRecord {
            id: "R1".into(),
            color: "#3366FF".into(),
            data1: 10.0,
            data2: 20.5,
            display_name: "Region One".into(),
            description: "d".into(),
        }
    }

    #[test]
    fn descriptor_matches_record() {
        let d = ChartDescriptor::for_record(&record(), &SeriesLabels::default());
        assert_eq!(d.labels, vec!["Data 1", "Data 2"]);
        assert_eq!(d.datasets[0].data, vec![10.0, 20.5]);
        assert_eq!(
            d.datasets[0].background_color,
            vec![adjust_color("#3366FF", -30), adjust_color("#3366FF", 30)]
        );
        assert_eq!(
            d.datasets[0].border_color,
            vec![adjust_color("#3366FF", -50), adjust_color("#3366FF", 10)]
        );
        assert!(d.begin_at_zero);
        assert!(!d.show_legend);
        assert_eq!(d.title, "Region One");

        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["type"], "bar");
        assert_eq!(json["beginAtZero"], true);
        assert_eq!(json["datasets"][0]["backgroundColor"][0], "#1548e1");
    }

    #[test]
    fn legend_text_uses_shortest_number_form() {
        let entries = legend_for(&record(), &SeriesLabels::default());
        let texts: Vec<_> = entries.iter().map(LegendEntry::text).collect();
        assert_eq!(texts, vec!["Data 1: 10", "Data 2: 20.5"]);
        assert_eq!(entries[0].swatch, "#1548e1");
        assert_eq!(entries[1].border, adjust_color("#3366FF", 10));
    }

    #[test]
    fn named_colors_fall_back_to_fixed_shades() {
        let mut r = record();
        r.color = "lightgray".into();
        let entries = legend_for(&r, &SeriesLabels::default());
        assert_eq!(entries[0].swatch, "#555555");
        assert_eq!(entries[1].swatch, "#AAAAAA");
    }

    #[test]
    fn show_destroys_before_recreating() {
        let mut panel = ChartPanel::default();
        assert!(!panel.destroy());
        assert_eq!(panel.show(&record(), &SeriesLabels::default()).instance, 1);
        let mut other = record();
        other.id = "R2".into();
        let c = panel.show(&other, &SeriesLabels::default());
        assert_eq!((c.instance, c.region_id.as_str()), (2, "R2"));
        panel.clear();
        assert!(panel.current().is_none());
        assert!(panel.legend().is_empty());
    }
}
