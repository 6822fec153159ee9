//! Visualization: render the selected region's bar chart and legend to **SVG**.
//!
//! - Bars and borders use the colors carried by the [`ChartDescriptor`]
//! - Zero-based value axis with "nice" ticks and locale-aware tick labels
//! - No legend inside the chart; the legend is a separate panel ([`legend`])
//!
//! Drawing only emits shapes and positioned text, so no font metrics are
//! needed at render time.

pub mod legend;
pub mod text;
pub mod types;
pub mod util;

pub use legend::render_legend_svg;
pub use types::RenderOptions;

use crate::chart::ChartDescriptor;
use crate::color::plotters_color;
use crate::error::{Error, Result};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_svg::SVGBackend;

use text::truncate_to_width;
use util::{ValueAxis, compute_left_label_area_px, format_tick, map_locale};

const MARGIN: i32 = 16;
const TITLE_FONT_PX: u32 = 18;
const LABEL_FONT_PX: u32 = 12;
const BOTTOM_LABEL_H: i32 = 28;
const Y_TICKS: usize = 5;
/// Share of each category slot covered by its bar.
const BAR_FILL: f64 = 0.6;

pub(crate) fn render_err<E: std::fmt::Debug>(e: E) -> Error {
    Error::Render(format!("{e:?}"))
}

/// Draw `chart` into an SVG document string.
pub fn render_chart_svg(chart: &ChartDescriptor, opts: &RenderOptions) -> Result<String> {
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, (opts.width, opts.height)).into_drawing_area();
        draw_bar_chart(&root, chart, &opts.locale)?;
        root.present().map_err(render_err)?;
    }
    Ok(buf)
}

/// Helper that draws to any Plotters backend.
fn draw_bar_chart<DB>(
    root: &DrawingArea<DB, Shift>,
    chart: &ChartDescriptor,
    locale_tag: &str,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(render_err)?;
    let (w, h) = root.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);

    let Some(dataset) = chart.datasets.first() else {
        return Ok(());
    };
    let values = &dataset.data;

    let axis = ValueAxis::zero_based(values, Y_TICKS);
    let (num_locale, dec_sep) = map_locale(locale_tag);
    let ticks: Vec<(f64, String)> = axis
        .tick_values()
        .into_iter()
        .map(|v| (v, format_tick(v, num_locale, dec_sep)))
        .collect();
    let tick_labels: Vec<String> = ticks.iter().map(|(_, s)| s.clone()).collect();

    // ----------------------------
    // Plot rectangle
    // ----------------------------
    let x0 = MARGIN + compute_left_label_area_px(&tick_labels, LABEL_FONT_PX) as i32;
    let x1 = (w - MARGIN).max(x0 + 1);
    let y0 = MARGIN + TITLE_FONT_PX as i32 + 12;
    let y1 = (h - MARGIN - BOTTOM_LABEL_H).max(y0 + 1);
    let to_px = |v: f64| y1 - (axis.fraction(v) * (y1 - y0) as f64).round() as i32;

    // Title, centered; cut to the canvas width
    let title = truncate_to_width(&chart.title, TITLE_FONT_PX, (w - 2 * MARGIN).max(0) as u32);
    root.draw(&Text::new(
        title,
        (w / 2, MARGIN),
        TextStyle::from((FontFamily::SansSerif, TITLE_FONT_PX)).pos(Pos::new(HPos::Center, VPos::Top)),
    ))
    .map_err(render_err)?;

    // Grid lines and Y tick labels
    let grid = RGBColor(225, 225, 225).stroke_width(1);
    let tick_style =
        TextStyle::from((FontFamily::SansSerif, LABEL_FONT_PX)).pos(Pos::new(HPos::Right, VPos::Center));
    for (v, label) in ticks {
        let y = to_px(v);
        root.draw(&PathElement::new(vec![(x0, y), (x1, y)], grid))
            .map_err(render_err)?;
        root.draw(&Text::new(label, (x0 - 6, y), tick_style.clone()))
            .map_err(render_err)?;
    }

    // Bars
    let n = values.len().max(1) as i32;
    let slot_w = (x1 - x0) / n;
    let bar_w = ((slot_w as f64) * BAR_FILL).round() as i32;
    let zero_y = to_px(0.0);
    let x_label_style =
        TextStyle::from((FontFamily::SansSerif, LABEL_FONT_PX)).pos(Pos::new(HPos::Center, VPos::Top));
    for (i, v) in values.iter().enumerate() {
        let cx = x0 + slot_w * i as i32 + slot_w / 2;
        let (bx0, bx1) = (cx - bar_w / 2, cx + bar_w / 2);
        let top = to_px(v.max(0.0));
        let bottom = to_px(v.min(0.0));
        let fill = dataset
            .background_color
            .get(i)
            .map(|c| plotters_color(c))
            .unwrap_or(BLACK);
        root.draw(&Rectangle::new([(bx0, top), (bx1, bottom)], fill.filled()))
            .map_err(render_err)?;
        if dataset.border_width > 0
            && let Some(border) = dataset.border_color.get(i)
        {
            root.draw(&Rectangle::new(
                [(bx0, top), (bx1, bottom)],
                plotters_color(border).stroke_width(dataset.border_width),
            ))
            .map_err(render_err)?;
        }

        if let Some(label) = chart.labels.get(i) {
            let label = truncate_to_width(label, LABEL_FONT_PX, slot_w.max(0) as u32);
            root.draw(&Text::new(label, (cx, y1 + 8), x_label_style.clone()))
                .map_err(render_err)?;
        }
    }

    // Axes on top of the bars
    let axis_style = BLACK.stroke_width(1);
    root.draw(&PathElement::new(vec![(x0, y0), (x0, y1)], axis_style))
        .map_err(render_err)?;
    root.draw(&PathElement::new(vec![(x0, zero_y), (x1, zero_y)], axis_style))
        .map_err(render_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RegionRecord, SeriesLabels};

    fn descriptor(data1: f64, data2: f64) -> ChartDescriptor {
        ChartDescriptor::for_record(
            &RegionRecord {
                id: "R1".into(),
                color: "#3366FF".into(),
                data1,
                data2,
                display_name: "Region One".into(),
                description: String::new(),
            },
            &SeriesLabels::default(),
        )
    }

    #[test]
    fn chart_svg_has_bars_in_derived_colors() {
        let svg = render_chart_svg(&descriptor(10.0, 20.5), &RenderOptions::default()).unwrap();
        assert!(svg.contains("<svg"));
        let upper = svg.to_uppercase();
        assert!(upper.contains("#1548E1"), "darker bar present");
        assert!(upper.contains("#5184FF"), "lighter bar present");
        assert!(svg.contains("Data 1"));
        assert!(svg.contains("Data 2"));
        assert!(svg.contains("Region One"));
    }

    #[test]
    fn negative_and_zero_values_render() {
        assert!(render_chart_svg(&descriptor(-5.0, 0.0), &RenderOptions::default()).is_ok());
        assert!(render_chart_svg(&descriptor(0.0, 0.0), &RenderOptions::default()).is_ok());
    }

    #[test]
    fn extreme_finite_values_render() {
        let opts = RenderOptions::default();
        assert!(render_chart_svg(&descriptor(1.7e308, 1.0), &opts).is_ok());
        assert!(render_chart_svg(&descriptor(1e308, -1e308), &opts).is_ok());
    }

    #[test]
    fn tiny_canvas_does_not_fail() {
        let opts = RenderOptions {
            width: 10,
            height: 10,
            ..RenderOptions::default()
        };
        assert!(render_chart_svg(&descriptor(1.0, 2.0), &opts).is_ok());
    }
}
