//! Legend panel: one row per data point with a bordered swatch and `label: value` text.
//!
//! The panel is its own SVG document so a host can place it next to the chart.

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_svg::SVGBackend;

use super::render_err;
use super::text::{estimate_text_width_px, wrap_text_to_width};
use crate::chart::LegendEntry;
use crate::color::plotters_color;
use crate::error::Result;

// Layout constants (shared by the size estimator and the drawing code)
const FONT_PX: u32 = 14;
const LINE_H: i32 = FONT_PX as i32 + 4;
const ROW_GAP: i32 = 6;
const PAD: i32 = 8;
const SWATCH: i32 = 14;
const SWATCH_TO_TEXT: i32 = 8;
const MAX_TEXT_W: u32 = 260;

/// Pixel size of the legend panel for these entries.
pub fn legend_size_px(entries: &[LegendEntry]) -> (u32, u32) {
    let mut text_w = 0u32;
    let mut h = PAD;
    for (i, e) in entries.iter().enumerate() {
        let lines = wrap_text_to_width(&e.text(), FONT_PX, MAX_TEXT_W);
        for l in &lines {
            text_w = text_w.max(estimate_text_width_px(l, FONT_PX));
        }
        h += (lines.len().max(1) as i32) * LINE_H;
        if i + 1 < entries.len() {
            h += ROW_GAP;
        }
    }
    h += PAD;
    let w = PAD + SWATCH + SWATCH_TO_TEXT + text_w as i32 + PAD;
    (w.max(1) as u32, h.max(1) as u32)
}

/// Render the legend to an SVG document string. No entries → an empty panel.
pub fn render_legend_svg(entries: &[LegendEntry]) -> Result<String> {
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, legend_size_px(entries)).into_drawing_area();
        draw_legend_panel(&root, entries)?;
        root.present().map_err(render_err)?;
    }
    Ok(buf)
}

/// Draw the entries top to bottom: swatch on the left, wrapped text to its right.
pub fn draw_legend_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    entries: &[LegendEntry],
) -> Result<()> {
    area.fill(&WHITE).map_err(render_err)?;

    let label_style =
        TextStyle::from((FontFamily::SansSerif, FONT_PX)).pos(Pos::new(HPos::Left, VPos::Center));
    let text_x = PAD + SWATCH + SWATCH_TO_TEXT;
    let mut y = PAD;

    for e in entries {
        let lines = wrap_text_to_width(&e.text(), FONT_PX, MAX_TEXT_W);
        let block_h = (lines.len().max(1) as i32) * LINE_H;

        // Swatch centered on the first line
        let sy = y + (LINE_H - SWATCH) / 2;
        let corners = [(PAD, sy), (PAD + SWATCH, sy + SWATCH)];
        area.draw(&Rectangle::new(corners, plotters_color(&e.swatch).filled()))
            .map_err(render_err)?;
        area.draw(&Rectangle::new(
            corners,
            plotters_color(&e.border).stroke_width(1),
        ))
        .map_err(render_err)?;

        for (i, line) in lines.iter().enumerate() {
            let cy = y + (i as i32) * LINE_H + LINE_H / 2;
            area.draw(&Text::new(line.as_str(), (text_x, cy), label_style.clone()))
                .map_err(render_err)?;
        }

        y += block_h + ROW_GAP;
    }
    Ok(())
}
