//! Utility functions for visualization: value axis, tick formatting, locale mapping.

use num_format::{Locale, ToFormattedString};

use super::text::estimate_text_width_px;

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'), // default
    }
}

/// Largest magnitude the axis spans; bigger values are drawn at the axis edge.
const AXIS_LIMIT: f64 = f64::MAX / 16.0;
/// Upper bound on the number of tick intervals.
const MAX_TICK_INTERVALS: usize = 64;

/// A zero-based linear value axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueAxis {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ValueAxis {
    /// Axis spanning 0 and every value, rounded outward to a "nice" step.
    pub fn zero_based(values: &[f64], ticks: usize) -> Self {
        let lo = values.iter().copied().fold(0.0f64, f64::min).max(-AXIS_LIMIT);
        let hi = values.iter().copied().fold(0.0f64, f64::max).min(AXIS_LIMIT);
        let ticks = ticks.max(1) as f64;
        if hi - lo < f64::EPSILON {
            return Self {
                min: 0.0,
                max: 1.0,
                step: 1.0 / ticks,
            };
        }
        let step = nice_step((hi - lo) / ticks);
        Self {
            min: (lo / step).floor() * step,
            max: (hi / step).ceil() * step,
            step,
        }
    }

    pub fn tick_values(&self) -> Vec<f64> {
        let n = (self.max / self.step - self.min / self.step).round();
        let n = if n.is_finite() && n > 0.0 {
            (n as usize).min(MAX_TICK_INTERVALS)
        } else {
            0
        };
        (0..=n).map(|i| self.min + self.step * i as f64).collect()
    }

    /// Fraction of the axis height at which `v` sits (0 = bottom), clamped to `[0, 1]`.
    pub fn fraction(&self, v: f64) -> f64 {
        let f = (v / 2.0 - self.min / 2.0) / (self.max / 2.0 - self.min / 2.0);
        if f.is_nan() { 0.0 } else { f.clamp(0.0, 1.0) }
    }
}

/// Round `raw` up to 1, 2, 2.5 or 5 times a power of ten.
pub fn nice_step(raw: f64) -> f64 {
    if !(raw.is_finite() && raw > 0.0) {
        return 1.0;
    }
    let base = 10f64.powf(raw.log10().floor());
    let f = raw / base;
    let nice = if f <= 1.0 {
        1.0
    } else if f <= 2.0 {
        2.0
    } else if f <= 2.5 {
        2.5
    } else if f <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * base
}

/// Tick label: thousands separators for large magnitudes, fewer decimals as values grow.
pub fn format_tick(v: f64, locale: &Locale, dec_sep: char) -> String {
    let a = v.abs();
    if a >= 1000.0 {
        return (v.round() as i64).to_formatted_string(locale);
    }
    let prec = if a >= 100.0 || v.fract() == 0.0 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    let s = format!("{:.*}", prec, v);
    if dec_sep == '.' { s } else { s.replace('.', &dec_sep.to_string()) }
}

/// Width in pixels for the left label area, from the widest tick label.
pub fn compute_left_label_area_px(labels: &[String], font_px: u32) -> u32 {
    let max_px = labels
        .iter()
        .map(|s| estimate_text_width_px(s, font_px))
        .max()
        .unwrap_or(0);
    // Tick marks and a little breathing room.
    max_px.saturating_add(14).clamp(32, 120)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_always_includes_zero() {
        let ax = ValueAxis::zero_based(&[10.0, 20.5], 5);
        assert_eq!((ax.min, ax.max, ax.step), (0.0, 25.0, 5.0));
        assert_eq!(ax.tick_values().len(), 6);

        let neg = ValueAxis::zero_based(&[-3.0, 7.0], 5);
        assert!(neg.min <= -3.0 && neg.max >= 7.0);
        assert!(neg.tick_values().contains(&0.0));
    }

    #[test]
    fn degenerate_axis_is_unit_range() {
        let ax = ValueAxis::zero_based(&[0.0, 0.0], 5);
        assert_eq!((ax.min, ax.max), (0.0, 1.0));
        assert_eq!(ax.fraction(0.5), 0.5);
    }

    #[test]
    fn huge_finite_values_keep_a_bounded_axis() {
        for values in [[1.7e308, 1.0], [1e308, -1e308], [f64::MAX, f64::MIN]] {
            let ax = ValueAxis::zero_based(&values, 5);
            assert!(ax.min.is_finite() && ax.max.is_finite() && ax.step.is_finite());
            let ticks = ax.tick_values();
            assert!(!ticks.is_empty() && ticks.len() <= MAX_TICK_INTERVALS + 1);
            assert!(ticks.iter().all(|t| t.is_finite()));
            assert_eq!(ax.fraction(values[0]), 1.0);
            assert!((0.0..=1.0).contains(&ax.fraction(values[1])));
        }
    }

    #[test]
    fn nice_steps() {
        assert_eq!(nice_step(4.1), 5.0);
        assert!((nice_step(0.13) - 0.2).abs() < 1e-12);
        assert_eq!(nice_step(2200.0), 2500.0);
        assert_eq!(nice_step(0.0), 1.0);
    }

    #[test]
    fn ticks_are_locale_aware() {
        let (en_locale, en_sep) = map_locale("en");
        let (de_locale, de_sep) = map_locale("DE");
        assert_eq!(format_tick(25000.0, en_locale, en_sep), "25,000");
        assert_eq!(format_tick(25000.0, de_locale, de_sep), "25.000");
        assert_eq!(format_tick(2.5, de_locale, de_sep), "2,50");
        assert_eq!(format_tick(15.0, en_locale, en_sep), "15");
        assert_eq!(format_tick(12.5, en_locale, en_sep), "12.5");
    }
}
