//! Hex color parsing and the lightness shift used for chart bars and legend swatches.

use plotters::style::RGBColor;

/// Returned by [`adjust_color`] for unparseable input when darkening.
pub const FALLBACK_DARK: &str = "#555555";
/// Returned by [`adjust_color`] for unparseable input when lightening (or amount 0).
pub const FALLBACK_LIGHT: &str = "#AAAAAA";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    /// Parse `#RGB` or `#RRGGBB`. The short form expands by doubling each digit.
    pub fn parse_hex(color: &str) -> Option<Self> {
        let digits = color.strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };
        let v = u32::from_str_radix(&expanded, 16).ok()?;
        Some(Self {
            r: ((v >> 16) & 0xFF) as u8,
            g: ((v >> 8) & 0xFF) as u8,
            b: (v & 0xFF) as u8,
        })
    }

    /// Add `amount` to every channel, clamping to 0..=255.
    pub fn shifted(self, amount: i32) -> Self {
        let ch = |c: u8| (c as i32).saturating_add(amount).clamp(0, 255) as u8;
        Self {
            r: ch(self.r),
            g: ch(self.g),
            b: ch(self.b),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Rgb8> for RGBColor {
    fn from(c: Rgb8) -> Self {
        RGBColor(c.r, c.g, c.b)
    }
}

/// Shift every channel of a hex color by `amount`.
///
/// Only `#RGB` / `#RRGGBB` are accepted. Anything else yields
/// [`FALLBACK_DARK`] when `amount < 0` and [`FALLBACK_LIGHT`] otherwise.
///
/// ```
/// use regionmap::color::adjust_color;
/// assert_eq!(adjust_color("#3366FF", -30), "#1548e1");
/// assert_eq!(adjust_color("#fff", 10), "#ffffff");
/// assert_eq!(adjust_color("lightgray", -30), "#555555");
/// ```
pub fn adjust_color(color: &str, amount: i32) -> String {
    match Rgb8::parse_hex(color) {
        Some(rgb) => rgb.shifted(amount).to_hex(),
        None if amount < 0 => FALLBACK_DARK.to_string(),
        None => FALLBACK_LIGHT.to_string(),
    }
}

/// Plotters color for a hex string; unparseable input maps to mid gray.
pub fn plotters_color(color: &str) -> RGBColor {
    Rgb8::parse_hex(color)
        .map(RGBColor::from)
        .unwrap_or(RGBColor(0x99, 0x99, 0x99))
}
