//! Construction-time configuration.
//!
//! Every field has a default so a JSON config file only needs the keys it
//! changes:
//!
//! ```json
//! { "map": "regions.svg", "data": "https://example.org/regions.xlsx",
//!   "sheet": "2024", "labels": { "data1": "Population", "data2": "Area" } }
//! ```

use crate::error::{Error, Result};
use crate::models::SeriesLabels;
use crate::viz::RenderOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Identifiers of the panels the binder fills.
///
/// Hosts use them to locate their containers; the CLI uses them as output file stems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub map: String,
    pub tooltip: String,
    pub chart: String,
    pub description: String,
    pub legend: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            map: "map-container".into(),
            tooltip: "tooltip".into(),
            chart: "chart".into(),
            description: "description".into(),
            legend: "legend".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// SVG map source (URL or path).
    pub map: String,
    /// Dataset source (URL or path).
    pub data: String,
    /// Sheet to read; the first sheet when unset.
    pub sheet: Option<String>,
    pub labels: SeriesLabels,
    pub elements: ElementIds,
    #[serde(flatten)]
    pub render: RenderOptions,
}

impl BinderConfig {
    pub fn new(map: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            map: map.into(),
            data: data.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| Error::Parse(format!("invalid config: {e}")))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let c = BinderConfig::from_json_str(
            r#"{ "data": "d.csv", "labels": { "data1": "Population" }, "width": 640 }"#,
        )
        .unwrap();
        assert_eq!(c.data, "d.csv");
        assert_eq!(c.map, "");
        assert_eq!(c.sheet, None);
        assert_eq!(c.labels.data1, "Population");
        assert_eq!(c.labels.data2, "Data 2");
        assert_eq!(c.elements.legend, "legend");
        assert_eq!(c.render.width, 640);
        assert_eq!(c.render.height, 320);
        assert_eq!(c.render.locale, "en");
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        assert!(matches!(
            BinderConfig::from_json_str("{ nope"),
            Err(Error::Parse(_))
        ));
    }
}
