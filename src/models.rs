use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Fill for records without an explicit `color` cell and for shapes without data.
pub const DEFAULT_COLOR: &str = "lightgray";

/// One decoded spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    /// Text form of the cell, as the spreadsheet would display it.
    /// Numbers use the shortest round-trip form (`42`, `20.5`).
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Some(n.to_string()),
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Text(s) => Some(s.clone()),
        }
    }

    /// Finite numeric value of the cell, if it has one.
    /// Text cells are trimmed and parsed; booleans never count as numbers.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Empty | Cell::Bool(_) => return None,
        };
        n.is_finite().then_some(n)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(s) => f.write_str(&s),
            None => Ok(()),
        }
    }
}

/// Column name → cell. Empty cells are omitted.
pub type Row = BTreeMap<String, Cell>;

/// A normalized dataset row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionRecord {
    pub id: String,
    pub color: String,
    pub data1: f64,
    pub data2: f64,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub description: String,
}

/// Region id → record. Case-sensitive, built once per load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionIndex {
    records: BTreeMap<String, RegionRecord>,
}

impl RegionIndex {
    pub fn get(&self, id: &str) -> Option<&RegionRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted ids.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = &RegionRecord> {
        self.records.values()
    }

    /// Insert unless the id is already taken; returns false on collision.
    pub(crate) fn insert_new(&mut self, record: RegionRecord) -> bool {
        use std::collections::btree_map::Entry;
        match self.records.entry(record.id.clone()) {
            Entry::Vacant(v) => {
                v.insert(record);
                true
            }
            Entry::Occupied(_) => false,
        }
    }
}

impl FromIterator<RegionRecord> for RegionIndex {
    /// First record per id wins, matching the normalizer.
    fn from_iter<I: IntoIterator<Item = RegionRecord>>(iter: I) -> Self {
        let mut index = RegionIndex::default();
        for r in iter {
            index.insert_new(r);
        }
        index
    }
}

/// Axis / legend labels for the two numeric columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SeriesLabels {
    pub data1: String,
    pub data2: String,
}

impl Default for SeriesLabels {
    fn default() -> Self {
        Self {
            data1: "Data 1".into(),
            data2: "Data 2".into(),
        }
    }
}
