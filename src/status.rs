//! The single aggregate status line shown after binding.

use crate::models::RegionIndex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Status {
    /// The map contains no bindable shapes.
    NoShapes,
    /// The dataset produced no valid records.
    NoRecords,
    /// Records and shapes exist but no id is shared; both sets are listed sorted.
    NoOverlap {
        shape_ids: Vec<String>,
        record_ids: Vec<String>,
    },
    /// `matched` shapes received data-backed styling.
    Bound { matched: usize },
    /// Initialization failed; nothing was bound.
    Failed(String),
}

impl Status {
    /// Evaluate binding coverage. Pure; calling it twice gives the same answer.
    pub fn evaluate<'a>(shape_ids: impl IntoIterator<Item = &'a str>, index: &RegionIndex) -> Self {
        let shape_ids: Vec<&str> = shape_ids.into_iter().collect();
        if shape_ids.is_empty() {
            return Status::NoShapes;
        }
        if index.is_empty() {
            return Status::NoRecords;
        }
        let matched = shape_ids.iter().filter(|id| index.contains(id)).count();
        if matched == 0 {
            let unique: BTreeSet<&str> = shape_ids.into_iter().collect();
            return Status::NoOverlap {
                shape_ids: unique.into_iter().map(str::to_string).collect(),
                record_ids: index.ids().map(str::to_string).collect(),
            };
        }
        Status::Bound { matched }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Status::Bound { .. } => Severity::Success,
            Status::NoShapes | Status::NoRecords | Status::NoOverlap { .. } => Severity::Warning,
            Status::Failed(_) => Severity::Error,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NoShapes => f.write_str("No bindable shapes (path, polygon, …) with an id were found in the map."),
            Status::NoRecords => f.write_str("No valid data rows were loaded; check the id, data1 and data2 columns."),
            Status::NoOverlap {
                shape_ids,
                record_ids,
            } => write!(
                f,
                "Data loaded but no region ids match the map.\n  map ids:  {}\n  data ids: {}",
                shape_ids.join(", "),
                record_ids.join(", ")
            ),
            Status::Bound { matched } => write!(f, "Data bound to {matched} region(s)."),
            Status::Failed(msg) => write!(f, "Failed to initialize the map: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RegionRecord;

    fn index(ids: &[&str]) -> RegionIndex {
        ids.iter()
            .map(|id| RegionRecord {
                id: id.to_string(),
                color: "#000".into(),
                data1: 1.0,
                data2: 2.0,
                display_name: id.to_string(),
                description: String::new(),
            })
            .collect()
    }

    #[test]
    fn evaluation_order_matches_precedence() {
        assert_eq!(Status::evaluate([], &index(&[])), Status::NoShapes);
        assert_eq!(Status::evaluate([], &index(&["A"])), Status::NoShapes);
        assert_eq!(Status::evaluate(["A"], &index(&[])), Status::NoRecords);
        assert_eq!(
            Status::evaluate(["A", "B", "A"], &index(&["A", "C"])),
            Status::Bound { matched: 2 }
        );
    }

    #[test]
    fn mismatch_lists_both_id_sets() {
        let s = Status::evaluate(["z", "x", "z"], &index(&["b", "a"]));
        assert_eq!(
            s,
            Status::NoOverlap {
                shape_ids: vec!["x".into(), "z".into()],
                record_ids: vec!["a".into(), "b".into()],
            }
        );
        assert_eq!(s.severity(), Severity::Warning);
        let text = s.to_string();
        assert!(text.contains("map ids:  x, z"));
        assert!(text.contains("data ids: a, b"));
    }

    #[test]
    fn evaluate_is_idempotent() {
        let idx = index(&["A"]);
        let a = Status::evaluate(["A", "B"], &idx);
        let b = Status::evaluate(["A", "B"], &idx);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "Data bound to 1 region(s).");
    }
}
