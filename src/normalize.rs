//! Raw rows → [`RegionIndex`].
//!
//! A row is kept iff its `id` is non-empty after trimming and both `data1` and
//! `data2` are finite numbers. Rejections are returned alongside the index and
//! logged; they never abort the load. When an id repeats, the first row wins.

use crate::models::{Cell, DEFAULT_COLOR, RegionIndex, RegionRecord, Row};
use serde::Serialize;
use std::fmt;

pub const COL_ID: &str = "id";
pub const COL_COLOR: &str = "color";
pub const COL_DATA1: &str = "data1";
pub const COL_DATA2: &str = "data2";
pub const COL_DISPLAY_NAME: &str = "displayName";
pub const COL_DESCRIPTION: &str = "description";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    MissingId,
    InvalidData1,
    InvalidData2,
    DuplicateId,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RejectReason::MissingId => "missing id",
            RejectReason::InvalidData1 => "data1 is not a finite number",
            RejectReason::InvalidData2 => "data2 is not a finite number",
            RejectReason::DuplicateId => "duplicate id (first row kept)",
        })
    }
}

/// A dropped row. `row` is 1-based over data rows (the header is not counted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejected {
    pub row: usize,
    pub id: Option<String>,
    pub reason: RejectReason,
}

impl fmt::Display for RowRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "row {} ({}): {}", self.row, id, self.reason),
            None => write!(f, "row {}: {}", self.row, self.reason),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub index: RegionIndex,
    pub rejected: Vec<RowRejected>,
}

/// `value` if present and non-blank after trimming, else `default()`.
pub fn resolve_or(value: Option<String>, default: impl FnOnce() -> String) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(default)
}

fn text(row: &Row, col: &str) -> Option<String> {
    row.get(col).and_then(Cell::as_text)
}

/// Build one record from a row, or say why it was dropped.
pub fn normalize_row(row: &Row) -> Result<RegionRecord, RejectReason> {
    let id = resolve_or(text(row, COL_ID), String::new);
    if id.is_empty() {
        return Err(RejectReason::MissingId);
    }
    let data1 = row
        .get(COL_DATA1)
        .and_then(Cell::as_number)
        .ok_or(RejectReason::InvalidData1)?;
    let data2 = row
        .get(COL_DATA2)
        .and_then(Cell::as_number)
        .ok_or(RejectReason::InvalidData2)?;

    let color = resolve_or(text(row, COL_COLOR), || DEFAULT_COLOR.to_string());
    let display_name = resolve_or(text(row, COL_DISPLAY_NAME), || id.clone());
    let description = resolve_or(text(row, COL_DESCRIPTION), || {
        format!("No description available for {display_name}.")
    });

    Ok(RegionRecord {
        id,
        color,
        data1,
        data2,
        display_name,
        description,
    })
}

pub fn normalize(rows: &[Row]) -> Normalized {
    let mut out = Normalized::default();
    for (i, row) in rows.iter().enumerate() {
        let row_no = i + 1;
        let rejected = match normalize_row(row) {
            Ok(record) => {
                let id = record.id.clone();
                if out.index.insert_new(record) {
                    continue;
                }
                RowRejected {
                    row: row_no,
                    id: Some(id),
                    reason: RejectReason::DuplicateId,
                }
            }
            Err(reason) => RowRejected {
                row: row_no,
                id: text(row, COL_ID)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
                reason,
            },
        };
        log::warn!("skipping {rejected}");
        out.rejected.push(rejected);
    }
    log::info!(
        "normalized {} row(s): {} kept, {} rejected",
        rows.len(),
        out.index.len(),
        out.rejected.len()
    );
    out
}
