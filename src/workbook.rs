//! Tabular payload decoding: bytes → named sheets of header-keyed rows.
//!
//! Spreadsheet containers (xlsx/xlsm/xlsb/ods via ZIP, legacy xls via OLE) go
//! through `calamine`; anything else is read as UTF-8 CSV with a single sheet.
//! In both cases the first non-blank row is the header row, empty cells are
//! omitted from the row mapping and fully blank rows are skipped.

use crate::error::{Error, Result};
use crate::models::{Cell, Row};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;

/// Name given to the only sheet of a CSV payload.
pub const CSV_SHEET_NAME: &str = "Sheet1";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    /// The named sheet, or the first sheet when `name` is `None`.
    pub fn sheet(&self, name: Option<&str>) -> Result<&Sheet> {
        match name {
            Some(name) => self
                .sheets
                .iter()
                .find(|s| s.name == name)
                .ok_or_else(|| Error::SheetNotFound {
                    name: name.to_string(),
                    available: self.sheet_names(),
                }),
            None => self
                .sheets
                .first()
                .ok_or_else(|| Error::Parse("workbook contains no sheets".into())),
        }
    }
}

/// Decode a downloaded payload.
pub fn decode(bytes: &[u8]) -> Result<Workbook> {
    if bytes.is_empty() {
        return Err(Error::Parse("empty payload".into()));
    }
    if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
        decode_spreadsheet(bytes)
    } else {
        decode_csv(bytes)
    }
}

fn decode_spreadsheet(bytes: &[u8]) -> Result<Workbook> {
    let mut sheets = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let mut out = Workbook::default();
    for name in sheets.sheet_names() {
        let range = sheets.worksheet_range(&name)?;
        let grid = range
            .rows()
            .map(|r| r.iter().map(cell_from_data).collect::<Vec<_>>());
        out.sheets.push(Sheet {
            rows: rows_from_grid(grid),
            name,
        });
    }
    log::debug!("decoded spreadsheet with {} sheet(s)", out.sheets.len());
    Ok(out)
}

fn cell_from_data(d: &Data) -> Cell {
    match d {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => text_cell(s),
        other => text_cell(&other.to_string()),
    }
}

fn decode_csv(bytes: &[u8]) -> Result<Workbook> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut grid: Vec<Vec<Cell>> = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        grid.push(rec.iter().map(text_cell).collect());
    }
    Ok(Workbook {
        sheets: vec![Sheet {
            name: CSV_SHEET_NAME.into(),
            rows: rows_from_grid(grid.into_iter()),
        }],
    })
}

fn text_cell(s: &str) -> Cell {
    if s.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(s.to_string())
    }
}

/// First non-blank row names the columns; columns with a blank header are dropped.
fn rows_from_grid(mut grid: impl Iterator<Item = Vec<Cell>>) -> Vec<Row> {
    let is_blank = |r: &[Cell]| r.iter().all(|c| *c == Cell::Empty);
    let Some(header) = grid.by_ref().find(|r| !is_blank(r)) else {
        return Vec::new();
    };
    let names: Vec<Option<String>> = header
        .iter()
        .map(|c| c.as_text().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
        .collect();

    grid.filter(|r| !is_blank(r))
        .map(|cells| {
            names
                .iter()
                .zip(cells)
                .filter_map(|(name, cell)| match (name, cell) {
                    (Some(n), c) if c != Cell::Empty => Some((n.clone(), c)),
                    _ => None,
                })
                .collect::<Row>()
        })
        .collect()
}
