use crate::error::{Error, Result};
use crate::models::{RegionIndex, RegionRecord};
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prefix text that a spreadsheet would evaluate as a formula.
fn neutralize_formula(s: &str) -> String {
    if s.starts_with(['=', '+', '-', '@']) {
        format!("'{s}")
    } else {
        s.to_string()
    }
}

/// Save the normalized index as CSV with the dataset's own header names.
pub fn save_index_csv<P: AsRef<Path>>(index: &RegionIndex, path: P) -> Result<()> {
    let export = |e: csv::Error| Error::Export(e.to_string());
    let mut wtr = WriterBuilder::new().from_path(path).map_err(export)?;
    wtr.write_record(["id", "color", "data1", "data2", "displayName", "description"])
        .map_err(export)?;
    for r in index.records() {
        wtr.write_record([
            neutralize_formula(&r.id),
            neutralize_formula(&r.color),
            r.data1.to_string(),
            r.data2.to_string(),
            neutralize_formula(&r.display_name),
            neutralize_formula(&r.description),
        ])
        .map_err(export)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save the normalized index as a pretty JSON array, sorted by id.
pub fn save_index_json<P: AsRef<Path>>(index: &RegionIndex, path: P) -> Result<()> {
    let records: Vec<&RegionRecord> = index.records().collect();
    let s = serde_json::to_string_pretty(&records).map_err(|e| Error::Export(e.to_string()))?;
    let mut f = File::create(path)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save as CSV or JSON depending on the file extension (CSV when unknown).
pub fn save_index<P: AsRef<Path>>(index: &RegionIndex, path: P) -> Result<()> {
    let path = path.as_ref();
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => save_index_json(index, path),
        _ => save_index_csv(index, path),
    }
}
