//! Error taxonomy for the binder pipeline.
//!
//! Fatal conditions (fetch, parse, missing sheet) abort initialization and are
//! surfaced once at the [`crate::binder::RegionDataBinder::initialize`] boundary.
//! Per-row rejections and id mismatches are not errors; see
//! [`crate::normalize::RowRejected`] and [`crate::status::Status`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Network or HTTP failure retrieving the map or the dataset.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Malformed tabular payload or malformed SVG markup.
    #[error("parse error: {0}")]
    Parse(String),

    /// The configured sheet name does not exist in the workbook.
    #[error("sheet \"{name}\" not found (available: {})", available.join(", "))]
    SheetNotFound { name: String, available: Vec<String> },

    /// Chart or legend drawing failed in the plotting backend.
    #[error("render error: {0}")]
    Render(String),

    /// Writing an export file failed while encoding.
    #[error("export error: {0}")]
    Export(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for the failures that abort initialization.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Fetch { .. } | Error::Parse(_) | Error::SheetNotFound { .. }
        )
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Error::Parse(format!("malformed svg: {e}"))
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Error::Parse(format!("malformed svg attribute: {e}"))
    }
}

impl From<calamine::Error> for Error {
    fn from(e: calamine::Error) -> Self {
        Error::Parse(format!("malformed workbook: {e}"))
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Parse(format!("malformed csv: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
