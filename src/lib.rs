//! regionmap
//!
//! A Rust library for binding spreadsheet rows to the regions of an SVG map.
//! Pairs with the `regionmap` CLI.
//!
//! ### Features
//! - Load an SVG map and find its bindable shapes (`path`, `polygon`, `rect`, … with an `id`)
//! - Fetch a dataset (xlsx / xls / ods / CSV) from a URL or a file
//! - Normalize rows into a per-region index (`id`, `color`, `data1`, `data2`, …)
//! - Fill shapes, show tooltips, highlight a clicked region and describe it
//! - Render the selected region's two-bar chart and its legend as SVG
//!
//! ### Example
//! ```no_run
//! use regionmap::{BinderConfig, Client, RegionDataBinder};
//!
//! let mut config = BinderConfig::new("regions.svg", "https://example.org/regions.xlsx");
//! config.labels.data1 = "Population".into();
//!
//! let mut binder = RegionDataBinder::initialize(config, &Client::default());
//! println!("{}", binder.status());
//! binder.select("R1");
//! std::fs::write("map.svg", binder.render_svg()?)?;
//! if let Some(chart) = binder.render_chart_svg()? {
//!     std::fs::write("chart.svg", chart)?;
//! }
//! regionmap::storage::save_index(binder.index(), "regions.csv")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod binder;
pub mod chart;
pub mod color;
pub mod config;
pub mod error;
pub mod map;
pub mod models;
pub mod normalize;
pub mod status;
pub mod storage;
pub mod viz;
pub mod workbook;

pub use api::{Client, Source};
pub use binder::{RegionDataBinder, ShapeHandle};
pub use color::adjust_color;
pub use config::BinderConfig;
pub use error::{Error, Result};
pub use models::{RegionIndex, RegionRecord, SeriesLabels};
pub use status::Status;
