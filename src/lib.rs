//! wbtrade
//!
//! Fetches four World Bank trade indicators for a set of countries and turns them
//! into chart-ready figure descriptors (plotly-compatible JSON). Pairs with the
//! `wbtrade` CLI.
//!
//! ### Charts
//! 1. Export value index per country over time (lines)
//! 2. Cost to export in 2018 (bar)
//! 3. Export taxes as % of tax revenue in 2018 (bar)
//! 4. Net exports of goods and services per country over time (lines)
//!
//! ### Example
//! ```no_run
//! use wbtrade::{CountrySet, build_figures};
//!
//! let countries: CountrySet = [("Japan", "JPN"), ("Laos", "LAO")].into_iter().collect();
//! let figures = build_figures(&countries);
//! assert_eq!(figures.len(), 4);
//! println!("{}", serde_json::to_string(&figures)?);
//! # Ok::<(), serde_json::Error>(())
//! ```

pub mod api;
pub mod error;
pub mod figures;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod storage;
pub mod table;

pub use api::{Client, Fetcher};
pub use error::{FetchError, FigureError, TableError};
pub use figures::Figure;
pub use models::{CountrySet, DateRange, Indicator};
pub use pipeline::{FigureBuilder, build_figures};
