//! Synchronous access to the **World Bank Indicators API (v2)**.
//!
//! This module builds the `countries/{codes}/indicators/{code}` request URL and
//! unwraps the `[meta, [record, ...]]` envelope into raw JSON records. It does no
//! reshaping; see `normalize` and `table` for that.
//!
//! ### Notes
//! - One request per indicator, no pagination: `per_page` is large enough for the
//!   country/date ranges this crate queries. A truncated page is logged.
//! - No retries. Timeouts are disabled unless requested via `Client::with_timeout`.
//!
//! Typical usage:
//! ```no_run
//! # use wbtrade::api::{Client, Fetcher, indicator_url, DEFAULT_BASE_URL};
//! # use wbtrade::{CountrySet, DateRange, Indicator};
//! let url = indicator_url(
//!     DEFAULT_BASE_URL,
//!     &CountrySet::defaults(),
//!     Indicator::CostOfExport.code(),
//!     DateRange::default(),
//!     1000,
//! );
//! let records = Client::default().fetch_records(&url)?;
//! # Ok::<(), wbtrade::FetchError>(())
//! ```

use crate::error::FetchError;
use crate::models::{CountrySet, DateRange, Meta};
use log::{debug, warn};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.worldbank.org/v2";

/// Records requested per call.
pub const DEFAULT_PER_PAGE: u32 = 1000;

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(part: &str) -> String {
    percent_encoding::utf8_percent_encode(part, SAFE).to_string()
}

/// Lower-cased, de-duplicated country codes joined by `:`.
///
/// An empty set is replaced by the default countries. Blank codes are dropped.
pub fn country_spec(countries: &CountrySet) -> String {
    let countries = countries.or_defaults();
    let mut seen: Vec<String> = Vec::with_capacity(countries.len());
    for code in countries.codes() {
        let code = code.trim().to_lowercase();
        if !code.is_empty() && !seen.contains(&code) {
            seen.push(code);
        }
    }
    seen.iter().map(|c| enc(c)).collect::<Vec<_>>().join(":")
}

/// Build the request URL for one indicator.
///
/// The indicator code is not validated or trimmed; it is only percent-encoded.
pub fn indicator_url(
    base_url: &str,
    countries: &CountrySet,
    indicator_code: &str,
    date: DateRange,
    per_page: u32,
) -> String {
    format!(
        "{}/countries/{}/indicators/{}?date={}&per_page={}&format=json",
        base_url.trim_end_matches('/'),
        country_spec(countries),
        enc(indicator_code),
        date.to_query_param(),
        per_page
    )
}

/// Source of raw indicator records.
///
/// Implemented by the HTTP [`Client`] and by any
/// `Fn(&str) -> Result<Vec<Value>, FetchError>`, which is what tests use.
pub trait Fetcher {
    /// Fetch the record list (envelope position 1) behind `url`.
    fn fetch_records(&self, url: &str) -> Result<Vec<Value>, FetchError>;
}

impl<F> Fetcher for F
where
    F: Fn(&str) -> Result<Vec<Value>, FetchError>,
{
    fn fetch_records(&self, url: &str) -> Result<Vec<Value>, FetchError> {
        self(url)
    }
}

/// Unwrap `[meta, [record, ...]]` into the record list.
///
/// A `null` record list (the API's answer for "no observations") is empty.
pub fn parse_envelope(v: Value) -> Result<Vec<Value>, FetchError> {
    let Value::Array(mut arr) = v else {
        return Err(FetchError::Envelope("not a top-level array".into()));
    };
    if let Some(first) = arr.first()
        && first.get("message").is_some()
    {
        return Err(FetchError::Api(first.to_string()));
    }
    if arr.len() < 2 {
        return Err(FetchError::Envelope(format!(
            "expected 2 elements, found {}",
            arr.len()
        )));
    }

    let records = match arr.swap_remove(1) {
        Value::Array(records) => records,
        Value::Null => Vec::new(),
        other => {
            return Err(FetchError::Envelope(format!(
                "record list is not an array: {}",
                other
            )));
        }
    };

    match serde_json::from_value::<Meta>(arr.swap_remove(0)) {
        Ok(meta) if meta.total as usize > records.len() => warn!(
            "response truncated: {} of {} records on page {}/{}",
            records.len(),
            meta.total,
            meta.page,
            meta.pages
        ),
        Ok(_) => {}
        Err(e) => debug!("ignoring unreadable meta: {}", e),
    }

    Ok(records)
}

#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        Self::with_timeout(None).expect("reqwest client build")
    }
}

impl Client {
    /// Build a client with an optional total request timeout (`None` = wait forever).
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("wbtrade/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }
}

impl Fetcher for Client {
    fn fetch_records(&self, url: &str) -> Result<Vec<Value>, FetchError> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = resp.text()?;
        let v: Value = serde_json::from_str(&body)?;
        parse_envelope(v)
    }
}
