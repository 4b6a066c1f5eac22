use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Countries queried when the caller supplies none (China and India excluded).
pub const DEFAULT_COUNTRIES: [(&str, &str); 13] = [
    ("Cambodia", "KHM"),
    ("Hong Kong", "HKG"),
    ("Indonesia", "IDN"),
    ("Japan", "JPN"),
    ("Laos", "LAO"),
    ("Malaysia", "MYS"),
    ("Myanmar", "MMR"),
    ("Nepal", "NPL"),
    ("Philippines", "PHL"),
    ("Singapore", "SGP"),
    ("Taiwan", "TWN"),
    ("Thailand", "THA"),
    ("Vietnam", "VNM"),
];

/// Ordered mapping from display name to ISO3 code.
///
/// Names are unique; inserting an existing name replaces its code in place, so
/// the original position (and thus legend order) is kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CountrySet {
    entries: Vec<(String, String)>,
}

impl CountrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in 13-country set.
    pub fn defaults() -> Self {
        DEFAULT_COUNTRIES.iter().copied().collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, code: impl Into<String>) {
        let (name, code) = (name.into(), code.into());
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = code,
            None => self.entries.push((name, code)),
        }
    }

    /// This set, or the defaults when it is empty.
    pub fn or_defaults(&self) -> Self {
        if self.is_empty() {
            Self::defaults()
        } else {
            self.clone()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(n, _)| n)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(_, c)| c)
    }
}

impl<N: Into<String>, C: Into<String>> FromIterator<(N, C)> for CountrySet {
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        let mut set = CountrySet::new();
        for (name, code) in iter {
            set.insert(name, code);
        }
        set
    }
}

/// Parses `Name=CODE` pairs separated by comma or semicolon,
/// e.g. `Japan=JPN;Laos=LAO`.
impl FromStr for CountrySet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = CountrySet::new();
        for part in s.split([',', ';']).map(str::trim).filter(|p| !p.is_empty()) {
            let (name, code) = part
                .split_once('=')
                .ok_or_else(|| format!("expected NAME=CODE, got `{}`", part))?;
            let (name, code) = (name.trim(), code.trim());
            if name.is_empty() || code.is_empty() {
                return Err(format!("empty name or code in `{}`", part));
            }
            set.insert(name, code);
        }
        Ok(set)
    }
}

/// The four trade indicators, in chart order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    /// Export value index (2000 = 100).
    ExportValueIndex,
    /// Cost to export, border compliance (US$).
    CostOfExport,
    /// Taxes on exports (% of tax revenue).
    ExportTaxes,
    /// Net trade in goods and services (BoP, current US$).
    BalanceOfPayments,
}

impl Indicator {
    pub const ALL: [Indicator; 4] = [
        Indicator::ExportValueIndex,
        Indicator::CostOfExport,
        Indicator::ExportTaxes,
        Indicator::BalanceOfPayments,
    ];

    /// World Bank indicator id.
    pub fn code(self) -> &'static str {
        match self {
            Indicator::ExportValueIndex => "TX.VAL.MRCH.XD.WD",
            Indicator::CostOfExport => "IC.EXP.CSBC.CD",
            Indicator::ExportTaxes => "GC.TAX.EXPT.ZS",
            Indicator::BalanceOfPayments => "BN.GSR.GNFS.CD",
        }
    }

    /// Name of the third table column; also the CSV file stem.
    pub fn metric(self) -> &'static str {
        match self {
            Indicator::ExportValueIndex => "export_value_idx",
            Indicator::CostOfExport => "cost_of_export_usd",
            Indicator::ExportTaxes => "export_taxes",
            Indicator::BalanceOfPayments => "bal_of_pmts",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Inclusive year range for API queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: i32,
    pub end: i32,
}

impl DateRange {
    pub fn to_query_param(&self) -> String {
        format!("{}:{}", self.start, self.end)
    }
}

impl Default for DateRange {
    fn default() -> Self {
        DateRange {
            start: 2000,
            end: 2018,
        }
    }
}

/// Metadata section returned by the API (position 0).
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub page: u32,
    pub pages: u32,
    /// Some responses encode `per_page` as a string, others as a number.
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub per_page: u32,
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub total: u32,
}

/// Serde helper: parse `u32` from either a JSON number or a string.
fn de_u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct U32Visitor;

    impl<'de> Visitor<'de> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            u32::try_from(v).map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            u32::try_from(v).map_err(|_| E::custom("negative or oversized value for u32"))
        }

        fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
            s.parse::<u32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

/// A response record after flattening: `indicator` and `country` are scalars.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// One typed table row.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub country: String,
    pub year: i32,
    pub value: Option<f64>,
}
