//! Three-column tables: `country`, `year`, `<metric>`.
//!
//! Loading goes through a loose [`Frame`] (named columns of JSON scalars) so that
//! both API records and CSV files share the same shape check before rows get
//! typed into a [`SeriesTable`].

use crate::error::TableError;
use crate::models::{Indicator, Observation, Record};
use serde_json::Value;

/// Source fields projected out of a flattened API record, in column order.
pub const SOURCE_FIELDS: [&str; 3] = ["country", "date", "value"];

/// Width every series table must have.
pub const TABLE_WIDTH: usize = 3;

/// Loosely typed table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    /// Build from explicit columns and rows. Every row must be as wide as the header.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, TableError> {
        if let Some(bad) = rows.iter().find(|r| r.len() != columns.len()) {
            return Err(TableError::ShapeMismatch {
                expected: columns.len(),
                found: bad.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Project `fields` out of each record.
    ///
    /// A field no record carries is not a column at all; a field only some
    /// records lack is `null` in those rows. With no records every field is kept.
    pub fn from_records(records: &[Record], fields: &[&str]) -> Self {
        let present: Vec<&str> = fields
            .iter()
            .copied()
            .filter(|f| records.is_empty() || records.iter().any(|r| r.contains_key(*f)))
            .collect();
        let rows = records
            .iter()
            .map(|r| {
                present
                    .iter()
                    .map(|f| r.get(*f).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self {
            columns: present.iter().map(|f| f.to_string()).collect(),
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Relabel columns positionally. The label count must equal the width.
    pub fn rename(mut self, labels: &[&str]) -> Result<Self, TableError> {
        if labels.len() != self.width() {
            return Err(TableError::ShapeMismatch {
                expected: labels.len(),
                found: self.width(),
            });
        }
        self.columns = labels.iter().map(|l| l.to_string()).collect();
        Ok(self)
    }
}

/// Typed per-indicator table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesTable {
    pub metric: String,
    pub rows: Vec<Observation>,
}

impl SeriesTable {
    /// Load flattened API records for `indicator`.
    pub fn from_records(records: &[Record], indicator: Indicator) -> Result<Self, TableError> {
        let frame = Frame::from_records(records, &SOURCE_FIELDS)
            .rename(&["country", "year", indicator.metric()])?;
        Self::try_from(frame)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct countries in first-appearance order.
    pub fn countries(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for row in &self.rows {
            if !out.contains(&row.country) {
                out.push(row.country.clone());
            }
        }
        out
    }

    /// Rows for one country, in table order.
    pub fn for_country<'a>(&'a self, country: &'a str) -> impl Iterator<Item = &'a Observation> {
        self.rows.iter().filter(move |r| r.country == country)
    }
}

impl TryFrom<Frame> for SeriesTable {
    type Error = TableError;

    /// Columns are taken positionally as country, year, metric.
    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        if frame.width() != TABLE_WIDTH {
            return Err(TableError::ShapeMismatch {
                expected: TABLE_WIDTH,
                found: frame.width(),
            });
        }
        let metric = frame.columns[2].clone();
        let mut rows = Vec::with_capacity(frame.len());
        for (index, row) in frame.rows.into_iter().enumerate() {
            // Frame rows always match the header width.
            let mut cells = row.into_iter();
            let (country, year, value) = (
                cells.next().unwrap_or_default(),
                cells.next().unwrap_or_default(),
                cells.next().unwrap_or_default(),
            );
            let invalid = |column: &str, v: &Value| TableError::InvalidField {
                index,
                column: column.to_string(),
                value: v.to_string(),
            };
            let country = match country {
                Value::String(s) => s,
                other => return Err(invalid(&frame.columns[0], &other)),
            };
            let year = cell_year(&year).ok_or_else(|| invalid(&frame.columns[1], &year))?;
            let value = cell_number(&value).ok_or_else(|| invalid(&metric, &value))?;
            rows.push(Observation {
                country,
                year,
                value,
            });
        }
        Ok(Self { metric, rows })
    }
}

/// The API sends years as strings ("2018"); CSV round-trips may give numbers.
fn cell_year(v: &Value) -> Option<i32> {
    match v {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        _ => None,
    }
}

/// `Some(None)` for a missing observation, `None` for garbage.
fn cell_number(v: &Value) -> Option<Option<f64>> {
    match v {
        Value::Null => Some(None),
        Value::Number(n) => n.as_f64().map(Some),
        Value::String(s) if s.trim().is_empty() => Some(None),
        Value::String(s) => s.trim().parse().ok().map(Some),
        _ => None,
    }
}
