use crate::figures::Figure;
use crate::models::Indicator;
use crate::table::{Frame, SeriesTable};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use log::warn;
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Save figures as a pretty JSON array.
pub fn save_figures_json<P: AsRef<Path>>(figures: &[Figure], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(figures)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save a table as CSV with header `country,year,<metric>`.
pub fn save_table_csv<P: AsRef<Path>>(table: &SeriesTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    wtr.serialize(("country", "year", table.metric.as_str()))?;
    for row in &table.rows {
        wtr.serialize((&row.country, row.year, row.value))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a CSV written by [`save_table_csv`]. Files without exactly three columns,
/// or with a row of a different width than the header, are rejected with a
/// shape mismatch.
pub fn load_table_csv<P: AsRef<Path>>(path: P) -> Result<SeriesTable> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;
    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        rows.push(rec.iter().map(|c| Value::String(c.to_string())).collect());
    }
    let table = Frame::new(columns, rows)
        .and_then(SeriesTable::try_from)
        .with_context(|| format!("load {}", path.display()))?;
    Ok(table)
}

/// Save each available table as `<metric>.csv` under `dir`.
///
/// A table that cannot be written is logged and skipped; the others are still
/// saved. Returns the paths actually written.
pub fn save_tables(dir: &Path, tables: &[(Indicator, &SeriesTable)]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let mut saved = Vec::with_capacity(tables.len());
    for (indicator, table) in tables {
        let path = table_path(dir, *indicator);
        match save_table_csv(table, &path) {
            Ok(()) => saved.push(path),
            Err(e) => warn!("{}: could not save table: {:#}", indicator, e),
        }
    }
    Ok(saved)
}

/// Where an indicator's table lives inside `dir`.
pub fn table_path(dir: &Path, indicator: Indicator) -> PathBuf {
    dir.join(format!("{}.csv", indicator.metric()))
}
