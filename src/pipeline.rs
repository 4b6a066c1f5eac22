//! Fetch → flatten → table → figure, once per indicator.

use crate::api::{self, Client, DEFAULT_BASE_URL, DEFAULT_PER_PAGE, Fetcher};
use crate::error::FigureError;
use crate::figures::{
    Figure, export_cost_figure, export_tax_figure, export_value_figure, net_exports_figure,
};
use crate::models::{CountrySet, DateRange, Indicator};
use crate::normalize::{MalformedPolicy, normalize};
use crate::table::SeriesTable;
use log::{debug, warn};

/// Result of one indicator pass.
#[derive(Debug)]
pub struct IndicatorOutcome {
    pub indicator: Indicator,
    pub url: String,
    pub table: Result<SeriesTable, FigureError>,
}

/// Builds the four trade figures from any [`Fetcher`].
#[derive(Debug, Clone)]
pub struct FigureBuilder<F> {
    fetcher: F,
    base_url: String,
    date: DateRange,
    per_page: u32,
    policy: MalformedPolicy,
}

impl Default for FigureBuilder<Client> {
    fn default() -> Self {
        Self::new(Client::default())
    }
}

impl<F: Fetcher> FigureBuilder<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            base_url: DEFAULT_BASE_URL.to_string(),
            date: DateRange::default(),
            per_page: DEFAULT_PER_PAGE,
            policy: MalformedPolicy::default(),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Request URLs in chart order, without touching the network.
    pub fn urls(&self, countries: &CountrySet) -> Vec<String> {
        Indicator::ALL
            .iter()
            .map(|ind| self.url(countries, *ind))
            .collect()
    }

    fn url(&self, countries: &CountrySet, indicator: Indicator) -> String {
        api::indicator_url(
            &self.base_url,
            countries,
            indicator.code(),
            self.date,
            self.per_page,
        )
    }

    /// Load one indicator's table.
    pub fn fetch_table(&self, countries: &CountrySet, indicator: Indicator) -> IndicatorOutcome {
        let url = self.url(countries, indicator);
        let table = self
            .fetcher
            .fetch_records(&url)
            .map_err(|source| FigureError::FetchFailed {
                indicator: indicator.code(),
                source,
            })
            .and_then(|raw| Ok(normalize(raw, self.policy)?))
            .and_then(|records| Ok(SeriesTable::from_records(&records, indicator)?));
        match &table {
            Ok(t) => debug!("{}: {} rows", indicator, t.rows.len()),
            Err(e) => warn!("{}: {}", indicator, e),
        }
        IndicatorOutcome {
            indicator,
            url,
            table,
        }
    }

    /// All four tables, in chart order. A failure in one never stops the others.
    pub fn fetch_tables(&self, countries: &CountrySet) -> Vec<IndicatorOutcome> {
        Indicator::ALL
            .iter()
            .map(|ind| self.fetch_table(countries, *ind))
            .collect()
    }

    /// Exactly four figures; a failed indicator yields a figure with no series.
    pub fn build_figures(&self, countries: &CountrySet) -> Vec<Figure> {
        let outcomes = self.fetch_tables(countries);
        let tables: Vec<Option<&SeriesTable>> =
            outcomes.iter().map(|o| o.table.as_ref().ok()).collect();
        assemble(&tables)
    }
}

/// Turn per-indicator tables (chart order, `None` = unavailable) into figures.
///
/// Missing trailing entries count as unavailable.
pub fn assemble(tables: &[Option<&SeriesTable>]) -> Vec<Figure> {
    let table = |i: usize| tables.get(i).copied().flatten();
    let country_list = table(0).map(SeriesTable::countries).unwrap_or_default();

    Indicator::ALL
        .iter()
        .enumerate()
        .map(|(i, ind)| match (ind, table(i)) {
            (_, None) => Figure::empty(*ind),
            (Indicator::ExportValueIndex, Some(t)) => export_value_figure(t),
            (Indicator::CostOfExport, Some(t)) => export_cost_figure(t),
            (Indicator::ExportTaxes, Some(t)) => export_tax_figure(t),
            (Indicator::BalanceOfPayments, Some(t)) => net_exports_figure(t, &country_list),
        })
        .collect()
}

/// Build the four figures with the default HTTP client.
///
/// An empty `countries` set means the default 13 countries.
pub fn build_figures(countries: &CountrySet) -> Vec<Figure> {
    FigureBuilder::default().build_figures(countries)
}
