use serde_json::{Value, json};
use std::cell::RefCell;
use std::io;
use wbtrade::figures::{AxisValues, TraceKind};
use wbtrade::normalize::MalformedPolicy;
use wbtrade::{CountrySet, FetchError, FigureBuilder, FigureError, Indicator, TableError};

fn record(indicator: &str, country: &str, year: i32, value: f64) -> Value {
    json!({
        "indicator": {"id": indicator, "value": "Some indicator"},
        "country": {"id": "XX", "value": country},
        "countryiso3code": "XXX",
        "date": year.to_string(),
        "value": value,
        "unit": "",
        "obs_status": "",
        "decimal": 0
    })
}

/// Japan and Laos, 2000 and 2001, for the given indicator.
fn two_by_two(indicator: &str) -> Vec<Value> {
    let mut out = Vec::new();
    for country in ["Japan", "Laos"] {
        for year in [2000, 2001] {
            out.push(record(indicator, country, year, 100.0 + (year - 2000) as f64));
        }
    }
    out
}

fn snapshot(indicator: &str) -> Vec<Value> {
    vec![
        record(indicator, "Japan", 2018, 305.0),
        record(indicator, "Japan", 2017, 300.0),
        record(indicator, "Laos", 2018, 140.0),
    ]
}

fn countries() -> CountrySet {
    [("Japan", "JPN"), ("Laos", "LAO")].into_iter().collect()
}

fn happy_stub(url: &str) -> Result<Vec<Value>, FetchError> {
    let code = Indicator::ALL
        .iter()
        .map(|i| i.code())
        .find(|c| url.contains(c))
        .expect("known indicator");
    match code {
        "IC.EXP.CSBC.CD" | "GC.TAX.EXPT.ZS" => Ok(snapshot(code)),
        _ => Ok(two_by_two(code)),
    }
}

#[test]
fn builds_four_figures_in_order() {
    let figures = FigureBuilder::new(happy_stub).build_figures(&countries());
    assert_eq!(figures.len(), 4);

    let first = &figures[0];
    assert_eq!(first.data.len(), 2);
    let names: Vec<_> = first.data.iter().map(|t| t.name.as_deref().unwrap()).collect();
    assert_eq!(names, vec!["Japan", "Laos"]);
    for trace in &first.data {
        assert_eq!(trace.x, AxisValues::Years(vec![2000, 2001]));
        assert_eq!(trace.y.len(), 2);
    }

    for fig in &figures[1..3] {
        assert_eq!(fig.data.len(), 1);
        assert_eq!(fig.data[0].kind, TraceKind::Bar);
        assert_eq!(
            fig.data[0].x,
            AxisValues::Categories(vec!["Japan".into(), "Laos".into()])
        );
        assert_eq!(fig.data[0].y, vec![Some(305.0), Some(140.0)]);
    }

    assert_eq!(figures[3].data.len(), 2);
    assert_eq!(figures[3].layout.title, "Annual Net Exports of Goods and Services");
}

#[test]
fn requests_hit_every_indicator_once_with_lowercased_codes() {
    let seen = RefCell::new(Vec::new());
    let stub = |url: &str| -> Result<Vec<Value>, FetchError> {
        seen.borrow_mut().push(url.to_string());
        Ok(Vec::new())
    };
    let figures = FigureBuilder::new(stub)
        .base_url("http://stub/v2")
        .build_figures(&countries());
    assert_eq!(figures.len(), 4);

    let seen = seen.into_inner();
    assert_eq!(seen.len(), 4);
    for (url, ind) in seen.iter().zip(Indicator::ALL) {
        assert!(url.starts_with("http://stub/v2/countries/jpn:lao/indicators/"));
        assert!(url.contains(ind.code()));
        assert!(url.ends_with("?date=2000:2018&per_page=1000&format=json"));
    }
}

#[test]
fn network_failure_on_one_indicator_leaves_others_intact() {
    let stub = |url: &str| -> Result<Vec<Value>, FetchError> {
        if url.contains(Indicator::CostOfExport.code()) {
            Err(FetchError::Network(Box::new(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))))
        } else {
            happy_stub(url)
        }
    };
    let builder = FigureBuilder::new(stub);

    let figures = builder.build_figures(&countries());
    assert_eq!(figures.len(), 4);
    assert!(figures[1].data.is_empty());
    assert_eq!(figures[1].layout.title, "2018 Cost of Exports in U.S. Dollars");
    assert_eq!(figures[0].data.len(), 2);
    assert_eq!(figures[2].data.len(), 1);
    assert_eq!(figures[3].data.len(), 2);

    let outcomes = builder.fetch_tables(&countries());
    assert!(matches!(
        outcomes[1].table,
        Err(FigureError::FetchFailed {
            indicator: "IC.EXP.CSBC.CD",
            source: FetchError::Network(_)
        })
    ));
    assert!(outcomes.iter().enumerate().all(|(i, o)| i == 1 || o.table.is_ok()));
}

#[test]
fn failed_first_indicator_still_charts_net_exports() {
    let stub = |url: &str| -> Result<Vec<Value>, FetchError> {
        if url.contains(Indicator::ExportValueIndex.code()) {
            Err(FetchError::Status(503))
        } else {
            happy_stub(url)
        }
    };
    let figures = FigureBuilder::new(stub).build_figures(&countries());
    assert!(figures[0].data.is_empty());
    assert_eq!(figures[3].data.len(), 2);
}

#[test]
fn malformed_record_policy_is_applied() {
    let stub = |url: &str| -> Result<Vec<Value>, FetchError> {
        let mut records = happy_stub(url)?;
        records[0].as_object_mut().unwrap().remove("country");
        Ok(records)
    };

    let lenient = FigureBuilder::new(stub).build_figures(&countries());
    // Japan lost its 2000 row but still has 2001.
    assert_eq!(lenient[0].data.len(), 2);
    assert_eq!(lenient[0].data[0].y.len(), 1);

    let strict = FigureBuilder::new(stub).policy(MalformedPolicy::Fail);
    let outcomes = strict.fetch_tables(&countries());
    assert!(outcomes.iter().all(|o| matches!(
        o.table,
        Err(FigureError::Table(TableError::FieldMissing {
            index: 0,
            field: "country"
        }))
    )));
    assert!(strict.build_figures(&countries()).iter().all(|f| f.data.is_empty()));
}

#[test]
fn unusable_values_fail_only_their_indicator() {
    let stub = |url: &str| -> Result<Vec<Value>, FetchError> {
        let mut records = happy_stub(url)?;
        if url.contains(Indicator::ExportTaxes.code()) {
            records[0]["value"] = json!({"nested": true});
        }
        Ok(records)
    };
    let builder = FigureBuilder::new(stub);
    let outcomes = builder.fetch_tables(&countries());
    assert!(matches!(
        outcomes[2].table,
        Err(FigureError::Table(TableError::InvalidField { index: 0, .. }))
    ));
    let figures = builder.build_figures(&countries());
    assert!(figures[2].data.is_empty());
    assert_eq!(figures[1].data.len(), 1);
}

#[test]
fn response_without_value_column_fails_its_indicator() {
    let stub = |url: &str| -> Result<Vec<Value>, FetchError> {
        let mut records = happy_stub(url)?;
        if url.contains(Indicator::CostOfExport.code()) {
            for r in &mut records {
                r.as_object_mut().unwrap().remove("value");
            }
        }
        Ok(records)
    };
    let builder = FigureBuilder::new(stub);
    let outcomes = builder.fetch_tables(&countries());
    assert!(matches!(
        outcomes[1].table,
        Err(FigureError::Table(TableError::ShapeMismatch {
            expected: 3,
            found: 2
        }))
    ));

    let figures = builder.build_figures(&countries());
    assert_eq!(figures.len(), 4);
    assert!(figures[1].data.is_empty());
    assert_eq!(figures[2].data.len(), 1);
}
