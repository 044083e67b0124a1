//! Integration tests for loading trade CSV files from disk.

use adapter_loader::{ColumnRole, CsvTradeReader, LoaderError, SchemaConfig, SchemaError, TableNormalizer};
use approx::assert_relative_eq;
use std::io::Write;
use tempfile::NamedTempFile;
use trade_core::flows::{FlowAggregator, YearSelector};
use trade_core::types::CountryCode;

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write csv");
    file
}

#[test]
fn test_load_comtrade_style_file() {
    let file = write_csv(
        "refYear,reporterISO,partnerISO,cmdDesc,flowDesc,primaryValue\n\
         2022,usa,chn,Wheat,Import,100\n\
         2023,usa,chn,Wheat,Import,120\n\
         2023,USA,CHN,Soya beans,Import,30\n\
         2023,DEU,FRA,Cheese,Import,50\n\
         2023,DEU,FRA,Cheese,Import,\n",
    );

    let normalized = CsvTradeReader::default().read_path(file.path()).unwrap();
    assert_eq!(normalized.report.total_rows, 5);
    assert_eq!(normalized.report.kept_rows, 4);
    assert_eq!(normalized.report.invalid_value, 1);

    let snapshot = FlowAggregator::aggregate(&normalized.table, YearSelector::Latest)
        .ready()
        .unwrap();
    assert_eq!(snapshot.year(), 2023);
    assert_relative_eq!(
        snapshot
            .edge_value(&CountryCode::new("CHN"), &CountryCode::new("USA"))
            .unwrap(),
        150.0
    );
}

#[test]
fn test_load_with_custom_candidates() {
    let file = write_csv(
        "dest,origin,period,usd\n\
         JPN,KOR,2020,9\n",
    );

    let schema = SchemaConfig::default()
        .with_candidates(ColumnRole::Importer, ["dest"])
        .with_candidates(ColumnRole::Exporter, ["origin"])
        .with_candidates(ColumnRole::Year, ["period"])
        .with_candidates(ColumnRole::Value, ["usd"]);
    let reader = CsvTradeReader::new(TableNormalizer::new(schema));

    let normalized = reader.read_path(file.path()).unwrap();
    let record = &normalized.table.records()[0];
    assert_eq!(record.importer.as_str(), "JPN");
    assert_eq!(record.exporter.as_str(), "KOR");
    assert_eq!(record.year, 2020);
}

#[test]
fn test_missing_value_column_is_fatal() {
    let file = write_csv("reporterISO,partnerISO,refYear\nUSA,CHN,2023\n");
    let err = CsvTradeReader::default().read_path(file.path()).unwrap_err();
    match err {
        LoaderError::Schema(SchemaError::MissingColumn { role, headers, .. }) => {
            assert_eq!(role, ColumnRole::Value);
            assert_eq!(headers.len(), 3);
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}
