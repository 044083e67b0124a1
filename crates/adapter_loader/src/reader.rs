//! CSV trade file reader.

use crate::error::{LoaderError, SchemaError};
use crate::normalizer::{NormalizationReport, NormalizedTable, TableNormalizer};
use crate::schema::ResolvedSchema;
use csv::ByteRecord;
use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Streams a CSV file through a [`TableNormalizer`].
#[derive(Clone, Debug, Default)]
pub struct CsvTradeReader {
    normalizer: TableNormalizer,
}

impl CsvTradeReader {
    /// Create a reader using `normalizer` for column resolution.
    pub fn new(normalizer: TableNormalizer) -> Self {
        Self { normalizer }
    }

    /// Read and normalise a CSV file.
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<NormalizedTable, LoaderError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoaderError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!("Loading trade data from {}", path.display());
        self.read(file)
    }

    /// Read and normalise CSV from any byte source.
    pub fn read<R: Read>(&self, source: R) -> Result<NormalizedTable, LoaderError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(source);

        let headers: Vec<String> = reader
            .byte_headers()?
            .iter()
            .map(|h| String::from_utf8_lossy(h).into_owned())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(SchemaError::EmptyHeader.into());
        }
        let schema = self.normalizer.resolve(&headers)?;

        let strict = strict_columns(&schema);
        let mut report = NormalizationReport::default();
        let mut records = Vec::new();
        let mut row = ByteRecord::new();
        while reader.read_byte_record(&mut row)? {
            report.total_rows += 1;
            let Some(decoded) = decode_row(&row, &strict) else {
                report.invalid_encoding += 1;
                continue;
            };
            let fields: Vec<&str> = decoded.iter().map(|f| f.as_ref()).collect();
            if let Some(record) = schema.parse_row(&fields, &mut report) {
                records.push(record);
            }
        }

        let normalized = TableNormalizer::finish(schema, records, report);
        info!(
            rows = normalized.report.total_rows,
            kept = normalized.report.kept_rows,
            "Trade data loaded"
        );
        Ok(normalized)
    }
}

/// Columns whose bytes decide a record's identity or orientation.
fn strict_columns(schema: &ResolvedSchema) -> Vec<usize> {
    let mut columns = vec![
        schema.importer.index,
        schema.exporter.index,
        schema.year.index,
        schema.value.index,
    ];
    columns.extend(schema.flow.as_ref().map(|c| c.index));
    columns
}

/// Decode a row as UTF-8.
///
/// Strict columns must decode cleanly or the row is rejected; free-text
/// columns such as the commodity description are decoded lossily.
fn decode_row<'a>(row: &'a ByteRecord, strict: &[usize]) -> Option<Vec<Cow<'a, str>>> {
    row.iter()
        .enumerate()
        .map(|(idx, bytes)| {
            if strict.contains(&idx) {
                std::str::from_utf8(bytes).ok().map(Cow::Borrowed)
            } else {
                Some(String::from_utf8_lossy(bytes))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_flexible_rows() {
        let data = "Importer,Exporter,Year,Value\nUSA,CHN,2023,5\nUSA,MEX\n";
        let normalized = CsvTradeReader::default().read(data.as_bytes()).unwrap();
        assert_eq!(normalized.report.total_rows, 2);
        assert_eq!(normalized.report.kept_rows, 1);
    }

    #[test]
    fn test_read_empty_input_is_schema_error() {
        let err = CsvTradeReader::default().read("".as_bytes()).unwrap_err();
        assert!(matches!(err, LoaderError::Schema(SchemaError::EmptyHeader)));
    }

    #[test]
    fn test_read_missing_file() {
        let err = CsvTradeReader::default()
            .read_path("/definitely/not/here.csv")
            .unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
        assert!(err.to_string().contains("not/here.csv"));
    }

    #[test]
    fn test_bad_commodity_bytes_are_decoded_lossily() {
        let mut data = b"reporterISO,partnerISO,refYear,primaryValue,cmdDesc\n".to_vec();
        data.extend_from_slice(b"USA,CHN,2023,10,Wheat\n");
        data.extend_from_slice(b"FRA,DEU,2023,5,Caf\xE9\n");
        data.extend_from_slice(b"GBR,IND,2023,7,Rice\n");

        let normalized = CsvTradeReader::default().read(data.as_slice()).unwrap();
        assert_eq!(normalized.report.total_rows, 3);
        assert_eq!(normalized.report.kept_rows, 3);
        assert_eq!(normalized.report.invalid_encoding, 0);
        let fra = &normalized.table.records()[1];
        assert_eq!(fra.importer.as_str(), "FRA");
        assert_eq!(fra.commodity.as_deref(), Some("Caf\u{FFFD}"));
    }

    #[test]
    fn test_bad_country_bytes_drop_only_that_row() {
        let mut data = b"reporterISO,partnerISO,refYear,primaryValue\n".to_vec();
        data.extend_from_slice(b"USA,CHN,2023,10\n");
        data.extend_from_slice(b"FR\xFF,DEU,2023,5\n");
        data.extend_from_slice(b"GBR,IND,2023,7\n");

        let normalized = CsvTradeReader::default().read(data.as_slice()).unwrap();
        assert_eq!(normalized.report.total_rows, 3);
        assert_eq!(normalized.report.kept_rows, 2);
        assert_eq!(normalized.report.invalid_encoding, 1);
        assert_eq!(normalized.report.dropped_rows(), 1);
    }
}
