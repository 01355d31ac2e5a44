//! GeoNames postal code dump -> [`ReferenceTable`].
//!
//! The dump is tab-delimited without a header. Column 2 is the postal code,
//! columns 10 and 11 are the WGS-84 latitude and longitude.

use crate::core::resolver::normalize_code;
use crate::domain::model::{Coordinate, ReferenceTable};
use crate::utils::error::{EtlError, Result};
use std::io::Read;

const CODE_COLUMN: usize = 1;
const LATITUDE_COLUMN: usize = 9;
const LONGITUDE_COLUMN: usize = 10;

pub fn parse_reference_table<R: Read>(
    reader: R,
    source_name: &str,
    pad_width: Option<usize>,
) -> Result<ReferenceTable> {
    let min_columns = CODE_COLUMN.max(LATITUDE_COLUMN).max(LONGITUDE_COLUMN) + 1;

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut table = ReferenceTable::new();
    for (index, row) in csv_reader.records().enumerate() {
        let line = index + 1;
        let row = row?;

        if row.len() < min_columns {
            tracing::warn!(
                "Skipping line {} of {}: expected at least {} tab-delimited columns, found {}",
                line,
                source_name,
                min_columns,
                row.len()
            );
            continue;
        }

        let code = normalize_code(&row[CODE_COLUMN], pad_width);
        let latitude = parse_degrees(&row[LATITUDE_COLUMN], "latitude", line, source_name)?;
        let longitude = parse_degrees(&row[LONGITUDE_COLUMN], "longitude", line, source_name)?;
        let coordinate =
            Coordinate::new(latitude, longitude).map_err(|e| EtlError::ReferenceDataError {
                message: format!("line {} of {}: {}", line, source_name, e),
            })?;

        table.insert(code, coordinate);
    }

    if table.is_empty() {
        return Err(EtlError::ReferenceDataError {
            message: format!("no postal codes read from {}", source_name),
        });
    }

    tracing::info!(
        "📍 Read coordinates for {} postal codes from {}",
        table.len(),
        source_name
    );
    Ok(table)
}

fn parse_degrees(field: &str, what: &str, line: usize, source_name: &str) -> Result<f64> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|e| EtlError::ReferenceDataError {
            message: format!(
                "line {} of {}: cannot parse {} '{}': {}",
                line, source_name, what, field, e
            ),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "US\t10552\tMount Vernon\tNew York\tNY\tWestchester\t119\t\t\t40.9246\t-73.8262\t4\n\
US\t10550\tMount Vernon\tNew York\tNY\tWestchester\t119\t\t\t40.9079\t-73.8378\t4\n\
US\t53013\tCedar Grove\tWisconsin\tWI\tSheboygan\t117\t\t\t43.5669\t-87.8286\t4\n";

    #[test]
    fn test_parse_geonames_rows() {
        let table = parse_reference_table(SAMPLE.as_bytes(), "US.txt", None).unwrap();
        assert_eq!(table.len(), 3);

        let coord = table["53013"];
        assert_eq!(coord.latitude(), 43.5669);
        assert_eq!(coord.longitude(), -87.8286);
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let input = format!("{}US\t00000\tnowhere\n\n", SAMPLE);
        let table = parse_reference_table(input.as_bytes(), "US.txt", None).unwrap();
        assert_eq!(table.len(), 3);
        assert!(!table.contains_key("00000"));
    }

    #[test]
    fn test_unparseable_latitude_names_the_line() {
        let input = format!("{}US\t11111\tX\tY\tZ\t\t\t\t\tnorth\t-73.0\t1\n", SAMPLE);
        let err = parse_reference_table(input.as_bytes(), "US.txt", None).unwrap_err();
        match err {
            EtlError::ReferenceDataError { message } => {
                assert!(message.contains("line 4"), "{}", message);
                assert!(message.contains("latitude"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_place_names_with_quotes_are_read_verbatim() {
        let input = "US\t99501\t\"Anchorage\tAlaska\tAK\tAnchorage\t020\t\t\t61.2211\t-149.8763\t4\n";
        let table = parse_reference_table(input.as_bytes(), "US.txt", None).unwrap();
        assert!(table.contains_key("99501"));
    }

    #[test]
    fn test_codes_are_padded_when_configured() {
        let input = "US\t7030\tHoboken\tNew Jersey\tNJ\tHudson\t017\t\t\t40.7445\t-74.0329\t4\n";
        let table = parse_reference_table(input.as_bytes(), "US.txt", Some(5)).unwrap();
        assert!(table.contains_key("07030"));
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let err = parse_reference_table("".as_bytes(), "US.txt", None).unwrap_err();
        assert!(matches!(err, EtlError::ReferenceDataError { .. }));
    }
}
