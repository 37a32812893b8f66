use csv::ReaderBuilder;
use std::io::Cursor;
use tracing::{debug, info, error};
use crate::domain::{error::IngestionError, models::RawReading};

pub fn parse_csv(bytes: &[u8]) -> Result<Vec<RawReading>, IngestionError> {
    debug!("Creating CSV reader with headers enabled");
    let cursor = Cursor::new(bytes);
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(cursor);

    let headers = reader.headers()
        .map_err(|e| {
            error!("Failed to read CSV headers: {}", e);
            IngestionError::Parse(e.to_string())
        })?.clone();

    debug!("CSV headers: {:?}", headers);
    info!("Found {} columns in CSV", headers.len());

    let mut rows = Vec::new();
    let mut row_count = 0;

    for record in reader.deserialize::<RawReading>() {
        let row = record.map_err(|e| {
            error!("Failed to read CSV record at row {}: {}", row_count + 1, e);
            IngestionError::Parse(e.to_string())
        })?;

        row_count += 1;
        rows.push(row);

        if row_count % 1000 == 0 {
            debug!("Processed {} CSV rows", row_count);
        }
    }

    info!("Parsed {} rows from CSV", row_count);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_in_source_order() {
        let csv = b"customer_id,date,consumption_kwh\nC1,2024-01-05,12.5\nC2,2024-01-06,3.0\n";
        let rows = parse_csv(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].customer_id.as_deref(), Some("C1"));
        assert_eq!(rows[0].date.as_deref(), Some("2024-01-05"));
        assert_eq!(rows[0].consumption_kwh.as_deref(), Some("12.5"));
        assert_eq!(rows[1].customer_id.as_deref(), Some("C2"));
    }

    #[test]
    fn skips_empty_lines() {
        let csv = b"customer_id,date,consumption_kwh\nC1,2024-01-05,12.5\n\n\nC2,2024-01-06,3.0\n";
        let rows = parse_csv(csv).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn ignores_unrecognized_columns() {
        let csv = b"customer_id,region,date,consumption_kwh\nC1,north,2024-01-05,12.5\n";
        let rows = parse_csv(csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer_id.as_deref(), Some("C1"));
        assert_eq!(rows[0].consumption_kwh.as_deref(), Some("12.5"));
    }

    #[test]
    fn missing_columns_deserialize_as_none() {
        let csv = b"customer_id,date\nC1,2024-01-05\n";
        let rows = parse_csv(csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].consumption_kwh.is_none());
    }

    #[test]
    fn empty_cells_deserialize_as_none() {
        let csv = b"customer_id,date,consumption_kwh\nC1,,12.5\n";
        let rows = parse_csv(csv).unwrap();
        assert!(rows[0].date.is_none());
        assert!(rows[0].customer_id.is_some());
    }

    #[test]
    fn ragged_record_is_a_parse_failure() {
        let csv = b"customer_id,date,consumption_kwh\nC1,2024-01-05\n";
        let err = parse_csv(csv).unwrap_err();
        assert!(matches!(err, IngestionError::Parse(_)));
    }

    #[test]
    fn header_only_file_yields_no_rows() {
        let csv = b"customer_id,date,consumption_kwh\n";
        let rows = parse_csv(csv).unwrap();
        assert!(rows.is_empty());
    }
}
