/// Reconciliation extract reader.
///
/// The extract is a comma-separated file laid out as:
///
/// ```text
/// <metadata line>
/// FlightDate,BookingDate,SegmentOrigin,SegmentDest,FareClass,BookingAgent,...
/// <placeholder row>
/// <data rows>
/// ```
///
/// Columns are located by header name, so their order and any extra columns
/// do not matter. The placeholder row directly under the header is dropped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::model::{ExtractError, ExtractRow};

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

pub const COL_FLIGHT_DATE: &str = "FlightDate";
pub const COL_BOOKING_DATE: &str = "BookingDate";
pub const COL_SEGMENT_ORIGIN: &str = "SegmentOrigin";
pub const COL_SEGMENT_DEST: &str = "SegmentDest";
pub const COL_FARE_CLASS: &str = "FareClass";
pub const COL_BOOKING_AGENT: &str = "BookingAgent";

/// The columns read from the extract, in layout order.
pub const COLUMNS: [&str; 6] = [
    COL_FLIGHT_DATE,
    COL_BOOKING_DATE,
    COL_SEGMENT_ORIGIN,
    COL_SEGMENT_DEST,
    COL_FARE_CLASS,
    COL_BOOKING_AGENT,
];

/// Cell values read as missing, matching the NA tokens the extract's
/// producers recognize.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Header positions of the six extract columns.
struct ColumnIndex {
    flight_date: usize,
    booking_date: usize,
    segment_origin: usize,
    segment_dest: usize,
    fare_class: usize,
    booking_agent: usize,
}

impl ColumnIndex {
    fn from_header(header: &StringRecord) -> Result<Self, ExtractError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ExtractError::MissingColumn(name.to_string()))
        };

        Ok(ColumnIndex {
            flight_date: find(COL_FLIGHT_DATE)?,
            booking_date: find(COL_BOOKING_DATE)?,
            segment_origin: find(COL_SEGMENT_ORIGIN)?,
            segment_dest: find(COL_SEGMENT_DEST)?,
            fare_class: find(COL_FARE_CLASS)?,
            booking_agent: find(COL_BOOKING_AGENT)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Returns the cell at `idx`, or `None` if it is absent or an NA token.
fn cell(record: &StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .filter(|value| !NA_TOKENS.contains(value))
        .map(str::to_string)
}

/// Reads every data row of an extract.
///
/// Fails if the metadata line or header row is missing, if a required column
/// is absent, or if the underlying reader errors.
pub fn read_extract<R: Read>(reader: R) -> Result<Vec<ExtractRow>, ExtractError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = csv_reader.records();

    // Metadata preamble, then the real header.
    records.next().transpose()?.ok_or(ExtractError::MissingHeader)?;
    let header = records.next().transpose()?.ok_or(ExtractError::MissingHeader)?;
    let columns = ColumnIndex::from_header(&header)?;

    // Placeholder row under the header.
    if records.next().transpose()?.is_none() {
        return Ok(Vec::new());
    }

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        rows.push(ExtractRow {
            line,
            flight_date: cell(&record, columns.flight_date),
            booking_date: cell(&record, columns.booking_date),
            segment_origin: cell(&record, columns.segment_origin),
            segment_dest: cell(&record, columns.segment_dest),
            fare_class: cell(&record, columns.fare_class),
            booking_agent: cell(&record, columns.booking_agent),
        });
    }

    Ok(rows)
}

/// Opens `path` and reads it with [`read_extract`].
pub fn read_extract_file(path: &Path) -> Result<Vec<ExtractRow>, ExtractError> {
    let file = File::open(path)
        .map_err(|e| ExtractError::Read(format!("{}: {}", path.display(), e)))?;
    read_extract(file)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "FlightDate,BookingDate,SegmentOrigin,SegmentDest,FareClass,BookingAgent";

    fn extract(body: &str) -> String {
        format!("Reconciliation Extract generated 2023-06-01\n{}\n,,,,,\n{}", HEADER, body)
    }

    #[test]
    fn test_skips_metadata_header_and_placeholder() {
        let text = extract("2023-05-10,2023-05-01 08:00,DEN,LAS,Y,WEB\n");
        let rows = read_extract(text.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line, 4);
        assert_eq!(rows[0].flight_date.as_deref(), Some("2023-05-10"));
        assert_eq!(rows[0].segment_origin.as_deref(), Some("DEN"));
        assert_eq!(rows[0].booking_agent.as_deref(), Some("WEB"));
    }

    #[test]
    fn test_columns_are_found_by_name() {
        let text = "meta\n\
                    Extra,BookingAgent,FareClass,SegmentDest,SegmentOrigin,BookingDate,FlightDate\n\
                    placeholder\n\
                    x,CALL,Z,MCO,ATL,2023-01-02 10:00,2023-02-01\n";
        let rows = read_extract(text.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fare_class.as_deref(), Some("Z"));
        assert_eq!(rows[0].segment_origin.as_deref(), Some("ATL"));
        assert_eq!(rows[0].segment_dest.as_deref(), Some("MCO"));
        assert_eq!(rows[0].booking_agent.as_deref(), Some("CALL"));
    }

    #[test]
    fn test_na_tokens_and_short_rows_are_missing() {
        let text = extract("2023-05-10,NULL,DEN,,Y\n");
        let rows = read_extract(text.as_bytes()).unwrap();

        assert_eq!(rows[0].booking_date, None);
        assert_eq!(rows[0].segment_dest, None);
        assert_eq!(rows[0].booking_agent, None);
    }

    #[test]
    fn test_whitespace_is_kept_for_the_cleaner() {
        let text = extract("2023-05-10,2023-05-01 08:00,DEN,LAS,  ,WEB\n");
        let rows = read_extract(text.as_bytes()).unwrap();
        assert_eq!(rows[0].fare_class.as_deref(), Some("  "));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let text = "meta\nFlightDate,BookingDate,SegmentOrigin,SegmentDest,BookingAgent\n";
        let err = read_extract(text.as_bytes()).unwrap_err();
        assert_eq!(err, ExtractError::MissingColumn("FareClass".to_string()));
    }

    #[test]
    fn test_empty_input_has_no_header() {
        assert_eq!(read_extract("".as_bytes()).unwrap_err(), ExtractError::MissingHeader);
        assert_eq!(read_extract("meta only\n".as_bytes()).unwrap_err(), ExtractError::MissingHeader);
    }

    #[test]
    fn test_header_without_data_is_empty() {
        let text = format!("meta\n{}\n", HEADER);
        assert!(read_extract(text.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let err = read_extract_file(Path::new("/nonexistent/extract.csv")).unwrap_err();
        assert!(matches!(err, ExtractError::Read(_)));
    }
}
