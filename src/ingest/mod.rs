/// Booking extract ingest.
///
/// Submodules:
/// - `extract` - reads the raw CSV extract into `ExtractRow`s.
/// - `clean`   - derives, validates and filters rows into `BookingRecord`s.

pub mod clean;
pub mod extract;

use std::path::Path;

use crate::logging::{self, Stage};
use crate::model::{BookingRecord, ExtractError};

/// Reads and cleans the extract at `path`.
pub fn load_bookings(path: &Path) -> Result<Vec<BookingRecord>, ExtractError> {
    let subject = path.display().to_string();

    let rows = extract::read_extract_file(path)?;
    logging::debug(
        Stage::Extract,
        Some(&subject),
        &format!("read {} data rows", rows.len()),
    );

    let records = clean::clean_rows(&rows)?;
    logging::log_clean_summary(rows.len(), records.len());

    Ok(records)
}
