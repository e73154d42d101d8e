/// Core data types for the revenue lag report.
///
/// This module defines the shared domain model imported by all other modules:
/// the raw extract row, the cleaned booking record, and the extract error type.
/// It contains no I/O and no parsing logic.

use chrono::NaiveDate;

use crate::time_of_day::TimeOfDay;

// ---------------------------------------------------------------------------
// Fare classes
// ---------------------------------------------------------------------------

/// Non-revenue standby fare class.
pub const FARE_NONREV_STANDBY: &str = "AS";

/// Non-revenue positive-space fare class.
pub const FARE_NONREV_POSITIVE: &str = "AP";

/// Fare classes removed from every analysis.
pub const EXCLUDED_FARE_CLASSES: [&str; 2] = [FARE_NONREV_STANDBY, FARE_NONREV_POSITIVE];

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// One data row of the reconciliation extract, as read.
///
/// `None` marks a missing cell: an empty field, a recognized NA token, or a
/// field absent from a short row. Values are kept untrimmed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractRow {
    /// 1-based line number in the source file, for error reporting.
    pub line: u64,
    pub flight_date: Option<String>,
    pub booking_date: Option<String>,
    pub segment_origin: Option<String>,
    pub segment_dest: Option<String>,
    pub fare_class: Option<String>,
    pub booking_agent: Option<String>,
}

/// A cleaned booking. Every field is present; see `ingest::clean`.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRecord {
    pub flight_date: NaiveDate,
    /// Booking date truncated to calendar-date precision.
    pub booking_date: NaiveDate,
    /// `"<origin>-<dest>"`, e.g. `"DEN-LAS"`.
    pub origin_dest: String,
    pub fare_class: String,
    /// Carried through cleaning but not used by any grouping.
    pub booking_agent: String,
    pub time_of_day: TimeOfDay,
    /// Flight date minus booking date, in days. May be negative.
    pub revenue_lag_days: i64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that abort loading the booking extract.
#[derive(Debug, PartialEq)]
pub enum ExtractError {
    /// The file could not be opened or a record could not be read.
    Read(String),
    /// The file ended before the metadata line and header row.
    MissingHeader,
    /// A required column is absent from the header row.
    MissingColumn(String),
    /// A flight date is present but matches no accepted layout.
    InvalidFlightDate { line: u64, value: String },
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Read(msg) => write!(f, "Read error: {}", msg),
            ExtractError::MissingHeader => write!(f, "Extract has no header row"),
            ExtractError::MissingColumn(name) => write!(f, "Missing column: {}", name),
            ExtractError::InvalidFlightDate { line, value } => {
                write!(f, "Invalid flight date on line {}: {:?}", line, value)
            }
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<csv::Error> for ExtractError {
    fn from(err: csv::Error) -> Self {
        ExtractError::Read(err.to_string())
    }
}
