/// Booking extract cleaning.
///
/// Turns raw `ExtractRow`s into `BookingRecord`s. The order of operations
/// matters and is kept fixed:
///
///  1. join origin and destination into one route identifier
///  2. parse flight dates strictly (a bad value aborts the load)
///  3. normalize blank/whitespace-only cells to missing
///  4. parse booking dates leniently (a bad value becomes missing)
///  5. bucket the booking hour and compute the revenue lag
///  6. drop incomplete rows, truncate booking dates to days
///  7. drop non-revenue fare classes
///
/// Steps 1–5 live in `derive_row`, 6–7 in `filter_rows`. Rows are dropped
/// silently; only a total is logged by the caller.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::model::{BookingRecord, EXCLUDED_FARE_CLASSES, ExtractError, ExtractRow};
use crate::time_of_day::{TimeOfDay, time_of_day};

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Timestamp layouts accepted in either date column.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

/// Date-only layouts; these parse to midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Strict flight date parse. Any time component is discarded.
///
/// `line` is only used to build the error.
pub fn parse_flight_date(value: &str, line: u64) -> Result<NaiveDate, ExtractError> {
    parse_timestamp(value)
        .map(|ts| ts.date())
        .ok_or_else(|| ExtractError::InvalidFlightDate {
            line,
            value: value.to_string(),
        })
}

/// Lenient booking date parse: anything unparseable is missing.
pub fn parse_booking_date(value: &str) -> Option<NaiveDateTime> {
    parse_timestamp(value)
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// A row part-way through cleaning. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub flight_date: Option<NaiveDate>,
    pub booking_date: Option<NaiveDateTime>,
    pub origin_dest: Option<String>,
    pub fare_class: Option<String>,
    pub booking_agent: Option<String>,
    pub time_of_day: Option<TimeOfDay>,
    pub revenue_lag_days: Option<i64>,
}

impl From<&BookingRecord> for DerivedRow {
    fn from(record: &BookingRecord) -> Self {
        DerivedRow {
            flight_date: Some(record.flight_date),
            booking_date: Some(record.booking_date.and_time(NaiveTime::MIN)),
            origin_dest: Some(record.origin_dest.clone()),
            fare_class: Some(record.fare_class.clone()),
            booking_agent: Some(record.booking_agent.clone()),
            time_of_day: Some(record.time_of_day),
            revenue_lag_days: Some(record.revenue_lag_days),
        }
    }
}

/// Blank and whitespace-only values become missing.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Applies the derivation steps to one raw row.
///
/// The only failure is a present, malformed flight date. A blank flight date
/// is treated as missing.
pub fn derive_row(row: &ExtractRow) -> Result<DerivedRow, ExtractError> {
    let origin_dest = match (&row.segment_origin, &row.segment_dest) {
        (Some(origin), Some(dest)) => Some(format!("{}-{}", origin, dest)),
        _ => None,
    };

    let flight_date = match row.flight_date.as_deref() {
        Some(value) if !value.trim().is_empty() => Some(parse_flight_date(value, row.line)?),
        _ => None,
    };

    let origin_dest = non_blank(origin_dest);
    let fare_class = non_blank(row.fare_class.clone());
    let booking_agent = non_blank(row.booking_agent.clone());
    let booking_date = non_blank(row.booking_date.clone())
        .as_deref()
        .and_then(parse_booking_date);

    let time_of_day = booking_date.and_then(|ts| time_of_day(ts.hour()));
    let revenue_lag_days = match (flight_date, booking_date) {
        (Some(flight), Some(booked)) => Some((flight - booked.date()).num_days()),
        _ => None,
    };

    Ok(DerivedRow {
        flight_date,
        booking_date,
        origin_dest,
        fare_class,
        booking_agent,
        time_of_day,
        revenue_lag_days,
    })
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Returns the finished record if no value is missing, with the booking date
/// truncated to its calendar day.
pub fn retain_complete(row: DerivedRow) -> Option<BookingRecord> {
    Some(BookingRecord {
        flight_date: row.flight_date?,
        booking_date: row.booking_date?.date(),
        origin_dest: row.origin_dest?,
        fare_class: row.fare_class?,
        booking_agent: row.booking_agent?,
        time_of_day: row.time_of_day?,
        revenue_lag_days: row.revenue_lag_days?,
    })
}

/// `false` for the non-revenue standby and positive-space classes.
pub fn is_revenue_fare(fare_class: &str) -> bool {
    !EXCLUDED_FARE_CLASSES.contains(&fare_class)
}

/// Drops incomplete rows and non-revenue fares.
pub fn filter_rows(rows: Vec<DerivedRow>) -> Vec<BookingRecord> {
    rows.into_iter()
        .filter_map(retain_complete)
        .filter(|record| is_revenue_fare(&record.fare_class))
        .collect()
}

/// Full cleaning pass over a raw extract.
pub fn clean_rows(rows: &[ExtractRow]) -> Result<Vec<BookingRecord>, ExtractError> {
    let derived = rows
        .iter()
        .map(derive_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(filter_rows(derived))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(flight: &str, booking: &str, fare: &str) -> ExtractRow {
        ExtractRow {
            line: 4,
            flight_date: Some(flight.to_string()),
            booking_date: Some(booking.to_string()),
            segment_origin: Some("DEN".to_string()),
            segment_dest: Some("LAS".to_string()),
            fare_class: Some(fare.to_string()),
            booking_agent: Some("WEB".to_string()),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_reference_row_is_retained() {
        let records = clean_rows(&[raw("2023-05-10", "2023-05-01 08:00", "Y")]).unwrap();

        assert_eq!(
            records,
            vec![BookingRecord {
                flight_date: date(2023, 5, 10),
                booking_date: date(2023, 5, 1),
                origin_dest: "DEN-LAS".to_string(),
                fare_class: "Y".to_string(),
                booking_agent: "WEB".to_string(),
                time_of_day: TimeOfDay::Morning,
                revenue_lag_days: 9,
            }]
        );
    }

    #[test]
    fn test_negative_lag_is_kept() {
        let records = clean_rows(&[raw("2023-05-01", "2023-05-03 14:30", "Y")]).unwrap();
        assert_eq!(records[0].revenue_lag_days, -2);
        assert_eq!(records[0].time_of_day, TimeOfDay::Afternoon);
    }

    #[test]
    fn test_non_revenue_fares_are_removed() {
        let records = clean_rows(&[
            raw("2023-05-10", "2023-05-01 08:00", "AS"),
            raw("2023-05-10", "2023-05-01 08:00", "AP"),
            raw("2023-05-10", "2023-05-01 08:00", "N"),
        ])
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fare_class, "N");
    }

    #[test]
    fn test_bad_booking_date_is_missing_not_fatal() {
        let row = raw("2023-05-10", "not a date", "Y");

        let derived = derive_row(&row).unwrap();
        assert_eq!(derived.booking_date, None);
        assert_eq!(derived.revenue_lag_days, None);
        assert_eq!(derived.flight_date, Some(date(2023, 5, 10)));

        assert!(clean_rows(&[row]).unwrap().is_empty());
    }

    #[test]
    fn test_bad_flight_date_aborts() {
        let rows = [
            raw("2023-05-10", "2023-05-01 08:00", "Y"),
            raw("10 May", "2023-05-01 08:00", "Y"),
        ];
        let err = clean_rows(&rows).unwrap_err();
        assert_eq!(
            err,
            ExtractError::InvalidFlightDate { line: 4, value: "10 May".to_string() }
        );
    }

    #[test]
    fn test_blank_values_drop_the_row() {
        let mut blank_fare = raw("2023-05-10", "2023-05-01 08:00", "   ");
        let mut blank_flight = raw("  ", "2023-05-01 08:00", "Y");
        let mut no_agent = raw("2023-05-10", "2023-05-01 08:00", "Y");
        no_agent.booking_agent = None;
        let mut no_dest = raw("2023-05-10", "2023-05-01 08:00", "Y");
        no_dest.segment_dest = None;

        blank_fare.line = 5;
        blank_flight.line = 6;

        assert!(clean_rows(&[blank_fare, blank_flight, no_agent, no_dest]).unwrap().is_empty());
    }

    #[test]
    fn test_midnight_booking_has_no_bucket() {
        let derived = derive_row(&raw("2023-05-10", "2023-05-01", "Y")).unwrap();
        assert_eq!(derived.time_of_day, None);
        assert_eq!(derived.revenue_lag_days, Some(9));
        assert!(retain_complete(derived).is_none());
    }

    #[test]
    fn test_us_layouts_parse() {
        assert_eq!(parse_flight_date("05/10/2023", 1), Ok(date(2023, 5, 10)));
        assert_eq!(parse_flight_date("05/10/2023 23:15", 1), Ok(date(2023, 5, 10)));

        let ts = parse_booking_date("05/01/2023 08:15:00 PM").unwrap();
        assert_eq!(ts.hour(), 20);
        assert_eq!(ts.date(), date(2023, 5, 1));
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let records = clean_rows(&[
            raw("2023-05-10", "2023-05-01 08:00", "Y"),
            raw("2023-06-01", "2023-02-11 22:45", "Z"),
            raw("2023-06-01", "2023-02-11 22:45", "AS"),
        ])
        .unwrap();

        let again = filter_rows(records.iter().map(DerivedRow::from).collect());
        assert_eq!(again, records);
    }

    #[test]
    fn test_cleaning_never_adds_rows() {
        let rows = vec![
            raw("2023-05-10", "2023-05-01 08:00", "Y"),
            raw("2023-05-10", "garbage", "Y"),
            raw("2023-05-10", "2023-05-01 00:30", "Y"),
        ];
        let records = clean_rows(&rows).unwrap();
        assert!(records.len() <= rows.len());
        assert_eq!(records.len(), 1);
    }
}
