//! Revenue lag report for an airline booking reconciliation extract.
//!
//! Loads the extract, cleans it into `BookingRecord`s, aggregates the
//! revenue lag (days between booking and flight) by booking time of day,
//! fare class and route, renders bar charts, and runs chi-square
//! goodness-of-fit tests of each grouping against the dataset mean.

pub mod analysis;
pub mod charts;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod report;
pub mod time_of_day;
