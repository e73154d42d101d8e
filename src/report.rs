/// Revenue lag report driver.
///
/// One run: load and clean the extract, aggregate lag by time of day, fare
/// class and route, test each grouping against the dataset mean, and write
/// the five bar charts. Test results are returned and logged; nothing but
/// the chart images is written to disk.

use std::path::{Path, PathBuf};

use crate::analysis::goodness_of_fit::{self, FitError, GoodnessOfFit};
use crate::analysis::groupings::{self, LagGroup};
use crate::charts::{self, BarChart, ChartStyle, PlotError};
use crate::config::ReportConfig;
use crate::ingest;
use crate::logging::{self, Stage};
use crate::model::{BookingRecord, ExtractError};

// ---------------------------------------------------------------------------
// Report constants
// ---------------------------------------------------------------------------

/// Routes need strictly more bookings than this to be charted and tested.
pub const MIN_ROUTE_BOOKINGS: usize = 100;

/// Number of routes in each of the shortest/longest route charts.
pub const ROUTE_CHART_LEN: usize = 20;

pub const CHART_LAG_VS_HOUR: &str = "LagVsHour.png";
pub const CHART_LAG_VS_FARE_CLASS: &str = "LagVsFareClass.png";
pub const CHART_LAG_VS_FARE_CLASS_TRIMMED: &str = "LagVsFareClassWithoutN.png";
pub const CHART_LONGEST_ROUTES: &str = "LagVsOrgDestB.png";
pub const CHART_SHORTEST_ROUTES: &str = "LagVsOrgDestT.png";

const DAYS: &str = "Days";

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Goodness-of-fit of each grouping against the dataset mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSummary {
    pub time_of_day: GoodnessOfFit,
    pub fare_class: GoodnessOfFit,
    /// `None` when no route is busy enough to test.
    pub origin_dest: Option<GoodnessOfFit>,
}

/// Everything computed from the cleaned bookings.
#[derive(Debug, Clone, PartialEq)]
pub struct LagReport {
    pub bookings: usize,
    pub overall_mean_lag: f64,
    /// Bucket order.
    pub by_time_of_day: Vec<LagGroup>,
    /// Ascending by mean lag.
    pub by_fare_class: Vec<LagGroup>,
    /// Busy routes only, ascending by mean lag.
    pub busy_routes: Vec<LagGroup>,
    pub fits: FitSummary,
}

impl LagReport {
    /// Every fare class except the one with the longest lag.
    pub fn fare_classes_without_last(&self) -> &[LagGroup] {
        let keep = self.by_fare_class.len().saturating_sub(1);
        &self.by_fare_class[..keep]
    }

    pub fn shortest_routes(&self) -> &[LagGroup] {
        groupings::head(&self.busy_routes, ROUTE_CHART_LEN)
    }

    pub fn longest_routes(&self) -> &[LagGroup] {
        groupings::tail(&self.busy_routes, ROUTE_CHART_LEN)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ReportError {
    Extract(ExtractError),
    /// No booking survived cleaning.
    EmptyDataset,
    Fit { grouping: &'static str, source: FitError },
    Plot { chart: &'static str, source: PlotError },
    /// The images directory could not be created.
    Io(std::io::Error),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Extract(e) => write!(f, "Extract error: {}", e),
            ReportError::EmptyDataset => write!(f, "No bookings left after cleaning"),
            ReportError::Fit { grouping, source } => {
                write!(f, "Goodness-of-fit by {} failed: {}", grouping, source)
            }
            ReportError::Plot { chart, source } => write!(f, "Chart {} failed: {}", chart, source),
            ReportError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<ExtractError> for ReportError {
    fn from(err: ExtractError) -> Self {
        ReportError::Extract(err)
    }
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::Io(err)
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

fn fit(groups: &[LagGroup], expected: f64, grouping: &'static str) -> Result<GoodnessOfFit, ReportError> {
    goodness_of_fit::chi_square(groups, expected)
        .map_err(|source| ReportError::Fit { grouping, source })
}

/// Computes every grouping and test of the report.
///
/// Fails on an empty dataset. Routes with at most `MIN_ROUTE_BOOKINGS`
/// bookings are left out of the route grouping and its test.
pub fn build_report(records: &[BookingRecord]) -> Result<LagReport, ReportError> {
    let overall_mean_lag =
        groupings::overall_mean_lag(records).ok_or(ReportError::EmptyDataset)?;

    let by_time_of_day = groupings::by_time_of_day(records);

    let mut by_fare_class = groupings::by_fare_class(records);
    groupings::sort_by_mean_lag(&mut by_fare_class);

    let mut busy_routes =
        groupings::with_more_than(groupings::by_origin_dest(records), MIN_ROUTE_BOOKINGS);
    groupings::sort_by_mean_lag(&mut busy_routes);

    let fits = FitSummary {
        time_of_day: fit(&by_time_of_day, overall_mean_lag, "time of day")?,
        fare_class: fit(&by_fare_class, overall_mean_lag, "fare class")?,
        origin_dest: if busy_routes.is_empty() {
            None
        } else {
            Some(fit(&busy_routes, overall_mean_lag, "origin-dest")?)
        },
    };

    Ok(LagReport {
        bookings: records.len(),
        overall_mean_lag,
        by_time_of_day,
        by_fare_class,
        busy_routes,
        fits,
    })
}

fn log_fit(grouping: &str, fit: &GoodnessOfFit) {
    logging::info(
        Stage::Analysis,
        Some(grouping),
        &format!(
            "chi-square = {:.4}, p = {:.4} ({} dof)",
            fit.statistic, fit.p_value, fit.degrees_of_freedom
        ),
    );
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// The five report charts, paired with their file names.
pub fn chart_plan<'r>(report: &'r LagReport) -> Vec<(&'static str, BarChart<'r>)> {
    let mean = report.overall_mean_lag;
    let chart = |title: &'static str,
                 x_label: &'static str,
                 bars: &'r [LagGroup],
                 rotate_labels: bool| BarChart {
        title,
        x_label,
        y_label: DAYS,
        bars,
        reference: mean,
        rotate_labels,
    };

    vec![
        (
            CHART_LAG_VS_HOUR,
            chart(
                "Revenue Lag Grouped by Purchase Hour",
                "Time Of Day (24 Hour)",
                report.by_time_of_day.as_slice(),
                false,
            ),
        ),
        (
            CHART_LAG_VS_FARE_CLASS,
            chart(
                "Revenue Lag Grouped by Fare Class",
                "Fare Class",
                report.by_fare_class.as_slice(),
                false,
            ),
        ),
        (
            CHART_LAG_VS_FARE_CLASS_TRIMMED,
            chart(
                "Revenue Lag Grouped by Fare Class",
                "Fare Class",
                report.fare_classes_without_last(),
                false,
            ),
        ),
        (
            CHART_LONGEST_ROUTES,
            chart(
                "Revenue Lag Grouped by Origin Destination (Longest 20)",
                "Origin-Dest",
                report.longest_routes(),
                true,
            ),
        ),
        (
            CHART_SHORTEST_ROUTES,
            chart(
                "Revenue Lag Grouped by Origin Destination (Shortest 20)",
                "Origin-Dest",
                report.shortest_routes(),
                true,
            ),
        ),
    ]
}

/// Writes the report charts into `images_dir`, creating it if needed.
///
/// Charts with no bars (no busy routes, a single fare class) are skipped
/// with a warning. Returns the paths written.
pub fn render_charts(
    report: &LagReport,
    style: &ChartStyle,
    images_dir: &Path,
) -> Result<Vec<PathBuf>, ReportError> {
    std::fs::create_dir_all(images_dir)?;

    let mut written = Vec::new();
    for (file_name, chart) in chart_plan(report) {
        if chart.bars.is_empty() {
            logging::warn(Stage::Chart, Some(file_name), "nothing to plot, skipped");
            continue;
        }

        let path = images_dir.join(file_name);
        charts::render_bar_chart(&chart, style, &path)
            .map_err(|source| ReportError::Plot { chart: file_name, source })?;

        logging::info(
            Stage::Chart,
            Some(file_name),
            &format!("{} bars written to {}", chart.bars.len(), path.display()),
        );
        written.push(path);
    }

    Ok(written)
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Runs the whole report for `config`.
pub fn run(config: &ReportConfig) -> Result<LagReport, ReportError> {
    let records = ingest::load_bookings(&config.input_path)?;

    let report = build_report(&records)?;
    logging::info(
        Stage::Analysis,
        None,
        &format!(
            "{} bookings, mean revenue lag {:.2} days, {} busy routes",
            report.bookings,
            report.overall_mean_lag,
            report.busy_routes.len()
        ),
    );
    log_fit("time of day", &report.fits.time_of_day);
    log_fit("fare class", &report.fits.fare_class);
    match &report.fits.origin_dest {
        Some(fit) => log_fit("origin-dest", fit),
        None => logging::warn(
            Stage::Analysis,
            Some("origin-dest"),
            &format!("no route has more than {} bookings", MIN_ROUTE_BOOKINGS),
        ),
    }

    render_charts(&report, &ChartStyle::default(), &config.images_dir)?;

    Ok(report)
}
