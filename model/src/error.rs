use chrono::NaiveDate;

/// Malformed or out-of-domain input.
#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Unit \"{0}\" not recognized")]
    UnknownUnit(String),
    #[error("Disease \"{0}\" not recognized (valid options are {1})")]
    UnknownDisease(String, String),
    #[error("Data source \"{0}\" not recognized (valid options are {1})")]
    UnknownDataSource(String, String),
    #[error("report_date {report} is after production_date {production}")]
    ReportAfterProduction {
        report: NaiveDate,
        production: NaiveDate,
    },
    #[error("At least one reference date is required")]
    NoReferenceDates,
    #[error("Reference dates must be strictly increasing: {1} does not come after {0}")]
    ReferenceDatesUnordered(NaiveDate, NaiveDate),
    #[error("Reference date {0} is after report date {1}")]
    ReferenceAfterReport(NaiveDate, NaiveDate),
    #[error("Invalid date \"{0}\" (use YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("Invalid timestamp \"{0}\" (use RFC 3339, e.g. 2024-12-17T19:50:06Z)")]
    InvalidTimestamp(String),
    #[error("Job id must not be empty")]
    EmptyJobId,
    #[error("Invalid job id \"{0}\": it can't contain '/' or '\\', or be '.' or '..'")]
    InvalidJobId(String),
    #[error("Can't go back {1} days from {0}")]
    SpanOutOfRange(NaiveDate, u64),
    #[error("A re-run requires a data exclusions path")]
    MissingExclusions,
    #[error("report_dates, data_paths and as_of_dates must all be the same length (got {0}, {1} and {2})")]
    LengthMismatch(usize, usize, usize),
    #[error(transparent)]
    Syntax(#[from] syntax::Error),
}
