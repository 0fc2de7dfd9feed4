use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::{check_job_id, Catalog, ExclusionsRef, ValidationError};

/// Global parameters for one generation run.
///
/// Built once by a driver function and read by every task it produces.
/// `as_of` is the frozen "now" for the run; nothing downstream reads the clock.
#[derive(Debug, Clone, PartialEq)]
pub struct RunParameters {
    /// Date of the data snapshot used for the run.
    pub report_date: NaiveDate,
    /// Reference (event) dates, strictly increasing.
    pub reference_dates: Vec<NaiveDate>,
    /// Path to input data within `data_container`.
    pub data_path: String,
    pub data_container: String,
    pub production_date: NaiveDate,
    pub job_id: String,
    /// Timestamp as of which parameter estimates are fetched.
    pub as_of: DateTime<Utc>,
    pub output_container: String,
    /// Optional tag naming the upstream data source (e.g. `nssp`).
    pub data_source: Option<String>,
    /// Data exclusions file the model should apply, if any.
    pub exclusions: ExclusionsRef,
}

impl RunParameters {
    /// Check the cross-field invariants:
    /// - report date is on or before production date
    /// - reference dates are non-empty, strictly increasing, and not after the report date
    /// - job id is non-empty and usable as a storage key segment
    /// - data source, if given, is recognized
    pub fn validate(&self, catalog: &Catalog) -> Result<(), ValidationError> {
        if self.report_date > self.production_date {
            return Err(ValidationError::ReportAfterProduction {
                report: self.report_date,
                production: self.production_date,
            });
        }

        if self.reference_dates.is_empty() {
            return Err(ValidationError::NoReferenceDates);
        }
        for pair in self.reference_dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ValidationError::ReferenceDatesUnordered(pair[0], pair[1]));
            }
        }
        for &date in &self.reference_dates {
            if date > self.report_date {
                return Err(ValidationError::ReferenceAfterReport(date, self.report_date));
            }
        }

        check_job_id(&self.job_id)?;

        if let Some(source) = &self.data_source {
            catalog.check_data_source(source)?;
        }

        Ok(())
    }
}

/// Default reference window for a report date:
/// from `lookback_days` before the report date up to the day before it.
pub fn reference_window(
    report_date: NaiveDate,
    lookback_days: u64,
) -> Result<Vec<NaiveDate>, ValidationError> {
    let back = |days: u64| {
        report_date
            .checked_sub_days(Days::new(days))
            .ok_or(ValidationError::SpanOutOfRange(report_date, days))
    };
    Ok(vec![back(lookback_days)?, back(1)?])
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(text: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(text.to_owned()))
}

/// Parse a comma-separated list of `YYYY-MM-DD` dates, keeping the given order.
pub fn parse_dates(text: &str) -> Result<Vec<NaiveDate>, ValidationError> {
    syntax::list(text)?.into_iter().map(parse_date).collect()
}

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidTimestamp(text.to_owned()))
}
