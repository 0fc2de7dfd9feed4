//! Job and task identifiers.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

use crate::ValidationError;

/// Human-readable job id used when the caller doesn't supply one:
/// `Rt-estimation-<as_of>-<uuid hex>`, with colons replaced so the id is
/// safe to use as a storage key prefix.
///
/// The random suffix keeps ids unique across invocations sharing a timestamp.
pub fn generate_default_job_id(as_of: &DateTime<Utc>) -> String {
    let stamp = as_of.to_rfc3339_opts(SecondsFormat::Micros, false);
    format!("Rt-estimation-{}-{}", stamp, Uuid::new_v4().simple()).replace(':', "-")
}

/// Id of a single task within a job: `<job_id>_<unit>_<disease>`.
pub fn task_id(job_id: &str, unit: &str, disease: &str) -> String {
    format!("{job_id}_{unit}_{disease}")
}

/// Fail unless `job_id` can be used as the first segment of a storage key.
pub fn check_job_id(job_id: &str) -> Result<(), ValidationError> {
    if job_id.trim().is_empty() {
        return Err(ValidationError::EmptyJobId);
    }
    if job_id.contains(['/', '\\']) || job_id == "." || job_id == ".." {
        return Err(ValidationError::InvalidJobId(job_id.to_owned()));
    }
    Ok(())
}

/// Job id for one report date of a backfill: `<name>_<report_date>`.
pub fn backfill_job_id(name: &str, report_date: NaiveDate) -> String {
    format!("{name}_{report_date}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_job_id() {
        let as_of = Utc.with_ymd_and_hms(2024, 12, 17, 19, 50, 6).unwrap();
        let a = generate_default_job_id(&as_of);
        let b = generate_default_job_id(&as_of);
        assert!(a.starts_with("Rt-estimation-2024-12-17T19-50-06.000000+00-00-"));
        assert!(!a.contains(':'));
        assert_ne!(a, b, "same timestamp still gives distinct ids");
    }

    #[test]
    fn test_task_id() {
        assert_eq!(task_id("job", "NY", "COVID-19"), "job_NY_COVID-19");
    }

    #[test]
    fn test_backfill_job_id() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 5).unwrap();
        assert_eq!(backfill_job_id("nssp_api_v2", date), "nssp_api_v2_2024-11-05");
    }
}
