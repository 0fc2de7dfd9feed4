use chrono::{DateTime, NaiveDate, Utc};

use expand::{expand_batch, ExclusionSet, Selection};
use model::{
    backfill_job_id, check_job_id, generate_default_job_id, reference_window, BatchConfig,
    ExclusionsRef, GeneratorConfig, RunParameters, ValidationError,
};
use syntax::Span;
use util::Clock;

use crate::resolve::{exclusions_ref, resolve_exclusions, ExclusionSource};
use crate::store::{ObjectStore, PersistenceError};
use crate::Error;

/// Arguments to [`generate_config`] and [`generate_rerun_config`].
///
/// Anything left as `None` is defaulted from the frozen "now" of the run
/// and the [`GeneratorConfig`].
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub units: Selection,
    pub diseases: Selection,
    /// Defaults to today.
    pub report_date: Option<NaiveDate>,
    /// Defaults to the lookback window ending the day before the report date.
    pub reference_dates: Option<Vec<NaiveDate>>,
    /// Defaults to `gold/<report_date>.parquet`.
    pub data_path: Option<String>,
    pub data_container: Option<String>,
    /// Defaults to today.
    pub production_date: Option<NaiveDate>,
    /// Defaults to a generated `Rt-estimation-...` id.
    pub job_id: Option<String>,
    /// Defaults to now.
    pub as_of: Option<DateTime<Utc>>,
    pub output_container: Option<String>,
    pub data_source: Option<String>,
    /// Explicit `unit:disease` pairs to leave out.
    pub task_exclusions: Vec<String>,
    /// CSV file of `state,disease` pairs; `az://<container>/<blob>` or a local path.
    pub data_exclusions_path: Option<String>,
}

impl GenerateRequest {
    fn run_parameters(
        &self,
        now: DateTime<Utc>,
        exclusions: ExclusionsRef,
        config: &GeneratorConfig,
    ) -> Result<RunParameters, ValidationError> {
        let today = now.date_naive();
        let report_date = self.report_date.unwrap_or(today);
        let as_of = self.as_of.unwrap_or(now);

        let params = RunParameters {
            report_date,
            reference_dates: match &self.reference_dates {
                Some(dates) => dates.clone(),
                None => reference_window(report_date, config.lookback_days)?,
            },
            data_path: match &self.data_path {
                Some(path) => path.clone(),
                None => config.default_data_path(report_date),
            },
            data_container: self
                .data_container
                .clone()
                .unwrap_or_else(|| config.data_container.clone()),
            production_date: self.production_date.unwrap_or(today),
            job_id: match &self.job_id {
                Some(id) => id.clone(),
                None => generate_default_job_id(&as_of),
            },
            as_of,
            output_container: self
                .output_container
                .clone()
                .unwrap_or_else(|| config.output_container.clone()),
            data_source: self.data_source.clone(),
            exclusions,
        };
        params.validate(&config.catalog)?;
        Ok(params)
    }
}

/// Arguments to [`generate_backfill_config`].
///
/// `report_dates`, `data_paths` and `as_of_dates` are parallel lists.
#[derive(Debug, Clone)]
pub struct BackfillRequest {
    /// Prefix of every job id in the backfill.
    pub name: String,
    pub units: Selection,
    pub diseases: Selection,
    pub report_dates: Vec<NaiveDate>,
    /// How far before each report date the reference window starts.
    pub reference_span: Span,
    pub data_paths: Vec<String>,
    pub as_of_dates: Vec<DateTime<Utc>>,
    pub data_container: Option<String>,
    pub output_container: Option<String>,
    pub data_source: Option<String>,
    pub task_exclusions: Vec<String>,
}

/// Generate a full batch of task configs and write it to the config container.
///
/// Pairs listed in `task_exclusions` or in the data exclusions file are left out.
/// The clock is read once. Exactly one write is made, under
/// `<job_id>/<production_date>.json`; nothing is written if any step fails.
pub fn generate_config<S, C>(
    request: &GenerateRequest,
    config: &GeneratorConfig,
    store: &S,
    clock: C,
) -> Result<BatchConfig, Error>
where
    S: ObjectStore + ?Sized,
    C: Clock,
{
    let now = clock.now();
    let path = request.data_exclusions_path.as_deref();

    let exclusions_file = path.map(exclusions_ref).transpose()?.unwrap_or_default();
    let params = request.run_parameters(now, exclusions_file, config)?;

    let mut exclusions =
        resolve_exclusions(ExclusionSource::Tokens(&request.task_exclusions), store)?;
    if let Some(path) = path {
        exclusions = exclusions.union(resolve_exclusions(ExclusionSource::Path(path), store)?);
    }

    write_batch(request, &exclusions, &params, config, store)
}

/// Generate configs for only the (unit, disease) pairs listed in the data exclusions file.
///
/// The file names the pairs whose input data changed. Every other pair of the
/// selected units and diseases is excluded, and `task_exclusions` are applied on
/// top. Rows naming a unit or disease outside the catalog, or outside the
/// selection, are logged and skipped.
pub fn generate_rerun_config<S, C>(
    request: &GenerateRequest,
    config: &GeneratorConfig,
    store: &S,
    clock: C,
) -> Result<BatchConfig, Error>
where
    S: ObjectStore + ?Sized,
    C: Clock,
{
    let now = clock.now();
    let path = request
        .data_exclusions_path
        .as_deref()
        .ok_or(ValidationError::MissingExclusions)?;

    let params = request.run_parameters(now, exclusions_ref(path)?, config)?;
    let units = request.units.units(&config.catalog)?;
    let diseases = request.diseases.diseases(&config.catalog)?;

    let rerun = resolve_exclusions(ExclusionSource::Path(path), store)?;
    log::info!("re-running {} unit/disease pair(s) listed in {path}", rerun.len());
    for (unit, disease) in rerun.iter() {
        if !config.catalog.is_unit(unit) || !config.catalog.is_disease(disease) {
            log::warn!("{path} lists {unit}:{disease}, which isn't in the catalog; skipping it");
        } else if !units.iter().any(|u| *u == unit) || !diseases.iter().any(|d| *d == disease) {
            log::warn!("{path} lists {unit}:{disease}, which isn't selected; skipping it");
        }
    }

    let exclusions = rerun
        .complement(&units, &diseases)
        .union(resolve_exclusions(ExclusionSource::Tokens(&request.task_exclusions), store)?);

    write_batch(request, &exclusions, &params, config, store)
}

/// Generate one batch per report date, then write a list of all job ids to
/// `backfill/<name>_jobids.json` in the config container.
///
/// Each report date gets job id `<name>_<report_date>` and a production date
/// equal to the report date. If an exclusions file for the report date exists in
/// the data container, it's recorded in the task configs (but not used for
/// filtering). Returns the job ids in report date order.
pub fn generate_backfill_config<S>(
    request: &BackfillRequest,
    config: &GeneratorConfig,
    store: &S,
) -> Result<Vec<String>, Error>
where
    S: ObjectStore + ?Sized,
{
    let n = request.report_dates.len();
    if request.data_paths.len() != n || request.as_of_dates.len() != n {
        return Err(ValidationError::LengthMismatch(
            n,
            request.data_paths.len(),
            request.as_of_dates.len(),
        )
        .into());
    }
    check_job_id(&request.name)?;

    let data_container = request
        .data_container
        .clone()
        .unwrap_or_else(|| config.data_container.clone());
    let exclusions = resolve_exclusions(ExclusionSource::Tokens(&request.task_exclusions), store)?;

    // validate everything up front, so a bad date doesn't leave a half-written backfill:
    let mut runs = Vec::with_capacity(n);
    for ((&report_date, data_path), &as_of) in request
        .report_dates
        .iter()
        .zip(&request.data_paths)
        .zip(&request.as_of_dates)
    {
        let outliers = config.outliers_path(report_date);
        let exclusions_file = if store.exists(&data_container, &outliers)? {
            log::info!("exclusions file found for {report_date}");
            ExclusionsRef::blob(&data_container, &outliers)
        } else {
            log::info!("no exclusions file found for {report_date}");
            ExclusionsRef::default()
        };

        let params = RunParameters {
            report_date,
            reference_dates: reference_window(report_date, request.reference_span.days())?,
            data_path: data_path.clone(),
            data_container: data_container.clone(),
            production_date: report_date,
            job_id: backfill_job_id(&request.name, report_date),
            as_of,
            output_container: request
                .output_container
                .clone()
                .unwrap_or_else(|| config.output_container.clone()),
            data_source: request.data_source.clone(),
            exclusions: exclusions_file,
        };
        params.validate(&config.catalog)?;
        runs.push(params);
    }

    let mut job_ids = Vec::with_capacity(n);
    for params in &runs {
        let tasks = expand_batch(&request.units, &request.diseases, &exclusions, params, config)?;
        persist(BatchConfig::new(params.job_id.clone(), params.production_date, tasks), config, store)?;
        job_ids.push(params.job_id.clone());
    }

    let metadata_key = format!("backfill/{}_jobids.json", request.name);
    let bytes = serde_json::to_vec_pretty(&job_ids).map_err(PersistenceError::Encode)?;
    store.write(&config.config_container, &metadata_key, &bytes)?;
    log::info!("wrote backfill metadata to {metadata_key}");

    Ok(job_ids)
}

fn write_batch<S: ObjectStore + ?Sized>(
    request: &GenerateRequest,
    exclusions: &ExclusionSet,
    params: &RunParameters,
    config: &GeneratorConfig,
    store: &S,
) -> Result<BatchConfig, Error> {
    let tasks = expand_batch(&request.units, &request.diseases, exclusions, params, config)?;
    if tasks.is_empty() {
        log::warn!("every selected unit/disease pair was excluded; writing an empty batch");
    }
    persist(BatchConfig::new(params.job_id.clone(), params.production_date, tasks), config, store)
}

fn persist<S: ObjectStore + ?Sized>(
    batch: BatchConfig,
    config: &GeneratorConfig,
    store: &S,
) -> Result<BatchConfig, Error> {
    let key = batch.storage_key();
    let bytes = batch.to_json().map_err(PersistenceError::Encode)?;
    store.write(&config.config_container, &key, &bytes)?;
    log::info!(
        "wrote {} task config(s) to {}/{key}",
        batch.len(),
        config.config_container
    );
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use anyhow::Result;
    use chrono::TimeZone;
    use util::FixedClock;

    fn date(s: &str) -> NaiveDate {
        model::parse_date(s).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 12, 17, 19, 50, 6).unwrap())
    }

    fn request() -> GenerateRequest {
        GenerateRequest {
            job_id: Some("test-job".to_owned()),
            ..GenerateRequest::default()
        }
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let config = GeneratorConfig::default();
        let store = MemoryStore::new();
        let batch = generate_config(&GenerateRequest::default(), &config, &store, clock())?;

        assert_eq!(batch.len(), 102);
        assert_eq!(store.write_count(), 1);
        assert!(batch.job_id().starts_with("Rt-estimation-2024-12-17T19-50-06"));

        let task = &batch.tasks()[0];
        assert_eq!(task.report_date, date("2024-12-17"));
        assert_eq!(task.production_date, date("2024-12-17"));
        assert_eq!(task.reference_dates, vec![date("2024-10-22"), date("2024-12-16")]);
        assert_eq!(task.data.path, "gold/2024-12-17.parquet");
        assert_eq!(task.output_container, "nssp-rt-testing");
        assert_eq!(task.parameters.as_of_date, clock().0);

        let key = format!("{}/2024-12-17.json", batch.job_id());
        let stored = BatchConfig::from_json(&store.read("rt-epinow2-config", &key)?)?;
        assert_eq!(stored, batch);
        Ok(())
    }

    #[test]
    fn test_task_exclusions() -> Result<()> {
        let config = GeneratorConfig::default();
        let store = MemoryStore::new();
        let mut request = request();
        request.task_exclusions = vec!["ID:COVID-19,WA:Influenza".to_owned()];
        let batch = generate_config(&request, &config, &store, clock())?;
        assert_eq!(batch.len(), 100);
        assert!(store.exists("rt-epinow2-config", "test-job/2024-12-17.json")?);
        Ok(())
    }

    #[test]
    fn test_exclusions_file_in_generate() -> Result<()> {
        let config = GeneratorConfig::default();
        let store = MemoryStore::new();
        store.write("nssp-etl", "outliers-v2/2024-12-17.csv", b"state,disease\nNY,Influenza\n")?;

        let mut request = request();
        request.data_exclusions_path = Some("az://nssp-etl/outliers-v2/2024-12-17.csv".to_owned());
        let batch = generate_config(&request, &config, &store, clock())?;

        assert_eq!(batch.len(), 101);
        assert!(!batch
            .tasks()
            .iter()
            .any(|t| t.unit() == "NY" && t.disease == "Influenza"));
        assert_eq!(
            batch.tasks()[0].exclusions,
            ExclusionsRef::blob("nssp-etl", "outliers-v2/2024-12-17.csv")
        );
        Ok(())
    }

    #[test]
    fn test_report_after_production() {
        let config = GeneratorConfig::default();
        let store = MemoryStore::new();
        let mut request = request();
        request.report_date = Some(date("2024-12-18"));
        request.production_date = Some(date("2024-12-17"));
        assert!(matches!(
            generate_config(&request, &config, &store, clock()),
            Err(Error::Validation(ValidationError::ReportAfterProduction { .. }))
        ));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_bad_token_writes_nothing() {
        let config = GeneratorConfig::default();
        let store = MemoryStore::new();
        let mut request = request();
        request.task_exclusions = vec!["NY".to_owned()];
        assert!(matches!(
            generate_config(&request, &config, &store, clock()),
            Err(Error::Validation(_))
        ));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_job_ids_that_arent_keys() {
        let config = GeneratorConfig::default();
        let store = MemoryStore::new();
        for job_id in ["../evil", "team/run1", "..", "."] {
            let request = GenerateRequest {
                job_id: Some(job_id.to_owned()),
                ..GenerateRequest::default()
            };
            assert!(matches!(
                generate_config(&request, &config, &store, clock()),
                Err(Error::Validation(ValidationError::InvalidJobId(id))) if id == job_id
            ));
        }
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_persistence_failure() {
        let config = GeneratorConfig::default();
        let store = MemoryStore::failing();
        assert!(matches!(
            generate_config(&request(), &config, &store, clock()),
            Err(Error::Persistence(PersistenceError::Unavailable(_)))
        ));
    }

    #[test]
    fn test_rerun_requires_path() {
        let config = GeneratorConfig::default();
        let store = MemoryStore::new();
        assert!(matches!(
            generate_rerun_config(&request(), &config, &store, clock()),
            Err(Error::Validation(ValidationError::MissingExclusions))
        ));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_rerun() -> Result<()> {
        let config = GeneratorConfig::default();
        let store = MemoryStore::new();
        store.write(
            "nssp-etl",
            "outliers-v2/2024-12-17.csv",
            b"state,disease,report_date\nNY,Influenza,2024-12-17\nTX,COVID-19,2024-12-17\n",
        )?;

        let mut request = request();
        request.data_exclusions_path = Some("az://nssp-etl/outliers-v2/2024-12-17.csv".to_owned());
        let batch = generate_rerun_config(&request, &config, &store, clock())?;

        let pairs: Vec<_> = batch
            .tasks()
            .iter()
            .map(|t| (t.unit(), t.disease.as_str()))
            .collect();
        assert_eq!(pairs, vec![("NY", "Influenza"), ("TX", "COVID-19")]);
        assert_eq!(store.write_count(), 2); // the seeded file plus the batch
        Ok(())
    }

    #[test]
    fn test_rerun_within_selection() -> Result<()> {
        let config = GeneratorConfig::default();
        let store = MemoryStore::new();
        store.write(
            "nssp-etl",
            "outliers-v2/2024-12-17.csv",
            b"state,disease\nNY,Influenza\nTX,COVID-19\nMO,COVID-19\n",
        )?;

        let mut request = request();
        request.units = Selection::parse("NY,WA")?;
        request.data_exclusions_path = Some("az://nssp-etl/outliers-v2/2024-12-17.csv".to_owned());
        let batch = generate_rerun_config(&request, &config, &store, clock())?;

        // TX isn't selected and MO isn't a unit; both are skipped
        let pairs: Vec<_> = batch
            .tasks()
            .iter()
            .map(|t| (t.unit(), t.disease.as_str()))
            .collect();
        assert_eq!(pairs, vec![("NY", "Influenza")]);
        Ok(())
    }

    #[test]
    fn test_rerun_report_after_production() -> Result<()> {
        let config = GeneratorConfig::default();
        let store = MemoryStore::new();
        let mut request = request();
        request.report_date = Some(date("2024-12-18"));
        request.production_date = Some(date("2024-12-17"));
        // never read: validation comes first
        request.data_exclusions_path = Some("az://nssp-etl/missing.csv".to_owned());
        assert!(matches!(
            generate_rerun_config(&request, &config, &store, clock()),
            Err(Error::Validation(ValidationError::ReportAfterProduction { .. }))
        ));
        assert_eq!(store.write_count(), 0);
        Ok(())
    }

    #[test]
    fn test_rerun_bad_file() -> Result<()> {
        let config = GeneratorConfig::default();
        let store = MemoryStore::new();
        store.write("nssp-etl", "bad.csv", b"geo_value,disease\nNY,Influenza\n")?;

        let mut request = request();
        request.data_exclusions_path = Some("az://nssp-etl/bad.csv".to_owned());
        assert!(matches!(
            generate_rerun_config(&request, &config, &store, clock()),
            Err(Error::DataFormat(_))
        ));
        assert_eq!(store.write_count(), 1);
        Ok(())
    }

    fn backfill_request() -> BackfillRequest {
        BackfillRequest {
            name: "nssp_api_v2".to_owned(),
            units: Selection::parse("NY,WA").unwrap(),
            diseases: Selection::All,
            report_dates: vec![date("2024-12-10"), date("2024-12-17")],
            reference_span: syntax::span("8w").unwrap(),
            data_paths: vec!["gold/2024-12-10.parquet".to_owned(), "gold/2024-12-17.parquet".to_owned()],
            as_of_dates: vec![
                Utc.with_ymd_and_hms(2024, 12, 10, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 12, 17, 0, 0, 0).unwrap(),
            ],
            data_container: None,
            output_container: None,
            data_source: Some("nssp".to_owned()),
            task_exclusions: Vec::new(),
        }
    }

    #[test]
    fn test_backfill() -> Result<()> {
        let config = GeneratorConfig::default();
        let store = MemoryStore::new();
        store.write("nssp-etl", "outliers-v2/2024-12-17.csv", b"state,disease\nNY,Influenza\n")?;

        let job_ids = generate_backfill_config(&backfill_request(), &config, &store)?;
        assert_eq!(job_ids, vec!["nssp_api_v2_2024-12-10", "nssp_api_v2_2024-12-17"]);

        let first = BatchConfig::from_json(
            &store.read("rt-epinow2-config", "nssp_api_v2_2024-12-10/2024-12-10.json")?,
        )?;
        assert_eq!(first.len(), 4);
        assert_eq!(
            first.tasks()[0].reference_dates,
            vec![date("2024-10-15"), date("2024-12-09")]
        );
        assert!(first.tasks()[0].exclusions.is_none());
        assert_eq!(first.tasks()[0].data_source.as_deref(), Some("nssp"));

        // the exclusions file is attached, not applied:
        let second = BatchConfig::from_json(
            &store.read("rt-epinow2-config", "nssp_api_v2_2024-12-17/2024-12-17.json")?,
        )?;
        assert_eq!(second.len(), 4);
        assert_eq!(
            second.tasks()[0].exclusions,
            ExclusionsRef::blob("nssp-etl", "outliers-v2/2024-12-17.csv")
        );

        let metadata: Vec<String> = serde_json::from_slice(
            &store.read("rt-epinow2-config", "backfill/nssp_api_v2_jobids.json")?,
        )?;
        assert_eq!(metadata, job_ids);
        Ok(())
    }

    #[test]
    fn test_backfill_length_mismatch() {
        let config = GeneratorConfig::default();
        let store = MemoryStore::new();
        let mut request = backfill_request();
        request.data_paths.pop();
        assert!(matches!(
            generate_backfill_config(&request, &config, &store),
            Err(Error::Validation(ValidationError::LengthMismatch(2, 1, 2)))
        ));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_backfill_span_out_of_range() {
        let config = GeneratorConfig::default();
        let store = MemoryStore::new();
        let mut request = backfill_request();
        request.reference_span = syntax::span("100000000d").unwrap();
        assert!(matches!(
            generate_backfill_config(&request, &config, &store),
            Err(Error::Validation(ValidationError::SpanOutOfRange(_, 100_000_000)))
        ));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_backfill_name_must_be_a_key() {
        let config = GeneratorConfig::default();
        let store = MemoryStore::new();
        for name in ["", "../evil", "team/run1"] {
            let mut request = backfill_request();
            request.name = name.to_owned();
            assert!(matches!(
                generate_backfill_config(&request, &config, &store),
                Err(Error::Validation(
                    ValidationError::EmptyJobId | ValidationError::InvalidJobId(_)
                ))
            ));
        }
        assert_eq!(store.write_count(), 0);
    }
}
