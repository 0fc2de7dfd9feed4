//! Editing a single task config inside a stored batch.

use anyhow::{Context, Result};
use serde_json::Value;

use model::TaskConfig;
use util::Clock;

use crate::inspect::{self, job_batches};
use crate::store::{ObjectStore, PersistenceError};

/// Top-level task fields that may be edited. Identity fields and the dates
/// derived from them are left alone.
pub const MODIFIABLE_FIELDS: &[&str] = &[
    "parameters",
    "data",
    "seed",
    "horizon",
    "priors",
    "sampler_opts",
    "exclusions",
    "quantile_width",
    "model",
];

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Field \"{0}\" can't be modified")]
    NotModifiable(String),
    #[error("Task has no field \"{0}\"")]
    NoSuchField(String),
    #[error("Edited task is no longer a valid config: {0}")]
    Invalid(serde_json::Error),
}

/// Apply `edits` (each `path.to.field=value`) to one task and write its batch back.
///
/// The task is taken from the job's most recent batch that holds it. Values are
/// read as JSON where they parse as JSON, and as plain strings otherwise. Only
/// fields that already exist can be set. If anything changed, `as_of_date` is
/// re-stamped from `clock` and the batch is rewritten in one write; the edited
/// task is returned. Returns `None`, writing nothing, if the edits changed nothing.
pub fn modify_task<S, C>(
    store: &S,
    container: &str,
    job_id: &str,
    task_id: &str,
    edits: &[String],
    clock: C,
) -> Result<Option<TaskConfig>>
where
    S: ObjectStore + ?Sized,
    C: Clock,
{
    // parse every edit before touching the store:
    let edits = edits
        .iter()
        .map(|edit| parse_edit(edit))
        .collect::<Result<Vec<_>>>()?;

    let mut batch = job_batches(store, container, job_id)?
        .into_iter()
        .rev()
        .find(|batch| batch.tasks().iter().any(|t| t.task_id == task_id))
        .ok_or_else(|| inspect::Error::TaskNotFound(job_id.to_owned(), task_id.to_owned()))?;
    let original = batch
        .tasks()
        .iter()
        .find(|t| t.task_id == task_id)
        .cloned()
        .ok_or_else(|| inspect::Error::TaskNotFound(job_id.to_owned(), task_id.to_owned()))?;

    let mut value = serde_json::to_value(&original).map_err(PersistenceError::Encode)?;
    for (pointer, new_value) in edits {
        let slot = value
            .pointer_mut(&pointer)
            .ok_or_else(|| Error::NoSuchField(pointer.clone()))?;
        log::debug!("setting {pointer} to {new_value}");
        *slot = new_value;
    }

    let mut task: TaskConfig = serde_json::from_value(value).map_err(Error::Invalid)?;
    if task == original {
        log::info!("edits leave {task_id} unchanged; not writing");
        return Ok(None);
    }
    task.parameters.as_of_date = clock.now();

    let key = batch.storage_key();
    batch.replace_task(task.clone());
    let bytes = batch.to_json().map_err(PersistenceError::Encode)?;
    store
        .write(container, &key, &bytes)
        .with_context(|| format!("while writing {key}"))?;
    log::info!("rewrote {container}/{key} with modified task {task_id}");

    Ok(Some(task))
}

/// Turn `a.b=value` into a JSON pointer (`/a/b`) and the value to put there.
fn parse_edit(edit: &str) -> Result<(String, Value)> {
    let (path, raw) = syntax::assignment(edit)?;
    if !MODIFIABLE_FIELDS.contains(&path[0]) {
        return Err(Error::NotModifiable(path[0].to_owned()).into());
    }
    let pointer = path.iter().map(|key| format!("/{key}")).collect();
    let value = serde_json::from_str(raw.trim()).unwrap_or_else(|_| Value::String(raw.to_owned()));
    Ok((pointer, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{generate_config, GenerateRequest};
    use crate::inspect::find_task;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use expand::Selection;
    use model::GeneratorConfig;
    use util::FixedClock;

    const CONTAINER: &str = "rt-epinow2-config";
    const TASK: &str = "job-a_NY_COVID-19";

    fn seeded() -> Result<MemoryStore> {
        let store = MemoryStore::new();
        let request = GenerateRequest {
            units: Selection::parse("NY,WA")?,
            job_id: Some("job-a".to_owned()),
            ..GenerateRequest::default()
        };
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 12, 17, 12, 0, 0).unwrap());
        generate_config(&request, &GeneratorConfig::default(), &store, clock)?;
        Ok(store)
    }

    fn later() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 12, 18, 9, 30, 0).unwrap())
    }

    fn edits(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_modify() -> Result<()> {
        let store = seeded()?;
        let edited = modify_task(
            &store,
            CONTAINER,
            "job-a",
            TASK,
            &edits(&["seed=7", "sampler_opts.cores=8", "data.path=gold/fixed.parquet"]),
            later(),
        )?
        .unwrap();

        assert_eq!(edited.model.seed, 7);
        assert_eq!(edited.model.sampler_opts.cores, 8);
        assert_eq!(edited.data.path, "gold/fixed.parquet");
        assert_eq!(edited.parameters.as_of_date, later().0);
        assert_eq!(store.write_count(), 2);

        // stored copy matches, and the other tasks are untouched:
        assert_eq!(find_task(&store, CONTAINER, "job-a", TASK)?, edited);
        let other = find_task(&store, CONTAINER, "job-a", "job-a_WA_COVID-19")?;
        assert_eq!(other.model.seed, 42);
        Ok(())
    }

    #[test]
    fn test_no_change_writes_nothing() -> Result<()> {
        let store = seeded()?;
        let result = modify_task(&store, CONTAINER, "job-a", TASK, &edits(&["seed=42"]), later())?;
        assert!(result.is_none());
        assert_eq!(store.write_count(), 1);
        Ok(())
    }

    #[test]
    fn test_bad_edits() -> Result<()> {
        let store = seeded()?;
        let modify = |list: &[&str]| modify_task(&store, CONTAINER, "job-a", TASK, &edits(list), later());

        let err = modify(&["geo_value=CA"]).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotModifiable(f)) if f == "geo_value"));

        let err = modify(&["sampler_opts.threads=8"]).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NoSuchField(_))));

        let err = modify(&["seed=lots"]).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Invalid(_))));

        assert!(modify(&["seed"]).is_err());

        let err = modify_task(&store, CONTAINER, "job-a", "job-a_CA_COVID-19", &edits(&["seed=1"]), later())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<inspect::Error>(),
            Some(inspect::Error::TaskNotFound(..))
        ));

        assert_eq!(store.write_count(), 1);
        Ok(())
    }
}
