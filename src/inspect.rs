//! Read-only queries over previously written batches.

use std::collections::BTreeSet;

use anyhow::{Context, Result};

use model::{BatchConfig, TaskConfig};

use crate::store::ObjectStore;

/// Prefix of backfill metadata documents, which aren't batches.
const BACKFILL_PREFIX: &str = "backfill";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No task \"{1}\" found for job \"{0}\"")]
    TaskNotFound(String, String),
}

/// Unique job ids in `container`, sorted, at most `limit` of them.
pub fn list_jobs<S: ObjectStore + ?Sized>(
    store: &S,
    container: &str,
    limit: usize,
) -> Result<Vec<String>> {
    let jobs: BTreeSet<String> = store
        .list(container)?
        .iter()
        .filter_map(|key| key.split_once('/'))
        .map(|(job, _)| job)
        .filter(|&job| job != BACKFILL_PREFIX)
        .map(str::to_owned)
        .collect();
    Ok(jobs.into_iter().take(limit).collect())
}

/// Ids of the tasks in all of a job's batches, sorted, at most `limit`.
/// `unit` and `disease` filter on substrings of the task id.
pub fn list_tasks<S: ObjectStore + ?Sized>(
    store: &S,
    container: &str,
    job_id: &str,
    unit: Option<&str>,
    disease: Option<&str>,
    limit: usize,
) -> Result<Vec<String>> {
    let mut ids: Vec<String> = job_batches(store, container, job_id)?
        .iter()
        .flat_map(BatchConfig::tasks)
        .map(|task| task.task_id.clone())
        .filter(|id| unit.map_or(true, |u| id.contains(u)))
        .filter(|id| disease.map_or(true, |d| id.contains(d)))
        .collect();
    ids.sort();
    ids.dedup();
    ids.truncate(limit);
    Ok(ids)
}

/// Find a single task config by id. If several batches for the job hold the
/// task, the most recent production date wins.
pub fn find_task<S: ObjectStore + ?Sized>(
    store: &S,
    container: &str,
    job_id: &str,
    task_id: &str,
) -> Result<TaskConfig> {
    job_batches(store, container, job_id)?
        .into_iter()
        .rev()
        .find_map(|batch| batch.tasks().iter().find(|t| t.task_id == task_id).cloned())
        .ok_or_else(|| Error::TaskNotFound(job_id.to_owned(), task_id.to_owned()).into())
}

/// Batches of one job, in key (i.e. production date) order.
pub(crate) fn job_batches<S: ObjectStore + ?Sized>(
    store: &S,
    container: &str,
    job_id: &str,
) -> Result<Vec<BatchConfig>> {
    let prefix = format!("{job_id}/");
    let mut batches = Vec::new();
    for key in store.list(container)? {
        if !key.starts_with(&prefix) || !key.ends_with(".json") {
            continue;
        }
        let bytes = store.read(container, &key)?;
        let batch = BatchConfig::from_json(&bytes)
            .with_context(|| format!("while reading batch \"{key}\""))?;
        batches.push(batch);
    }
    log::debug!("found {} batch(es) for job {job_id}", batches.len());
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{generate_config, GenerateRequest};
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use expand::Selection;
    use model::GeneratorConfig;
    use util::FixedClock;

    const CONTAINER: &str = "rt-epinow2-config";

    fn seeded() -> Result<MemoryStore> {
        let config = GeneratorConfig::default();
        let store = MemoryStore::new();
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 12, 17, 12, 0, 0).unwrap());
        for job in ["job-b", "job-a"] {
            let request = GenerateRequest {
                units: Selection::parse("NY,WA,CA")?,
                job_id: Some(job.to_owned()),
                ..GenerateRequest::default()
            };
            generate_config(&request, &config, &store, clock)?;
        }
        store.write(CONTAINER, "backfill/x_jobids.json", b"[]")?;
        Ok(store)
    }

    #[test]
    fn test_list_jobs() -> Result<()> {
        let store = seeded()?;
        assert_eq!(list_jobs(&store, CONTAINER, 10)?, vec!["job-a", "job-b"]);
        assert_eq!(list_jobs(&store, CONTAINER, 1)?, vec!["job-a"]);
        Ok(())
    }

    #[test]
    fn test_list_tasks() -> Result<()> {
        let store = seeded()?;
        let all = list_tasks(&store, CONTAINER, "job-a", None, None, 10)?;
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], "job-a_CA_COVID-19");

        let filtered = list_tasks(&store, CONTAINER, "job-a", Some("WA"), Some("Influenza"), 10)?;
        assert_eq!(filtered, vec!["job-a_WA_Influenza"]);

        assert!(list_tasks(&store, CONTAINER, "job-z", None, None, 10)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_find_task() -> Result<()> {
        let store = seeded()?;
        let task = find_task(&store, CONTAINER, "job-b", "job-b_NY_COVID-19")?;
        assert_eq!(task.unit(), "NY");
        assert!(find_task(&store, CONTAINER, "job-b", "job-b_MO_COVID-19").is_err());
        Ok(())
    }
}
