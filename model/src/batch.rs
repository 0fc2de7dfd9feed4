use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::TaskConfig;

/// Storage key of a batch: `<job_id>/<production_date>.json`.
pub fn batch_key(job_id: &str, production_date: NaiveDate) -> String {
    format!("{job_id}/{production_date}.json")
}

/// All task configs produced by one generation run, in generation order.
///
/// Serialized whole and written in a single call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    job_id: String,
    production_date: NaiveDate,
    tasks: Vec<TaskConfig>,
}

impl BatchConfig {
    pub fn new(job_id: String, production_date: NaiveDate, tasks: Vec<TaskConfig>) -> Self {
        Self {
            job_id,
            production_date,
            tasks,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn production_date(&self) -> NaiveDate {
        self.production_date
    }

    pub fn tasks(&self) -> &[TaskConfig] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Swap in `task` for the task with the same id. False if there's none.
    pub fn replace_task(&mut self, task: TaskConfig) -> bool {
        match self.tasks.iter_mut().find(|t| t.task_id == task.task_id) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }

    /// Key this batch is stored under.
    pub fn storage_key(&self) -> String {
        batch_key(&self.job_id, self.production_date)
    }

    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
