use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{task_id, BlobRef, GeneratorConfig, ModelParams, RunParameters, ValidationError};
use crate::{Catalog, WILDCARD};

/// Geography level of a unit, as the model expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoType {
    State,
    Country,
}

impl GeoType {
    fn of(unit: &str) -> Self {
        if unit == "US" {
            GeoType::Country
        } else {
            GeoType::State
        }
    }
}

/// Reference to a data exclusions file. Both fields are null when none was used.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionsRef {
    pub path: Option<String>,
    pub blob_storage_container: Option<String>,
}

impl ExclusionsRef {
    /// Reference to a blob in a storage container.
    pub fn blob(container: &str, path: &str) -> Self {
        Self {
            path: Some(path.to_owned()),
            blob_storage_container: Some(container.to_owned()),
        }
    }

    /// Reference to a file on the local filesystem.
    pub fn local(path: &str) -> Self {
        Self {
            path: Some(path.to_owned()),
            blob_storage_container: None,
        }
    }

    pub fn is_none(&self) -> bool {
        self.path.is_none()
    }
}

/// Where the model should fetch its parameter estimates from, and as of when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub as_of_date: DateTime<Utc>,
    pub generation_interval: BlobRef,
    pub delay_interval: BlobRef,
    pub right_truncation: BlobRef,
}

/// Config for a single (unit, disease) model run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub job_id: String,
    pub task_id: String,
    /// The unit, e.g. `NY` or `US`.
    pub geo_value: String,
    pub geo_type: GeoType,
    pub disease: String,
    pub report_date: NaiveDate,
    pub production_date: NaiveDate,
    pub reference_dates: Vec<NaiveDate>,
    pub min_reference_date: NaiveDate,
    pub max_reference_date: NaiveDate,
    pub data: BlobRef,
    pub output_container: String,
    pub exclusions: ExclusionsRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    pub parameters: Parameters,
    #[serde(flatten)]
    pub model: ModelParams,
}

impl TaskConfig {
    /// The unit this task runs for.
    pub fn unit(&self) -> &str {
        &self.geo_value
    }
}

/// Build the config for one (unit, disease) pair.
///
/// Pure: the same arguments always give the same config. `unit` and `disease` must
/// be recognized or be the literal wildcard; resolving the wildcard into concrete
/// pairs is the batch expander's job, not this function's.
pub fn build_task_config(
    unit: &str,
    disease: &str,
    params: &RunParameters,
    config: &GeneratorConfig,
) -> Result<TaskConfig, ValidationError> {
    check_or_wildcard(&config.catalog, unit, disease)?;

    let min_reference_date = *params
        .reference_dates
        .iter()
        .min()
        .ok_or(ValidationError::NoReferenceDates)?;
    let max_reference_date = *params
        .reference_dates
        .iter()
        .max()
        .ok_or(ValidationError::NoReferenceDates)?;

    let task_id = task_id(&params.job_id, unit, disease);
    log::trace!("building task {task_id}");

    Ok(TaskConfig {
        job_id: params.job_id.clone(),
        task_id,
        geo_value: unit.to_owned(),
        geo_type: GeoType::of(unit),
        disease: disease.to_owned(),
        report_date: params.report_date,
        production_date: params.production_date,
        reference_dates: params.reference_dates.clone(),
        min_reference_date,
        max_reference_date,
        data: BlobRef::new(&params.data_path, &params.data_container),
        output_container: params.output_container.clone(),
        exclusions: params.exclusions.clone(),
        data_source: params.data_source.clone(),
        parameters: Parameters {
            as_of_date: params.as_of,
            generation_interval: config.param_estimates.clone(),
            delay_interval: config.param_estimates.clone(),
            right_truncation: config.param_estimates.clone(),
        },
        model: config.model.clone(),
    })
}

fn check_or_wildcard(catalog: &Catalog, unit: &str, disease: &str) -> Result<(), ValidationError> {
    if unit != WILDCARD {
        catalog.check_unit(unit)?;
    }
    if disease != WILDCARD {
        catalog.check_disease(disease)?;
    }
    Ok(())
}
