use model::{build_task_config, GeneratorConfig, RunParameters, TaskConfig, ValidationError};
use util::HashSet;

use crate::{ExclusionSet, Selection};

/// Build one task config per selected (unit, disease) pair that isn't excluded.
///
/// Pairs come out unit-major, disease-minor, in catalog order regardless of
/// the order the caller listed them in. Exclusions that match no candidate
/// pair are logged and otherwise ignored. An empty result is not an error.
pub fn expand_batch(
    units: &Selection,
    diseases: &Selection,
    exclusions: &ExclusionSet,
    params: &RunParameters,
    config: &GeneratorConfig,
) -> Result<Vec<TaskConfig>, ValidationError> {
    let units = units.units(&config.catalog)?;
    let diseases = diseases.diseases(&config.catalog)?;

    let candidates: HashSet<(&str, &str)> = units
        .iter()
        .flat_map(|&u| diseases.iter().map(move |&d| (u, d)))
        .collect();
    for (unit, disease) in exclusions.iter() {
        if !candidates.contains(&(unit, disease)) {
            log::warn!("exclusion {unit}:{disease} does not match any selected unit and disease");
        }
    }

    let mut tasks = Vec::with_capacity(candidates.len());
    for &unit in &units {
        for &disease in &diseases {
            if exclusions.contains(unit, disease) {
                log::debug!("skipping excluded pair {unit}:{disease}");
                continue;
            }
            tasks.push(build_task_config(unit, disease, params, config)?);
        }
    }

    log::debug!(
        "expanded {} units x {} diseases into {} tasks",
        units.len(),
        diseases.len(),
        tasks.len()
    );
    Ok(tasks)
}
