use std::path::PathBuf;

use anyhow::{Context, Result};

use expand::Selection;
use model::{parse_date, parse_dates, parse_timestamp, GeneratorConfig};

use crate::args::{Args, BackfillArgs, Command, GenerateArgs};
use crate::generate::{BackfillRequest, GenerateRequest};

/// What the user asked us to do.
#[derive(Debug)]
pub enum Action {
    Generate(GenerateRequest),
    Rerun(GenerateRequest),
    Backfill(BackfillRequest),
    ListJobs {
        limit: usize,
    },
    ListTasks {
        job_id: String,
        limit: usize,
        state: Option<String>,
        disease: Option<String>,
    },
    InspectTask {
        job_id: String,
        task_id: String,
    },
    ModifyTask {
        job_id: String,
        task_id: String,
        edits: Vec<String>,
    },
}

/// Settings are like Args, except all the parsing has been done.
/// Defaults that depend on the current time are filled in later,
/// when the generation run freezes its clock.
#[derive(Debug)]
pub struct Settings {
    pub store: PathBuf,
    pub yes: bool,
    pub verbose: u8,
    pub dry_run: bool,
    pub config: GeneratorConfig,
    pub action: Action,
}

impl TryFrom<Args> for Settings {
    type Error = anyhow::Error;
    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let mut config = GeneratorConfig::default();
        if let Some(container) = args.config_container {
            config.config_container = container;
        }

        let action = match args.command {
            Command::Generate(g) => Action::Generate(g.try_into()?),
            Command::Rerun(g) => Action::Rerun(g.try_into()?),
            Command::Backfill(b) => Action::Backfill(b.try_into()?),
            Command::ListJobs { limit } => Action::ListJobs { limit },
            Command::ListTasks {
                job_id,
                limit,
                state,
                disease,
            } => Action::ListTasks {
                job_id,
                limit,
                state,
                disease,
            },
            Command::InspectTask { job_id, task_id } => Action::InspectTask { job_id, task_id },
            Command::ModifyTask {
                job_id,
                task_id,
                set,
            } => Action::ModifyTask {
                job_id,
                task_id,
                edits: set,
            },
        };

        Ok(Self {
            store: PathBuf::from(&args.store),
            yes: args.yes,
            verbose: args.verbose,
            dry_run: args.dry_run,
            config,
            action,
        })
    }
}

impl TryFrom<GenerateArgs> for GenerateRequest {
    type Error = anyhow::Error;
    fn try_from(args: GenerateArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            units: Selection::parse(&args.state).context("while parsing --state")?,
            diseases: Selection::parse(&args.disease).context("while parsing --disease")?,
            report_date: args.report_date.as_deref().map(parse_date).transpose()?,
            reference_dates: args
                .reference_dates
                .as_deref()
                .map(parse_dates)
                .transpose()
                .context("while parsing --reference-dates")?,
            data_path: args.data_path,
            data_container: args.data_container,
            production_date: args.production_date.as_deref().map(parse_date).transpose()?,
            job_id: args.job_id,
            as_of: args.as_of_date.as_deref().map(parse_timestamp).transpose()?,
            output_container: args.output_container,
            data_source: args.data_source,
            task_exclusions: args.task_exclusions,
            data_exclusions_path: args.data_exclusions_path,
        })
    }
}

impl TryFrom<BackfillArgs> for BackfillRequest {
    type Error = anyhow::Error;
    fn try_from(args: BackfillArgs) -> Result<Self, Self::Error> {
        let as_of_dates = syntax::list(&args.as_of_dates)
            .context("while parsing --as-of-dates")?
            .into_iter()
            .map(parse_timestamp)
            .collect::<Result<_, _>>()?;
        let data_paths = syntax::list(&args.data_paths)
            .context("while parsing --data-paths")?
            .into_iter()
            .map(str::to_owned)
            .collect();

        Ok(Self {
            name: args.backfill_name,
            units: Selection::parse(&args.state).context("while parsing --state")?,
            diseases: Selection::parse(&args.disease).context("while parsing --disease")?,
            report_dates: parse_dates(&args.report_dates).context("while parsing --report-dates")?,
            reference_span: syntax::span(&args.reference_date_time_span)?,
            data_paths,
            as_of_dates,
            data_container: args.data_container,
            output_container: args.output_container,
            data_source: args.data_source,
            task_exclusions: args.task_exclusions,
        })
    }
}
