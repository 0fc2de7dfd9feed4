use clap::{Parser, Subcommand};

const CMD_NAME: &str = "rtcg";
const DEFAULT_STORE: &str = "store";
const DEFAULT_LIMIT: usize = 10;

const EXCLUSIONS_HELP: &str = "Exact unit:disease pairs to skip, comma-separated \
    (e.g. 'NY:COVID-19,WA:Influenza'). Unlike --state and --disease, 'all' is NOT a \
    wildcard here: 'all:COVID-19' only matches a unit literally named 'all'";

/// Stores our command-line args format.
#[derive(Parser)]
#[command(name = CMD_NAME, version, about = "Generate EpiNow2 Rt estimation task configs", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Local object store directory; each container is a subdirectory
    #[arg(short = 'o', long, value_name = "DIR", default_value = DEFAULT_STORE, global = true)]
    #[arg(env = "RTCG_STORE")]
    pub store: String,

    /// Container that batches are written to and read from
    #[arg(long, value_name = "CONTAINER", global = true)]
    #[arg(env = "RTCG_CONFIG_CONTAINER")]
    pub config_container: Option<String>,

    /// Bypass user confirmation
    #[arg(short, long, global = true)]
    #[arg(env = "RTCG_YES")]
    pub yes: bool,

    /// Print additional debugging info (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Dry run; print info but don't write anything.
    #[arg(short = 'n', long, global = true)]
    #[arg(env = "RTCG_DRY_RUN")]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a full batch of task configs
    Generate(GenerateArgs),
    /// Re-run only the unit/disease pairs listed in a data exclusions file
    Rerun(GenerateArgs),
    /// Generate one batch per report date
    Backfill(BackfillArgs),
    /// List job ids in the config container
    ListJobs {
        /// Number of jobs to display
        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },
    /// List task ids for a job
    ListTasks {
        /// Job id to list tasks for
        #[arg(short, long)]
        job_id: String,
        /// Number of tasks to display
        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
        /// Only show tasks whose id contains this unit
        #[arg(short, long)]
        state: Option<String>,
        /// Only show tasks whose id contains this disease
        #[arg(short, long)]
        disease: Option<String>,
    },
    /// Print a single task config
    InspectTask {
        /// Job id the task belongs to
        #[arg(short, long)]
        job_id: String,
        /// Task id to print
        #[arg(short, long)]
        task_id: String,
    },
    /// Edit fields of a single task config and write its batch back
    ModifyTask {
        /// Job id the task belongs to
        #[arg(short, long)]
        job_id: String,
        /// Task id to modify
        #[arg(short, long)]
        task_id: String,
        /// Field to set, e.g. 'seed=7' or 'sampler_opts.cores=8'; repeatable.
        /// Values are read as JSON, falling back to a plain string.
        /// Modifiable fields: parameters, data, seed, horizon, priors,
        /// sampler_opts, exclusions, quantile_width, model
        #[arg(short, long = "set", value_name = "FIELD=VALUE", required = true)]
        set: Vec<String>,
    },
}

/// Options shared by `generate` and `rerun`.
#[derive(clap::Args, Default)]
pub struct GenerateArgs {
    /// Units to run: 'all', one unit, or a comma-separated list
    #[arg(short, long, value_name = "UNITS", default_value = "all")]
    #[arg(env = "RTCG_STATE")]
    pub state: String,

    /// Diseases to run: 'all', one disease, or a comma-separated list
    #[arg(short, long, value_name = "DISEASES", default_value = "all")]
    #[arg(env = "RTCG_DISEASE")]
    pub disease: String,

    /// Report date, YYYY-MM-DD [default: today]
    #[arg(long, value_name = "DATE")]
    #[arg(env = "RTCG_REPORT_DATE")]
    pub report_date: Option<String>,

    /// Comma-separated reference dates [default: 8 weeks before report date, and the day before it]
    #[arg(long, value_name = "DATES")]
    #[arg(env = "RTCG_REFERENCE_DATES")]
    pub reference_dates: Option<String>,

    /// Path to input data [default: gold/<report_date>.parquet]
    #[arg(long, value_name = "PATH")]
    #[arg(env = "RTCG_DATA_PATH")]
    pub data_path: Option<String>,

    /// Container holding input data [default: nssp-etl]
    #[arg(long, value_name = "CONTAINER")]
    #[arg(env = "RTCG_DATA_CONTAINER")]
    pub data_container: Option<String>,

    /// Production date, YYYY-MM-DD [default: today]
    #[arg(long, value_name = "DATE")]
    #[arg(env = "RTCG_PRODUCTION_DATE")]
    pub production_date: Option<String>,

    /// Job id [default: Rt-estimation-<as_of>-<random hex>]
    #[arg(short, long, value_name = "ID")]
    #[arg(env = "RTCG_JOB_ID")]
    pub job_id: Option<String>,

    /// RFC 3339 timestamp as of which to fetch parameters [default: now]
    #[arg(long, value_name = "TIMESTAMP")]
    #[arg(env = "RTCG_AS_OF_DATE")]
    pub as_of_date: Option<String>,

    /// Container for model output [default: nssp-rt-testing]
    #[arg(long, value_name = "CONTAINER")]
    #[arg(env = "RTCG_OUTPUT_CONTAINER")]
    pub output_container: Option<String>,

    /// Tag naming the upstream data source (nhsn or nssp)
    #[arg(long, value_name = "SOURCE")]
    #[arg(env = "RTCG_DATA_SOURCE")]
    pub data_source: Option<String>,

    #[arg(short = 'x', long, value_name = "PAIRS", help = EXCLUSIONS_HELP)]
    #[arg(env = "RTCG_TASK_EXCLUSIONS")]
    pub task_exclusions: Vec<String>,

    /// CSV of state,disease pairs: az://<container>/<blob> or a local path.
    /// For `generate` the listed pairs are skipped; for `rerun` only they are generated
    #[arg(short = 'e', long, value_name = "PATH")]
    #[arg(env = "RTCG_DATA_EXCLUSIONS_PATH")]
    pub data_exclusions_path: Option<String>,
}

#[derive(clap::Args, Default)]
pub struct BackfillArgs {
    /// Backfill name; each job id is <name>_<report_date>
    #[arg(long, value_name = "NAME")]
    #[arg(env = "RTCG_BACKFILL_NAME")]
    pub backfill_name: String,

    /// Units to run: 'all', one unit, or a comma-separated list
    #[arg(short, long, value_name = "UNITS", default_value = "all")]
    #[arg(env = "RTCG_STATE")]
    pub state: String,

    /// Diseases to run: 'all', one disease, or a comma-separated list
    #[arg(short, long, value_name = "DISEASES", default_value = "all")]
    #[arg(env = "RTCG_DISEASE")]
    pub disease: String,

    /// Comma-separated report dates
    #[arg(long, value_name = "DATES")]
    #[arg(env = "RTCG_REPORT_DATES")]
    pub report_dates: String,

    /// Span from each report date back to its earliest reference date, e.g. 8w or 10d
    #[arg(long, value_name = "SPAN", default_value = "8w", allow_hyphen_values = true)]
    #[arg(env = "RTCG_REFERENCE_DATE_TIME_SPAN")]
    pub reference_date_time_span: String,

    /// Comma-separated input data paths, one per report date
    #[arg(long, value_name = "PATHS")]
    #[arg(env = "RTCG_DATA_PATHS")]
    pub data_paths: String,

    /// Comma-separated RFC 3339 timestamps, one per report date
    #[arg(long, value_name = "TIMESTAMPS")]
    #[arg(env = "RTCG_AS_OF_DATES")]
    pub as_of_dates: String,

    /// Container holding input data and exclusions files [default: nssp-etl]
    #[arg(long, value_name = "CONTAINER")]
    #[arg(env = "RTCG_DATA_CONTAINER")]
    pub data_container: Option<String>,

    /// Container for model output [default: nssp-rt-testing]
    #[arg(long, value_name = "CONTAINER")]
    #[arg(env = "RTCG_OUTPUT_CONTAINER")]
    pub output_container: Option<String>,

    /// Tag naming the upstream data source (nhsn or nssp)
    #[arg(long, value_name = "SOURCE")]
    #[arg(env = "RTCG_DATA_SOURCE")]
    pub data_source: Option<String>,

    #[arg(short = 'x', long, value_name = "PAIRS", help = EXCLUSIONS_HELP)]
    #[arg(env = "RTCG_TASK_EXCLUSIONS")]
    pub task_exclusions: Vec<String>,
}
