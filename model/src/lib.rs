mod catalog;
pub use catalog::{Catalog, WILDCARD};

mod config;
pub use config::{BlobRef, GeneratorConfig, GpPrior, ModelParams, Priors, RtPrior, SamplerOpts};

mod error;
pub use error::ValidationError;

mod id;
pub use id::{backfill_job_id, check_job_id, generate_default_job_id, task_id};

mod params;
pub use params::{parse_date, parse_dates, parse_timestamp, reference_window, RunParameters};

mod task;
pub use task::{build_task_config, ExclusionsRef, GeoType, Parameters, TaskConfig};

mod batch;
pub use batch::{batch_key, BatchConfig};
