//! Generates EpiNow2 Rt estimation task configs: one per (unit, disease) pair,
//! collected into a single batch document and written to object storage.
//!
//! The library entry points are [`generate_config`], [`generate_rerun_config`]
//! and [`generate_backfill_config`]; the `rtcg` binary wraps them in a CLI.

/// High-level command line app
mod app;
/// Definition of command-line args
mod args;
/// Crate-level error kinds
mod error;
/// Driver functions
mod generate;
/// Reading back written batches
mod inspect;
/// Editing stored task configs
mod modify;
/// Turning exclusion sources into exclusion sets
mod resolve;
/// Parsed command-line settings
mod settings;
/// Object storage collaborator
mod store;
/// Text UI
mod ui;

pub use error::Error;
pub use generate::{
    generate_backfill_config, generate_config, generate_rerun_config, BackfillRequest,
    GenerateRequest,
};
pub use inspect::{find_task, list_jobs, list_tasks};
pub use modify::{modify_task, MODIFIABLE_FIELDS};
pub use resolve::{resolve_exclusions, ExclusionSource};
pub use store::{LocalStore, MemoryStore, ObjectStore, PersistenceError};

// exported for tests:
pub use app::App;
pub use args::{Args, BackfillArgs, Command, GenerateArgs};
pub use settings::{Action, Settings};

/// Run the command-line app.
pub fn run() -> Result<(), anyhow::Error> {
    use clap::Parser;
    let args = Args::parse();

    // INTERPRET SETTINGS ///////////////
    let settings: Settings = args.try_into()?;

    let log_level = match settings.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    simple_logging::log_to_stderr(log_level);

    // RUN THE THING /////////////////
    let app = App::new(settings);
    app.run()?;

    Ok(())
}
