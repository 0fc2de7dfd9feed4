use anyhow::{Context, Result};
use colored::Colorize;

use model::BatchConfig;
use util::SystemClock;

use crate::generate::{
    generate_backfill_config, generate_config, generate_rerun_config, BackfillRequest,
    GenerateRequest,
};
use crate::inspect;
use crate::modify::modify_task;
use crate::settings::{Action, Settings};
use crate::store::LocalStore;
use crate::ui::Ui;

/// This struct actually runs the command-line app.
pub struct App {
    /// Interpreted command line settings
    settings: Settings,
    /// Object storage
    store: LocalStore,
    /// User interface
    ui: Ui,
}

impl App {
    /// Create a new `App`.
    pub fn new(settings: Settings) -> Self {
        let store = LocalStore::new(&settings.store, settings.dry_run);
        let ui = Ui::new(&settings);
        Self {
            settings,
            store,
            ui,
        }
    }

    /// Run the app, using settings to determine which command to run.
    pub fn run(mut self) -> Result<()> {
        self.ui
            .verbose_msg(&format!("Using store directory {:?}", self.settings.store));
        self.store
            .ensure_root_exists(self.ui.verbose)
            .context("while preparing store directory")?;

        // take the action out so we can borrow the rest of self freely:
        let action = std::mem::replace(&mut self.settings.action, Action::ListJobs { limit: 0 });
        match action {
            Action::Generate(request) => self.generate(&request, false),
            Action::Rerun(request) => self.generate(&request, true),
            Action::Backfill(request) => self.backfill(&request),
            Action::ListJobs { limit } => self.list_jobs(limit),
            Action::ListTasks {
                job_id,
                limit,
                state,
                disease,
            } => self.list_tasks(&job_id, limit, state.as_deref(), disease.as_deref()),
            Action::InspectTask { job_id, task_id } => self.inspect_task(&job_id, &task_id),
            Action::ModifyTask {
                job_id,
                task_id,
                edits,
            } => self.modify_task(&job_id, &task_id, &edits),
        }
    }
}

// GENERATING //////////////////
impl App {
    fn generate(&mut self, request: &GenerateRequest, rerun: bool) -> Result<()> {
        let label = if rerun { "Generating re-run configs" } else { "Generating configs" };
        self.ui.verbose_progress(label);
        self.ui.start_timer();

        let config = &self.settings.config;
        let batch = if rerun {
            generate_rerun_config(request, config, &self.store, SystemClock)
        } else {
            generate_config(request, config, &self.store, SystemClock)
        }
        .with_context(|| format!("while {}", label.to_lowercase()))?;

        self.ui.done();
        self.ui.print_elapsed(label);
        self.print_batch(&batch);
        Ok(())
    }

    fn backfill(&mut self, request: &BackfillRequest) -> Result<()> {
        eprintln!(
            "Backfill {} will write {} batch(es) to {:?}, for report dates {} to {}.",
            request.name.cyan(),
            request.report_dates.len(),
            self.store.root().join(&self.settings.config.config_container),
            date_or_blank(request.report_dates.first()),
            date_or_blank(request.report_dates.last()),
        );
        if !self.settings.dry_run && !self.ui.confirm("Proceed?")? {
            return Ok(());
        }

        self.ui.start_timer();
        let job_ids = generate_backfill_config(request, &self.settings.config, &self.store)
            .context("while generating backfill configs")?;
        self.ui.print_elapsed("Generating backfill configs");

        for job_id in &job_ids {
            self.ui.verbose_msg(&format!("  {job_id}"));
        }
        self.ui
            .success(&format!("Wrote {} backfill job(s) for {}.", job_ids.len(), request.name));
        Ok(())
    }

    fn print_batch(&self, batch: &BatchConfig) {
        if self.settings.verbose > 1 {
            for task in batch.tasks() {
                eprintln!("  {}", task.task_id);
            }
        }
        let verb = if self.settings.dry_run { "Would write" } else { "Wrote" };
        self.ui.success(&format!(
            "{verb} {} task config(s) for job {} to {}/{}.",
            batch.len(),
            batch.job_id(),
            self.settings.config.config_container,
            batch.storage_key(),
        ));
    }
}

// INSPECTING ////////////
impl App {
    fn list_jobs(&self, limit: usize) -> Result<()> {
        let container = &self.settings.config.config_container;
        for job in inspect::list_jobs(&self.store, container, limit)? {
            println!("{job}");
        }
        Ok(())
    }

    fn list_tasks(
        &self,
        job_id: &str,
        limit: usize,
        state: Option<&str>,
        disease: Option<&str>,
    ) -> Result<()> {
        let container = &self.settings.config.config_container;
        let tasks = inspect::list_tasks(&self.store, container, job_id, state, disease, limit)?;
        if tasks.is_empty() {
            self.ui.notice(&format!("No tasks found for job {job_id}."));
        }
        for task in tasks {
            println!("{task}");
        }
        Ok(())
    }

    fn inspect_task(&self, job_id: &str, task_id: &str) -> Result<()> {
        let container = &self.settings.config.config_container;
        let task = inspect::find_task(&self.store, container, job_id, task_id)?;
        println!("{}", serde_json::to_string_pretty(&task)?);
        Ok(())
    }
}

// MODIFYING ////////////
impl App {
    fn modify_task(&mut self, job_id: &str, task_id: &str, edits: &[String]) -> Result<()> {
        eprintln!(
            "Task {} of job {} will be rewritten with: {}",
            task_id.cyan(),
            job_id.cyan(),
            edits.join(", "),
        );
        if !self.settings.dry_run && !self.ui.confirm("Proceed?")? {
            return Ok(());
        }

        let container = &self.settings.config.config_container;
        match modify_task(&self.store, container, job_id, task_id, edits, SystemClock)
            .with_context(|| format!("while modifying task {task_id}"))?
        {
            Some(task) => {
                self.ui.verbose_msg(&serde_json::to_string_pretty(&task)?);
                let verb = if self.settings.dry_run { "Would update" } else { "Updated" };
                self.ui.success(&format!("{verb} task {task_id}."));
            }
            None => self.ui.notice("No changes made to the task config."),
        }
        Ok(())
    }
}

fn date_or_blank(date: Option<&chrono::NaiveDate>) -> String {
    date.map(ToString::to_string).unwrap_or_default()
}
