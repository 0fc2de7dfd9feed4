use anyhow::Result;
use colored::Colorize;

use util::Timer;

use crate::settings::Settings;

/// Everything printed for the user goes through here. Results go to stdout,
/// chatter to stderr.
pub struct Ui {
    /// -v setting
    pub verbose: bool,
    /// -y setting: skip "Proceed?" prompts
    assume_yes: bool,
    timer: Timer,
}

impl Ui {
    pub fn new(settings: &Settings) -> Self {
        Self {
            verbose: settings.verbose > 0,
            assume_yes: settings.yes,
            timer: Timer::now(),
        }
    }

    /// Ask a yes/no question on stderr. Anything but a leading 'y' is a no.
    pub fn confirm(&self, prompt: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        eprintln!("{prompt} (y/N)");

        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        Ok(answer.trim_start().starts_with(['y', 'Y']))
    }

    pub fn start_timer(&mut self) {
        if self.verbose {
            self.timer.reset();
        }
    }

    pub fn print_elapsed(&self, step: &str) {
        if self.verbose {
            self.timer.print_elapsed(step);
        }
    }

    pub fn verbose_msg(&self, msg: &str) {
        if self.verbose {
            eprintln!("{msg}");
        }
    }

    pub fn verbose_progress(&self, msg: &str) {
        if self.verbose {
            eprint!("{}... ", msg.magenta());
        }
    }

    pub fn done(&self) {
        if self.verbose {
            eprintln!("{}.", "done".green());
        }
    }

    /// Printed regardless of verbosity.
    pub fn notice(&self, msg: &str) {
        eprintln!("{}", msg.yellow());
    }

    /// Printed regardless of verbosity.
    pub fn success(&self, msg: &str) {
        eprintln!("{}", msg.green());
    }
}
