use std::time::{Duration, Instant};

/// Utility for keeping track of how long a generation step took.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Create a new `Timer` started at the current instant.
    pub fn now() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Reset internal timer to now.
    pub fn reset(&mut self) {
        self.start = Instant::now();
    }

    /// Time elapsed since the timer was created or last reset.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Print a message with the elapsed time since the timer was last reset.
    pub fn print_elapsed(&self, step: &str) {
        let elapsed = self.elapsed();
        log::debug!("{step}: {elapsed:?}");
        eprintln!("{} took {:?}", step, elapsed);
    }
}
