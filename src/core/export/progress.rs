//! Export progress reporting

use std::io::Write;

/// Receives progress updates while tickets are captured
pub trait ProgressReporter: Send {
    /// Called once before the first ticket
    fn start(&mut self, _total: usize) {}

    /// Called after each captured ticket
    fn advance(&mut self, done: usize, total: usize);

    /// Called once when the run ends, successfully or not
    fn finish(&mut self) {}
}

/// Percentage of `done` out of `total`, rounded down
pub fn percent(done: usize, total: usize) -> usize {
    if total == 0 {
        return 100;
    }
    done.min(total) * 100 / total
}

/// Single self-overwriting line on stderr
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    last_width: usize,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn draw(&mut self, line: &str) {
        let mut err = std::io::stderr().lock();
        let pad = self.last_width.saturating_sub(line.len());
        let _ = write!(err, "\r{line}{}", " ".repeat(pad));
        let _ = err.flush();
        self.last_width = line.len();
    }
}

impl ProgressReporter for ConsoleProgress {
    fn start(&mut self, total: usize) {
        self.draw(&format!("Rendering tickets: 0/{total} (0%)"));
    }

    fn advance(&mut self, done: usize, total: usize) {
        self.draw(&format!(
            "Rendering tickets: {done}/{total} ({}%)",
            percent(done, total)
        ));
    }

    fn finish(&mut self) {
        if self.last_width > 0 {
            self.draw("");
            let _ = write!(std::io::stderr(), "\r");
            self.last_width = 0;
        }
    }
}

/// Discards all updates
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn advance(&mut self, _done: usize, _total: usize) {}
}
