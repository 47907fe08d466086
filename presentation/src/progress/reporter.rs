//! Progress reporting while a model reply streams in

use checker_application::ProgressNotifier;
use checker_domain::RequestKind;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Reports progress with a spinner showing how much of the reply arrived
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
    received: AtomicUsize,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            received: AtomicUsize::new(0),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn kind_display_name(kind: RequestKind) -> &'static str {
        match kind {
            RequestKind::Answer => "Grading answer",
            RequestKind::Question => "Answering question",
            RequestKind::Joke => "Thinking of a joke",
            RequestKind::EditAdvice => "Reviewing card",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_request_start(&self, kind: RequestKind, model: &str) {
        self.received.store(0, Ordering::Relaxed);

        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(Self::kind_display_name(kind));
        pb.set_message(format!("waiting for {}", model));
        pb.enable_steady_tick(TICK_INTERVAL);

        if let Ok(mut spinner) = self.spinner.lock() {
            *spinner = Some(pb);
        }
    }

    fn on_chunk(&self, chunk: &str) {
        let total = self.received.fetch_add(chunk.len(), Ordering::Relaxed) + chunk.len();
        if let Ok(spinner) = self.spinner.lock()
            && let Some(pb) = spinner.as_ref()
        {
            pb.set_message(format!("{} bytes received", total));
        }
    }

    fn on_request_end(&self, success: bool) {
        let Ok(mut spinner) = self.spinner.lock() else {
            return;
        };
        if let Some(pb) = spinner.take() {
            if success {
                pb.finish_and_clear();
            } else {
                pb.abandon_with_message(format!("{}", "failed".red()));
            }
        }
    }
}

/// Simple text-based progress on stderr (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_request_start(&self, kind: RequestKind, model: &str) {
        eprintln!(
            "{} {} ({})",
            "->".cyan(),
            ProgressReporter::kind_display_name(kind).bold(),
            model
        );
    }

    fn on_request_end(&self, success: bool) {
        if success {
            eprintln!("  {} done", "v".green());
        } else {
            eprintln!("  {} failed", "x".red());
        }
    }
}
