use crate::workflow::{summarize, ActivityReport, ActivityStatus};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while one request is in flight
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn spinner_success(pb: &ProgressBar, message: impl Into<String>) {
    pb.finish_with_message(format!("{} {}", style("✓").green(), message.into()));
}

pub fn spinner_error(pb: &ProgressBar, message: impl Into<String>) {
    pb.finish_with_message(format!("{} {}", style("✗").red(), message.into()));
}

pub fn print_summary(reports: &[ActivityReport]) {
    let (uploaded, duplicates, failed) = summarize(reports);

    for report in reports.iter().filter(|r| r.is_failure()) {
        let reason = match (&report.status, &report.metadata_error) {
            (ActivityStatus::Failed(reason), _) => reason.as_str(),
            (_, Some(reason)) => reason.as_str(),
            _ => "unknown error",
        };
        eprintln!(
            "{} {}: {}",
            style("error").red().bold(),
            report.path.display(),
            reason
        );
    }

    println!(
        "{} uploaded, {} already present, {} failed",
        style(uploaded).green(),
        style(duplicates).yellow(),
        style(failed).red()
    );
}
