//! CLI output formatting

use crate::core::{JobStatus, Run, RunStatus};
use crate::execution::ExecutionEvent;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar over the run's jobs
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a job status for display
pub fn format_job_status(status: JobStatus) -> String {
    match status {
        JobStatus::Pending => style("PENDING").dim().to_string(),
        JobStatus::Running => style("RUNNING").yellow().to_string(),
        JobStatus::Succeeded => style("SUCCEEDED").green().to_string(),
        JobStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format an aggregated run status for display
pub fn format_run_status(status: RunStatus) -> String {
    match status {
        RunStatus::Succeeded => style("SUCCEEDED").green().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::RunStarted {
            run_id,
            workflow_name,
            job_count,
        } => format!(
            "{} Starting run {} ({}, {} jobs)",
            ROCKET,
            style(workflow_name).bold(),
            style(&run_id.to_string()[..8]).dim(),
            job_count
        ),
        ExecutionEvent::JobStarted { job_name } => {
            format!("{} {}", SPINNER, style(job_name).cyan())
        }
        ExecutionEvent::JobFinished {
            job_name,
            status,
            exit_code,
        } => match status {
            JobStatus::Succeeded => format!("{} {}", CHECK, style(job_name).green()),
            _ => format!(
                "{} {} (exit code {})",
                CROSS,
                style(job_name).red(),
                exit_code.map_or("none".to_string(), |c| c.to_string())
            ),
        },
        ExecutionEvent::RunFinished { run_id, status } => {
            let status_str = match status {
                RunStatus::Succeeded => format!("completed {}", style("successfully").green()),
                RunStatus::Failed => style("failed").red().to_string(),
            };
            format!(
                "{} Run ({}) {}",
                INFO,
                style(&run_id.to_string()[..8]).dim(),
                status_str
            )
        }
    }
}

/// Render the final report, enumerating every job's terminal outcome
///
/// Jobs appear in configured order regardless of how execution interleaved,
/// and every failure is listed, not just the first.
pub fn render_report(run: &Run) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "{} Report for {} ({} on {})",
        INFO,
        style(&run.workflow_name).bold(),
        run.event.kind.name(),
        style(&run.event.branch).cyan()
    ));

    for result in &run.results {
        let exit = result
            .exit_code
            .map_or("-".to_string(), |c| c.to_string());
        lines.push(format!(
            "  {} {} - exit code {}",
            format_job_status(result.status),
            style(&result.job_name).bold(),
            exit
        ));
    }

    lines.push(format!(
        "{} {} passed, {} failed - {}",
        INFO,
        style(run.passed_count()).green(),
        style(run.failed_count()).red(),
        format_run_status(run.aggregate())
    ));

    lines.join("\n")
}

/// Format a job log with truncation
pub fn format_log(log: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = log.lines().collect();

    if lines.len() <= max_lines {
        log.to_string()
    } else {
        let truncated = lines[..max_lines].join("\n");
        format!(
            "{}\n{}... ({} more lines)",
            truncated,
            style("[truncated]").dim(),
            lines.len() - max_lines
        )
    }
}
