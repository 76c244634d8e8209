mod cli;
mod core;
mod execution;

use anyhow::{Context, Result};
use cli::commands::{RunCommand, ValidateCommand};
use cli::output::*;
use cli::{Cli, Command};
use core::config::WorkflowConfig;
use core::{JobStatus, RepoEvent, RunStatus};
use execution::{ExecutionEngine, ExecutionEvent, ShellRunner};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Run(cmd) => run_workflow(cmd).await?,
        Command::Validate(cmd) => validate_workflow(cmd)?,
    }

    Ok(())
}

async fn run_workflow(cmd: &RunCommand) -> Result<()> {
    // Load workflow config
    let config =
        WorkflowConfig::from_file(&cmd.file).context("Failed to load workflow config")?;
    let mut workflow = config.to_workflow()?;

    println!(
        "{} Loaded workflow: {}",
        INFO,
        style(&workflow.name).bold()
    );

    // Apply environment overrides to every job
    for (key, value) in &cmd.env {
        println!(
            "{} Environment override: {} = {}",
            INFO,
            style(key).cyan(),
            style(value).dim()
        );
        for job in workflow.jobs.iter_mut() {
            job.env.insert(key.clone(), value.clone());
        }
    }

    // Build the incoming event
    let mut event = RepoEvent::new(cmd.event.into(), &cmd.branch);
    if let Some(commit) = &cmd.commit {
        event = event.with_commit(commit.clone());
    }

    // Create execution engine
    let runner = Arc::new(ShellRunner::new(workflow.defaults.timeout_secs));
    let mut engine = ExecutionEngine::new(runner, cmd.strategy.into()).with_repo(&cmd.repo);
    if let Some(workspace) = &cmd.workspace {
        engine = engine.with_workspace_root(workspace);
    }

    // Filter the event; no matching trigger is a quiet no-op
    let Some(mut run) = engine.on_event(&workflow, &event) else {
        println!(
            "{} No trigger matched {} on {} - nothing to do",
            INFO,
            event.kind.name(),
            style(&event.branch).cyan()
        );
        return Ok(());
    };

    // Progress bar over jobs, fed by execution events
    let progress = create_progress_bar(workflow.jobs.len());
    let progress_handle = progress.clone();
    let quiet = cmd.json;
    engine.add_event_handler(move |execution_event| {
        if !quiet {
            progress_handle.println(format_execution_event(&execution_event));
        }
        if matches!(execution_event, ExecutionEvent::JobFinished { .. }) {
            progress_handle.inc(1);
        }
    });

    // Execute the run
    let status = engine.execute(&workflow, &mut run).await;
    progress.finish_and_clear();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        println!("\n{}", render_report(&run));

        // Show the log of every failed job, not just the first
        for result in run.results.iter().filter(|r| r.status == JobStatus::Failed) {
            println!(
                "\n{} Log for {}:\n{}",
                WARN,
                style(&result.job_name).bold(),
                format_log(&result.log, 20)
            );
        }
    }

    // Exit code is the gating signal for the hosting scheduler
    if status == RunStatus::Failed {
        std::process::exit(1);
    }

    Ok(())
}

fn validate_workflow(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating workflow...", INFO);

    let result = WorkflowConfig::from_file(&cmd.file);

    match result {
        Ok(config) => {
            println!("{} Workflow configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Triggers: {}", style(config.triggers.len()).cyan());
            println!("  Jobs: {}", style(config.jobs.len()).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}
