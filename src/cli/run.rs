//! `formpilot run`: rehearse a program against an in-memory page.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use action_flow::{expand, AutomationRunner, RunOutcome, RunReport};
use action_primitives::MemorySurface;
use anyhow::{bail, Context, Result};
use clap::Args;
use formpilot_event_bus::{to_mpsc, InMemoryBus, StatusEvent};
use tokio::{fs, signal};
use tracing::{debug, info, warn};

use super::context::CliContext;
use super::inputs::{load_page, load_program, load_rows, repeat_arg};
use super::output::{render_status_event, to_json, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Step program (JSON array); defaults to the built-in example
    #[arg(long, value_name = "FILE")]
    pub steps: Option<PathBuf>,

    /// CSV dataset; the program runs once per row
    #[arg(long, value_name = "CSV")]
    pub rows: Option<PathBuf>,

    /// Times each row's copy is repeated (values below 1 count as 1)
    #[arg(long, default_value = "1", value_parser = repeat_arg)]
    pub repeat: NonZeroUsize,

    /// YAML page fixture describing the rehearsal document
    #[arg(long, value_name = "PAGE")]
    pub page: Option<PathBuf>,

    /// Write the run report as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Print every surface side effect after the run
    #[arg(long)]
    pub journal: bool,
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext) -> Result<()> {
    let program = load_program(args.steps.as_deref()).await?;
    let rows = load_rows(args.rows.as_deref()).await?;
    let page = load_page(args.page.as_deref()).await?;
    let instructions = expand(&program, &rows.rows, args.repeat);

    let automation = &ctx.config().automation;
    debug!(config = %ctx.config_path().display(), policy = ?automation.policy(), "run settings");
    info!(
        steps = program.len(),
        rows = rows.len(),
        repeat = args.repeat.get(),
        instructions = instructions.len(),
        "starting rehearsal run"
    );

    let surface = Arc::new(MemorySurface::from_fixture(&page));
    let bus = InMemoryBus::<StatusEvent>::new(automation.status_capacity);
    let mut events = to_mpsc(Arc::clone(&bus), automation.status_capacity);
    let runner = Arc::new(AutomationRunner::with_surface(
        surface.clone(),
        bus,
        automation.policy(),
    ));

    let format = ctx.output();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match render_status_event(format, &event) {
                Ok(line) => println!("{line}"),
                Err(err) => warn!(error = %err, "failed to render status event"),
            }
        }
    });

    let handle = runner
        .start(instructions)
        .await
        .context("Failed to start automation")?;

    let stopper = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping automation");
                runner.stop().await;
            }
        })
    };

    let report = handle.await.context("Automation task failed")?;
    stopper.abort();
    let _ = stopper.await;

    // Dropping the last runner closes the bus, which ends the printer.
    drop(runner);
    if printer.await.is_err() {
        warn!("status printer ended abnormally");
    }

    if args.journal {
        for event in surface.journal() {
            println!("{}", to_json(&event, false)?);
        }
    }
    if let Some(path) = &args.report {
        fs::write(path, to_json(&report, true)?)
            .await
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!(path = %path.display(), "run report written");
    }

    print_summary(format, &report)?;

    match &report.outcome {
        RunOutcome::Completed => Ok(()),
        RunOutcome::Failed { message } => bail!("automation failed: {message}"),
        RunOutcome::Cancelled => bail!("automation stopped before completion"),
    }
}

fn print_summary(format: OutputFormat, report: &RunReport) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(report, false)?),
        OutputFormat::Human => {
            let elapsed = (report.finished_at - report.started_at)
                .to_std()
                .unwrap_or_default();
            let elapsed = Duration::from_millis(elapsed.as_millis() as u64);
            println!(
                "{}/{} step(s) completed in {}",
                report.steps_completed,
                report.steps_total,
                humantime::format_duration(elapsed)
            );
        }
    }
    Ok(())
}
