use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::sync::watch;

use demandcast::config::Config;
use demandcast::eval::best_score;
use demandcast::pipeline::{self, Progress, RunReport};
use demandcast::tui::{
    self,
    state::{AppState, RunPhase},
};

struct Args {
    csv_path: PathBuf,
    config_path: Option<PathBuf>,
    headless: bool,
}

fn parse_args() -> Result<Args> {
    let mut csv_path = None;
    let mut config_path = None;
    let mut headless = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--headless" => headless = true,
            "--config" => {
                let value = args.next().context("--config requires a path")?;
                config_path = Some(PathBuf::from(value));
            }
            "-h" | "--help" => {
                println!("Usage: demandcast <sales.csv> [--config <demandcast.toml>] [--headless]");
                std::process::exit(0);
            }
            other if !other.starts_with('-') && csv_path.is_none() => {
                csv_path = Some(PathBuf::from(other));
            }
            other => anyhow::bail!("unrecognized argument: {}", other),
        }
    }

    let csv_path = csv_path.context(
        "missing CSV path\nUsage: demandcast <sales.csv> [--config <demandcast.toml>] [--headless]",
    )?;

    Ok(Args {
        csv_path,
        config_path,
        headless,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log to a file so the TUI owns the terminal
    let log_file = std::fs::File::create("demandcast.log")?;
    tracing_subscriber::fmt()
        .with_env_filter("demandcast=info")
        .with_writer(log_file)
        .init();

    let args = parse_args()?;
    let config = Config::load_or_default(args.config_path.as_deref())?;

    if args.headless {
        return run_headless(&args, &config);
    }

    let file_name = args
        .csv_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.csv_path.display().to_string());
    let (state_tx, state_rx) = watch::channel(AppState::new(file_name));

    // One upload, one run: the pipeline executes once on a blocking
    // thread while the TUI renders its progress.
    let csv_path = args.csv_path.clone();
    let pipeline_tx = state_tx.clone();
    tokio::task::spawn_blocking(move || {
        let result = pipeline::run(&csv_path, &config, |progress| {
            pipeline_tx.send_modify(|s| {
                s.phase = match progress {
                    Progress::Loading => RunPhase::Loading,
                    Progress::Fitting { model, index } => RunPhase::Fitting { model, index },
                    Progress::Evaluating => RunPhase::Evaluating,
                };
            });
        });
        match result {
            Ok(report) => pipeline_tx.send_modify(|s| {
                s.phase = RunPhase::Done;
                s.report = Some(report);
            }),
            Err(err) => {
                tracing::error!(error = %err, "pipeline failed");
                pipeline_tx.send_modify(|s| {
                    s.phase = RunPhase::Failed;
                    s.error = Some(err.to_string());
                });
            }
        }
    });

    tui::run_tui(state_rx).await
}

fn run_headless(args: &Args, config: &Config) -> Result<()> {
    let report = pipeline::run(&args.csv_path, config, |_| {})?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    println!();
    println!("  {} — {} weeks (train {}, test {})", report.file_name, report.series.len(), report.train_len, report.test_len);
    if report.dropped_rows > 0 {
        println!("  warning: {} rows dropped (unparseable week/units)", report.dropped_rows);
    }
    println!();
    println!("  Raw data preview:");
    println!("    {}", report.preview_headers.join(", "));
    for row in &report.preview_rows {
        println!("    {}", row.join(", "));
    }
    println!();
    println!("  {:<16} {:>12}", "Model", "RMSE");
    for score in &report.scores {
        let marker = if score.model == report.best_model { "  <- best" } else { "" };
        println!("  {:<16} {:>12.2}{}", score.model, score.rmse, marker);
    }
    println!();
    if let Some(best) = best_score(&report.scores) {
        println!("  Best performing model: {}", best.model);
    }
    println!();
}
