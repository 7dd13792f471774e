use std::fs::OpenOptions;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use themegit::config::{Cli, Config};
use themegit::deployer::{Deployer, Stage};
use themegit::error::SyncError;
use themegit::event::{plan_theme_name, WorkflowEvent};
use themegit::git::GitCli;
use themegit::themekit::ThemeKit;

const OUTPUT_NAME: &str = "SHOPIFY_THEME_PREVIEW_URL";

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e.downcast_ref::<SyncError>().map_or(2, SyncError::exit_code);
            ExitCode::from(code)
        }
    }
}

/// Log writer that clears the spinner while a line goes to stderr
#[derive(Clone)]
struct SpinnerWriter {
    bar: ProgressBar,
}

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bar.suspend(|| io::stderr().write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.bar.suspend(|| io::stderr().flush())
    }
}

impl<'a> MakeWriter<'a> for SpinnerWriter {
    type Writer = SpinnerWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn init_tracing(verbose: bool, spinner: &ProgressBar) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(SpinnerWriter { bar: spinner.clone() })
        .init();
}

fn stage_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let spinner = stage_spinner();
    init_tracing(cli.verbose, &spinner);
    let config = Config::from_cli(cli)?;

    let event = WorkflowEvent::from_path(&config.event_path)
        .with_context(|| format!("Failed to read workflow event {}", config.event_path.display()))?;
    info!(event = ?event, "loaded workflow event");

    let git = GitCli::new();
    let Some(theme_name) = plan_theme_name(&event, &config.trigger, &git, Utc::now().date_naive())? else {
        println!("themegit: nothing to deploy for this event");
        return Ok(ExitCode::SUCCESS);
    };
    info!(theme = %theme_name, store = %config.store, "deploying branch theme");

    let kit = ThemeKit::new(&config.theme_bin, &config.store, config.password.expose());
    let deployer = Deployer::from_config(&kit, &config);

    spinner.enable_steady_tick(Duration::from_millis(120));
    let result = deployer.deploy_with_progress(&config.built_theme_dir, &theme_name, |stage: Stage| {
        spinner.set_message(stage.to_string());
    });
    match &result {
        Ok(_) => spinner.finish_with_message("Complete"),
        Err(_) => spinner.abandon_with_message("Failed"),
    }
    let outcome = result?;

    for (namespace, count) in &outcome.conflicts {
        info!(%namespace, conflicts = count, strategy = %config.strategy_for(*namespace), "namespace reconciled");
    }

    println!("::set-output name={}::{}", OUTPUT_NAME, outcome.preview_url);
    if let Some(path) = &config.github_output {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open step output file {}", path.display()))?;
        writeln!(file, "{}={}", OUTPUT_NAME, outcome.preview_url)?;
    }

    println!("Preview: {}", outcome.preview_url);
    Ok(ExitCode::SUCCESS)
}
