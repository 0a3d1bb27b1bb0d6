use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use porty::cli::Args;
use porty::config::{AppSettings, Paths};
use porty::output;
use porty::scanner::{ProgressSink, ScanProgress, Scanner};
use porty::types::{PortList, TargetList};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(&args);

    if let Err(e) = run(args).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let settings = match &args.config {
        Some(path) => AppSettings::load_from(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => AppSettings::load().context("failed to load settings")?,
    };
    debug!(?settings, "effective settings");

    let config = args.scan_configuration(&settings);
    config.validate()?;

    if args.save_defaults {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => Paths::new()?.settings_file(),
        };
        args.merged_settings(&settings)
            .save_to(&path)
            .with_context(|| format!("failed to save settings to {}", path.display()))?;
        info!(path = %path.display(), "saved scan defaults");
    }

    let targets = TargetList::parse(&config.targets);
    for token in &targets.ignored {
        warn!(token = %token, "ignoring target that expands to nothing");
    }
    let ports = PortList::parse(&config.ports);
    for token in &ports.ignored {
        warn!(token = %token, "ignoring invalid port token");
    }

    if targets.items.is_empty() {
        bail!("no valid targets in '{}'", config.targets);
    }
    if ports.items.is_empty() {
        bail!("no valid ports in '{}'", config.ports);
    }

    let protocols = config.protocol.protocols();
    let total = targets.items.len() as u64 * ports.items.len() as u64 * protocols.len() as u64;
    if !args.quiet {
        output::print_scan_header(
            targets.items.len(),
            ports.items.len(),
            &config.protocol.to_string(),
            total,
        );
    }

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            output::print_warning("interrupted, waiting for in-flight probes");
            ctrl_c.cancel();
        }
    });

    let progress_bar = (!args.quiet).then(|| progress_bar(total));
    let sink = progress_bar.clone().map(|pb| -> ProgressSink {
        Arc::new(move |p: ScanProgress| {
            pb.set_position(p.completed);
            pb.set_message(format!("{} open", p.open));
        })
    });

    let start_time = Instant::now();
    let mut results = Scanner::new()
        .scan_expanded(
            &config,
            &targets.items,
            &ports.items,
            sink,
            Some(cancel.clone()),
        )
        .await?;
    let elapsed = start_time.elapsed();

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }
    if cancel.is_cancelled() {
        output::print_warning(&format!(
            "scan cancelled after {} of {} probes",
            results.len(),
            total
        ));
    }

    let summary = output::summarize(&results, total);
    if !args.all {
        results.retain(|r| r.is_open());
    }
    output::sort_results(&mut results);

    output::print_results(&results, &summary, elapsed, args.output_format(&settings))
        .context("failed to write results")?;

    Ok(())
}

fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    pb.set_style(style);
    pb
}
