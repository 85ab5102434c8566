//! mgrts - scenario runner entry point

use std::path::PathBuf;

use clap::Parser;

use mgrts_common::config::SuiteConfig;
use mgrts_e2e::scenarios::{smoke_scenarios, ReposyncTelemetry};
use mgrts_e2e::{Scenario, SuiteRunner};

/// Scenario runner for the mgr-testsuite E2E framework
#[derive(Parser, Debug)]
#[command(name = "mgrts")]
#[command(author, version, about)]
struct Args {
    /// Run only the scenario with this name
    #[arg(short, long)]
    name: Option<String>,

    /// List available scenarios and exit
    #[arg(long)]
    list: bool,

    /// Channels to extract reposync telemetry for (enables the telemetry
    /// scenario)
    #[arg(long = "sync-channel")]
    sync_channels: Vec<String>,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let mut scenarios: Vec<Box<dyn Scenario>> = smoke_scenarios();
    if !args.sync_channels.is_empty() {
        scenarios.push(Box::new(ReposyncTelemetry {
            channels: args.sync_channels.clone(),
        }));
    }

    if let Some(name) = &args.name {
        scenarios.retain(|s| s.name() == name);
        if scenarios.is_empty() {
            return Err(mgrts_common::Error::UnknownAction(name.clone()).into());
        }
    }

    if args.list {
        for scenario in &scenarios {
            println!("{}", scenario.name());
        }
        return Ok(());
    }

    let config = SuiteConfig::from_env();
    let runner = SuiteRunner::new(config).with_output_dir(args.output);

    let results = runner.run_all(&scenarios).await;
    runner.write_results(&results)?;

    if results.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
