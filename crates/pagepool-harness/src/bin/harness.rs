//! CLI entrypoint for the pagepool conformance harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pagepool_harness::error::HarnessError;
use pagepool_harness::report::ConformanceReport;
use pagepool_harness::runner::ScenarioRunner;
use pagepool_harness::scenarios;

/// Conformance tooling for the pagepool allocation subsystem.
#[derive(Debug, Parser)]
#[command(name = "pagepool-harness")]
#[command(about = "Conformance harness for the pagepool allocation subsystem")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run every conformance check.
    Run {
        /// Campaign name recorded in the report.
        #[arg(long, default_value = "local")]
        campaign: String,
        /// Output path for the markdown report.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Output path for the JSON report.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// List registered checks without running them.
    List,
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        std::process::exit(2);
    }
}

fn run(cli: Cli) -> Result<(), HarnessError> {
    match cli.command {
        Command::Run {
            campaign,
            report,
            json,
        } => {
            let runner = ScenarioRunner::new(campaign.clone());
            let summary = runner.run();
            let all_passed = summary.all_passed();

            let conformance = ConformanceReport {
                title: "pagepool conformance".into(),
                campaign,
                summary,
            };

            if let Some(path) = report {
                std::fs::write(&path, conformance.to_markdown())?;
            }
            if let Some(path) = json {
                std::fs::write(&path, conformance.to_json()?)?;
            }
            print!("{}", conformance.to_markdown());

            if !all_passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::List => {
            for check in scenarios::all_checks() {
                println!("{}: {}", check.name, check.clause);
            }
            Ok(())
        }
    }
}
