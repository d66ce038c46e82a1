use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio::build::build_site;
use folio::collection::Mode;
use folio::config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// A static site generator for a personal blog and portfolio.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Increases logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Builds the site into the output directory.
    Build {
        /// The project directory, or any directory beneath it.
        #[arg(default_value = ".")]
        project: PathBuf,

        /// Where to write the site. Defaults to `_site` in the project
        /// directory.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// `production` hides unpublished posts.
        #[arg(long, env = "FOLIO_ENV", default_value = "development")]
        env: Mode,
    },
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "folio=info",
            1 => "folio=debug",
            _ => "folio=trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build {
            project,
            output,
            env,
        } => {
            let config = Config::from_directory(&project)
                .with_context(|| format!("loading project from `{}`", project.display()))?;
            let output = output.unwrap_or_else(|| config.project_directory.join("_site"));
            let report = build_site(&config, env, &output)
                .with_context(|| format!("building site into `{}`", output.display()))?;
            println!(
                "Built {} pages ({} posts) into {}",
                report.pages,
                report.posts,
                output.display()
            );
        }
    }
    Ok(())
}
