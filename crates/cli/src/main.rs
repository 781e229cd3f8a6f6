mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use env_logger::Env;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "phebe")]
#[command(version, about = "Personal site generator with in-place page navigation", long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Initialize new site directory
    Init {
        /// Path to create site directory
        path: PathBuf,
    },

    /// Validate site configuration and sources
    Validate {
        /// Path to site directory
        path: PathBuf,
    },

    /// Build static site with HTML and JSON representations of every page
    Build {
        /// Path to site directory
        path: PathBuf,

        /// Output directory for generated site
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Serve site locally with content negotiation
    Serve {
        /// Path to site directory
        path: PathBuf,

        /// Port to serve on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Walk a running site with the navigator, hovering then clicking each path
    Browse {
        /// Path to site directory (provides menu and categories)
        path: PathBuf,

        /// Base URL of the running site
        #[arg(short, long, default_value = "http://127.0.0.1:3000")]
        base_url: String,

        /// Pages to visit; the first one is the initially loaded page
        #[arg(required = true)]
        hrefs: Vec<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    match cli.command {
        Command::Init { path } => commands::init::run(path).await,
        Command::Validate { path } => commands::validate::run(path).await,
        Command::Build { path, output } => commands::build::run(path, output).await,
        Command::Serve { path, port } => commands::serve::run(path, port).await,
        Command::Browse {
            path,
            base_url,
            hrefs,
        } => commands::browse::run(path, base_url, hrefs).await,
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "phebe", &mut io::stdout());
            Ok(())
        }
    }
}
