use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use shorecast::cli;
use shorecast::config::Overrides;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "shorecast",
    about = "Shorecast — surf bulletin zone snapshots over HTTP",
    version,
    after_help = "Run 'shorecast <command> --help' for details on each command.\nRun 'shorecast' with no command to start the service."
)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the snapshot scheduler and HTTP server
    Serve {
        /// HTTP listen port
        #[arg(long)]
        port: Option<u16>,
        /// Bulletin page URL to snapshot
        #[arg(long)]
        url: Option<String>,
        /// Zone token to extract (case-insensitive)
        #[arg(long)]
        zone: Option<String>,
        /// Seconds between snapshot passes
        #[arg(long)]
        interval_secs: Option<u64>,
        /// Directory the artifact is published into
        #[arg(long)]
        public_dir: Option<PathBuf>,
    },
    /// Take one snapshot and exit
    Shot {
        /// Bulletin page URL to snapshot
        #[arg(long)]
        url: Option<String>,
        /// Zone token to extract (case-insensitive)
        #[arg(long)]
        zone: Option<String>,
        /// Directory the artifact is published into
        #[arg(long)]
        public_dir: Option<PathBuf>,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

fn init_tracing(verbose: bool, quiet: bool) {
    let directive = if verbose {
        "shorecast=debug"
    } else if quiet {
        "shorecast=warn"
    } else {
        "shorecast=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse().unwrap()),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        // No subcommand: start the service with env-resolved settings
        None => cli::serve::run(Overrides::default()).await,

        Some(Commands::Serve {
            port,
            url,
            zone,
            interval_secs,
            public_dir,
        }) => {
            cli::serve::run(Overrides {
                source_url: url,
                zone,
                port,
                interval_secs,
                public_dir,
            })
            .await
        }
        Some(Commands::Shot {
            url,
            zone,
            public_dir,
        }) => {
            cli::shot::run(Overrides {
                source_url: url,
                zone,
                public_dir,
                ..Default::default()
            })
            .await
        }
        Some(Commands::Doctor) => cli::doctor::run().await,
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "shorecast", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }
    result
}
