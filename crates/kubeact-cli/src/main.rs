//! kubeact CLI - run kubectl-backed workflow actions

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod exit_codes;

use error::{CliError, Result};

#[derive(Parser)]
#[command(name = "kubeact")]
#[command(author = "kubeact Contributors")]
#[command(version)]
#[command(about = "Run kubectl-backed workflow actions", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and run an action
    Run {
        /// Action id or alias (e.g. kubectl.apply)
        action: String,

        /// Action options file (YAML or JSON)
        #[arg(short = 'f', long = "options")]
        options: Option<PathBuf>,

        /// Shared context file(s) with ctx, secrets and parameters sections
        #[arg(short = 'c', long = "context")]
        context: Vec<PathBuf>,

        /// Set parameters on command line (key=value)
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,

        /// Working directory for relative manifest paths
        #[arg(long, env = "KUBEACT_WD")]
        wd: Option<PathBuf>,

        /// Program invoked in place of kubectl
        #[arg(long, env = "KUBEACT_KUBECTL", default_value = kubeact_kube::DEFAULT_TOOL)]
        kubectl: String,

        /// Print ctx and parameters as JSON once the action completes
        #[arg(long)]
        print_context: bool,

        /// Render undefined template variables as empty instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Validate action options without calling kubectl
    Validate {
        /// Action id or alias
        action: String,

        /// Action options file (YAML or JSON)
        #[arg(short = 'f', long = "options")]
        options: Option<PathBuf>,
    },

    /// List available actions
    Actions {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            action,
            options,
            context,
            params,
            wd,
            kubectl,
            print_context,
            lenient,
        } => {
            let runtime = tokio::runtime::Runtime::new()
                .map_err(|e| CliError::internal(format!("failed to start runtime: {}", e)))?;
            runtime.block_on(commands::run::run(
                &action,
                options.as_deref(),
                &context,
                &params,
                wd.as_deref(),
                &kubectl,
                print_context,
                lenient,
            ))
        }

        Commands::Validate { action, options } => {
            commands::validate::run(&action, options.as_deref())
        }

        Commands::Actions { json } => commands::actions::run(json),
    }
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = dispatch(cli.command) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
