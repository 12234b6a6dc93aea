use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repodoc::JobOutcome;
use repodoc::cli::commands::generate::GenerateOptions;

#[derive(Parser)]
#[command(name = "repodoc")]
#[command(
    version,
    about = "Generate per-file documentation for a repository with an LLM"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    #[arg(long, short, help = "Output directory for generated documents")]
    output: Option<PathBuf>,
    #[arg(long, short = 'j', help = "Simultaneous generation requests")]
    concurrency: Option<usize>,
    #[arg(long, help = "Model to use")]
    model: Option<String>,
    #[arg(long, help = "LLM provider (openai, ollama)")]
    provider: Option<String>,
}

impl GenerateArgs {
    fn into_options(self, publish: bool) -> GenerateOptions {
        GenerateOptions {
            output: self.output,
            concurrency: self.concurrency,
            model: self.model,
            provider: self.provider,
            publish,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Document a GitHub repository
    Github {
        #[arg(help = "Repository owner")]
        owner: String,
        #[arg(help = "Repository name")]
        repo: String,
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, help = "GitHub access token")]
        token: Option<String>,
        #[arg(long = "ref", help = "Branch, tag or commit to document")]
        git_ref: Option<String>,
        #[arg(long, help = "Push documents to a new branch and open a pull request")]
        publish: bool,
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Document a local directory
    Local {
        #[arg(default_value = ".", help = "Directory to document")]
        path: PathBuf,
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show the global config file only")]
        global: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json, yaml"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n{}", console::style("━━━ PANIC ━━━").red().bold());
        eprintln!("{}", console::style("repodoc encountered an unexpected error:").red());
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "{}",
                console::style(format!(
                    "Location: {}:{}:{}",
                    location.file(),
                    location.line(),
                    location.column()
                ))
                .dim()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(Some(JobOutcome::Failure)) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", console::style("Error:").red(), e);
            ExitCode::FAILURE
        }
    }
}

/// Returns the job outcome for generating commands
fn run_cli() -> anyhow::Result<Option<JobOutcome>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let outcome = match cli.command {
        Commands::Github {
            owner,
            repo,
            token,
            git_ref,
            publish,
            args,
        } => Some(repodoc::cli::commands::github::run(
            &owner,
            &repo,
            token,
            git_ref,
            &args.into_options(publish),
        )?),
        Commands::Local { path, args } => Some(repodoc::cli::commands::local::run(
            &path,
            &args.into_options(false),
        )?),
        Commands::Config { action } => {
            match action {
                ConfigAction::Show { global, format } => {
                    repodoc::cli::commands::config::show(global, &format)?
                }
                ConfigAction::Path => repodoc::cli::commands::config::path()?,
                ConfigAction::Init { global, force } => {
                    repodoc::cli::commands::config::init(global, force)?
                }
            }
            None
        }
    };

    Ok(outcome)
}
