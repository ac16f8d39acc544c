//! cloudsweep: interactive cleanup of AWS resources after a failed deployment
//!
//! Lists Lambda functions, log groups, REST APIs, S3 buckets, CloudFront
//! distributions and IAM roles, lets the operator pick what to delete and
//! deletes it with live progress.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use cloudsweep::aws::{AwsClients, AwsContext, FromAwsContext, RetryPolicy, classify_anyhow_error};
use cloudsweep::catalog::Catalog;
use cloudsweep::config::{self, OutputFormat};
use cloudsweep::tasks::{ChannelReporter, LogReporter, TaskSummary, execute_tasks, generate_tasks};
use cloudsweep::ui;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cloudsweep")]
#[command(about = "Find and delete AWS resources left behind by a failed deployment")]
#[command(version)]
struct Args {
    /// AWS region (defaults to the configured region)
    #[arg(long, global = true, env = "AWS_REGION")]
    region: Option<String>,

    /// AWS profile to use
    #[arg(long, global = true, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// Comma-separated resource kinds to list
    /// (function, log-group, rest-api, bucket, distribution, role; default: all)
    #[arg(long, global = true)]
    kinds: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Arguments for the clean command
#[derive(clap::Args, Debug, Default)]
struct CleanArgs {
    /// Delete everything discovered without prompting
    #[arg(short, long)]
    yes: bool,

    /// Log progress lines instead of drawing spinners
    #[arg(long)]
    plain: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List resources without deleting anything
    Scan {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Select resources interactively and delete them (default)
    Clean(CleanArgs),
}

impl Args {
    fn sweep_config(&self, clean: &CleanArgs) -> config::SweepConfig {
        config::SweepConfig {
            aws: config::AwsConfig {
                region: self.region.clone(),
                profile: self.profile.clone(),
            },
            selection: config::SelectionConfig {
                kinds: config::parse_kinds(self.kinds.as_deref()),
            },
            flags: config::RuntimeFlags {
                yes: clean.yes,
                plain: clean.plain,
            },
        }
    }
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            print_error(&e);
            std::process::exit(1);
        }
    }
}

/// Print the error chain, then a hint when the AWS error code suggests one
fn print_error(e: &anyhow::Error) {
    eprintln!("\n\x1b[1;31mError:\x1b[0m {e}");
    for cause in e.chain().skip(1) {
        eprintln!("  \x1b[33mCaused by:\x1b[0m {cause}");
    }
    if let Some(hint) = classify_anyhow_error(e).hint() {
        eprintln!("\n\x1b[2mHint: {hint}\x1b[0m");
    }
}

fn init_tracing(default_level: tracing::Level) {
    let mut filter =
        tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into());
    // Reduce noise from the AWS SDK
    for target in ["aws_config", "aws_sdk", "aws_smithy_runtime"] {
        if let Ok(directive) = format!("{target}=warn").parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns `Ok(false)` when some deletion task failed
async fn run() -> Result<bool> {
    let mut args = Args::parse();
    let command = args
        .command
        .take()
        .unwrap_or_else(|| Command::Clean(CleanArgs::default()));

    // Spinners and log lines share the terminal; keep logs quiet under spinners
    let interactive = matches!(&command, Command::Clean(clean) if !clean.plain);
    init_tracing(if interactive {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    });

    match command {
        Command::Scan { format } => {
            handle_scan(args.sweep_config(&CleanArgs::default()), format).await?;
            Ok(true)
        }
        Command::Clean(clean) => handle_clean(args.sweep_config(&clean)).await,
    }
}

async fn connect(config: &config::SweepConfig) -> Result<AwsClients> {
    if config.kinds().is_empty() {
        bail!("No valid resource kinds given in --kinds");
    }
    if let Some(profile) = config.profile() {
        info!(profile = %profile, "Using AWS profile");
    }

    let aws = AwsContext::load(config.region(), config.profile()).await;
    let identity = aws.caller_identity().await?;
    eprintln!(
        "Using {identity} in {}",
        aws.region().unwrap_or("(no region set)")
    );
    Ok(AwsClients::from_context(&aws))
}

async fn discover(clients: &AwsClients, config: &config::SweepConfig, spinner: bool) -> Result<Catalog> {
    let progress = spinner.then(|| ui::discovery_spinner(config.kinds().len()));
    let catalog = Catalog::discover(clients, config.kinds()).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    catalog
}

/// Handle the scan command
async fn handle_scan(config: config::SweepConfig, format: OutputFormat) -> Result<()> {
    let clients = connect(&config).await?;
    let catalog = discover(&clients, &config, false).await?;
    ui::print_catalog(&catalog, format)
}

/// Handle the clean command
async fn handle_clean(config: config::SweepConfig) -> Result<bool> {
    let clients = connect(&config).await?;
    let catalog = discover(&clients, &config, !config.flags.plain).await?;

    if catalog.is_empty() {
        println!("No resources found.");
        return Ok(true);
    }

    let selection = if config.flags.yes {
        catalog.select_all()
    } else {
        ui::select_resources(&catalog)?
    };
    let tasks = generate_tasks(&selection);
    if tasks.is_empty() {
        println!("Nothing selected.");
        return Ok(true);
    }

    if !config.flags.yes && !ui::confirm_deletion(&tasks)? {
        println!("Cancelled.");
        return Ok(true);
    }

    let retry = RetryPolicy::default();
    let summaries: Vec<TaskSummary> = if config.flags.plain {
        execute_tasks(&clients, &tasks, &LogReporter::new(), &retry).await
    } else {
        let (reporter, rx) = ChannelReporter::channel();
        let executor = async {
            // Dropping the reporter closes the channel and ends the renderer
            let reporter = reporter;
            execute_tasks(&clients, &tasks, &reporter, &retry).await
        };
        let (summaries, ()) = tokio::join!(executor, ui::render_progress(rx, &tasks));
        summaries
    };

    ui::print_summary(&summaries);
    Ok(summaries.iter().all(|s| !s.failed()))
}
