//! swarm-events CLI - report worker session outcomes to NATS JetStream
//!
//! Meant to be called by a worker wrapper once its task has ended, or to
//! render the worker prompt for a briefing.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use swarm_events::mission::{build_task_message, build_worker_prompt, read_briefing};
use swarm_events::{ClientConfig, SessionData, SessionPublisher, TokenUsage};

#[derive(Parser)]
#[command(name = "swarm-events")]
#[command(version, about = "Report swarm worker session outcomes to NATS JetStream", long_about = None)]
struct Cli {
    /// YAML config file; defaults plus environment when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a session completed/failed event and wait for the ack
    Publish(PublishArgs),

    /// Print the worker prompt and first task message for a briefing
    Prompt {
        /// Mission directory containing .mission/handoffs/
        #[arg(short, long, default_value = ".")]
        mission_dir: PathBuf,

        /// Task whose briefing to load
        #[arg(short, long)]
        task_id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Outcome {
    Completed,
    Failed,
}

#[derive(Args)]
struct PublishArgs {
    /// Terminal outcome of the session
    #[arg(value_enum)]
    outcome: Outcome,

    #[arg(long)]
    session_id: String,

    #[arg(long)]
    agent_type: String,

    #[arg(long, default_value = "")]
    task_id: String,

    #[arg(long, default_value = "")]
    owner_uuid: String,

    #[arg(long, default_value = "")]
    transcript_path: String,

    /// Changed file path (repeatable)
    #[arg(long = "file")]
    files_changed: Vec<String>,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    exit_code: i32,

    #[arg(long, default_value_t = 0)]
    duration_ms: i64,

    /// Defaults to the current directory
    #[arg(long)]
    working_dir: Option<PathBuf>,

    #[arg(long, default_value = "")]
    model: String,

    #[arg(long, default_value = "")]
    runtime: String,

    #[arg(long, default_value_t = 0)]
    input_tokens: u64,

    #[arg(long, default_value_t = 0)]
    output_tokens: u64,

    #[arg(long, default_value_t = 0)]
    cache_read_tokens: u64,

    #[arg(long, default_value_t = 0)]
    cache_write_tokens: u64,
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Publish(args) => match load_config(cli.config) {
            Ok(config) => publish(config, args).await,
            Err(e) => Err(e),
        },
        Commands::Prompt { mission_dir, task_id } => print_prompt(mission_dir, &task_id),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ClientConfig, String> {
    let config = match path {
        Some(path) => ClientConfig::load_from_file(&path)
            .map_err(|e| format!("Failed to load config: {}", e))?,
        None => ClientConfig::default(),
    };
    Ok(config.with_env_overrides())
}

async fn publish(config: ClientConfig, args: PublishArgs) -> Result<(), String> {
    let working_dir = match args.working_dir {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(|e| format!("Cannot resolve working dir: {}", e))?,
    };

    let usage = TokenUsage {
        prompt_tokens: args.input_tokens,
        completion_tokens: args.output_tokens,
        total_tokens: args.input_tokens + args.output_tokens,
        cache_read_tokens: args.cache_read_tokens,
        cache_write_tokens: args.cache_write_tokens,
    };

    let mut data = SessionData::new(args.session_id, args.agent_type, working_dir.display().to_string())
        .with_task_id(args.task_id)
        .with_files_changed(args.files_changed)
        .with_exit(args.exit_code, args.duration_ms)
        .with_model(args.model, args.runtime)
        .with_usage(&usage);
    data.owner_uuid = args.owner_uuid;
    data.transcript_path = args.transcript_path;

    let publisher = SessionPublisher::connect(&config)
        .await
        .map_err(|e| format!("Failed to connect to NATS: {}", e))?;

    let result = match args.outcome {
        Outcome::Completed => publisher.publish_completed(&data).await,
        Outcome::Failed => publisher.publish_failed(&data).await,
    };

    // Close regardless of the publish outcome
    publisher.close().await;

    let ack = result.map_err(|e| format!("Failed to publish session event: {}", e))?;
    println!("{} {}", ack.stream, ack.sequence);
    Ok(())
}

fn print_prompt(mission_dir: PathBuf, task_id: &str) -> Result<(), String> {
    let briefing = read_briefing(&mission_dir, task_id)
        .map_err(|e| format!("Failed to read briefing: {}", e))?;

    println!("{}", build_worker_prompt(&briefing));
    println!("{}", build_task_message(&briefing));
    Ok(())
}
