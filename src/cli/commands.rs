use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tradejournal",
    version,
    about = "Classify public figures' posts for trade signals into a per-day journal"
)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the scheduler loop until SIGINT/SIGTERM
    Run,
    /// Run the pipeline once over the current source list and print the outcome
    Once,
    /// Create an empty journal file if none exists
    Init,
    /// List day sessions in the journal with their signal counts
    Sessions,
}

/// Settings shared by all subcommands. Each flag can also come from the
/// environment (or a `.env` file).
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Journal file
    #[arg(long, global = true, env = "TRADEJOURNAL_JOURNAL", default_value = "congress_trades.json")]
    pub journal: PathBuf,

    /// Newline-delimited list of source ids (account handles)
    #[arg(long, global = true, env = "TRADEJOURNAL_SOURCES", default_value = "twitter_handles.txt")]
    pub sources: PathBuf,

    /// Post source backend: http or dir
    #[arg(long, global = true, env = "TRADEJOURNAL_POST_SOURCE", default_value = "http")]
    pub post_source: String,

    /// Base URL of the timeline endpoint (http backend)
    #[arg(long, global = true, env = "TRADEJOURNAL_POST_SOURCE_URL")]
    pub post_source_url: Option<String>,

    /// Directory of captured posts (dir backend)
    #[arg(long, global = true, env = "TRADEJOURNAL_POST_DIR")]
    pub post_dir: Option<PathBuf>,

    /// Per-request timeout for the post source, in seconds
    #[arg(long, global = true, env = "TRADEJOURNAL_FETCH_TIMEOUT_SECS", default_value = "30")]
    pub fetch_timeout_secs: u64,

    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Chat model used for classification
    #[arg(long, global = true, env = "TRADEJOURNAL_MODEL")]
    pub model: Option<String>,

    /// Maximum concurrent workers per run
    #[arg(long, global = true, env = "TRADEJOURNAL_CONCURRENCY", default_value = "5")]
    pub concurrency: usize,

    /// Seconds to wait for a run before abandoning its workers
    #[arg(long, global = true, env = "TRADEJOURNAL_RUN_DEADLINE_SECS", default_value = "300")]
    pub run_deadline_secs: u64,

    /// Worker dispatch: queue or partition
    #[arg(long, global = true, env = "TRADEJOURNAL_DISPATCH", default_value = "queue")]
    pub dispatch: String,

    /// Reference timezone for timestamps and day sessions
    #[arg(long, global = true, env = "TRADEJOURNAL_TIMEZONE", default_value = "America/New_York")]
    pub timezone: String,

    /// Daily trigger time (HH:MM, reference timezone)
    #[arg(long, global = true, env = "TRADEJOURNAL_RUN_AT", default_value = "09:30")]
    pub run_at: String,

    /// Also trigger on weekends
    #[arg(long, global = true, env = "TRADEJOURNAL_WEEKENDS")]
    pub weekends: bool,

    /// Trigger every N seconds instead of daily
    #[arg(long, global = true, env = "TRADEJOURNAL_RUN_EVERY_SECS")]
    pub run_every_secs: Option<u64>,

    /// Start a run immediately when the scheduler starts
    #[arg(long, global = true, env = "TRADEJOURNAL_RUN_ON_START")]
    pub run_on_start: bool,

    /// Scheduler tick in seconds (at most 60)
    #[arg(long, global = true, env = "TRADEJOURNAL_POLL_SECS", default_value = "60")]
    pub poll_secs: u64,

    /// Heartbeat log period in seconds
    #[arg(long, global = true, env = "TRADEJOURNAL_HEARTBEAT_SECS", default_value = "3600")]
    pub heartbeat_secs: u64,

    /// What to do after repeated run failures: exit or reexec
    #[arg(long, global = true, env = "TRADEJOURNAL_RESTART", default_value = "exit")]
    pub restart: String,
}
