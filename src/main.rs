use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tradejournal::application::schedule::Schedule;
use tradejournal::application::source_list::SourceList;
use tradejournal::application::supervisor::{RestartPolicy, SupervisorExit, RESTART_EXIT_CODE};
use tradejournal::cli::commands::{Cli, Commands};
use tradejournal::config::Config;
use tradejournal::domain::ports::journal_store::JournalStore;
use tradejournal::domain::values::clock::ReferenceClock;
use tradejournal::infrastructure::journal::json_file::JsonFileJournal;
use tradejournal::logging::init_logging;
use tradejournal::TradeJournal;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = match Config::from_settings(&cli.settings) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match run_command(config, cli.command).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "fatal error");
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run_command(config: Config, cmd: Commands) -> anyhow::Result<i32> {
    match cmd {
        Commands::Init => {
            JsonFileJournal::open(&config.journal_path, config.clock)
                .with_context(|| format!("initializing {}", config.journal_path.display()))?;
            println!("Journal ready at {}", config.journal_path.display());
        }
        Commands::Sessions => {
            let journal = JsonFileJournal::new(&config.journal_path, config.clock)
                .load()
                .with_context(|| format!("reading {}", config.journal_path.display()))?;
            for session in &journal.trading_sessions {
                println!("{}: {} signals (opened {})", session.date, session.analyses.len(), session.market_open_time);
            }
        }
        Commands::Once => {
            let app = TradeJournal::new(&config)?;
            let sources = SourceList::new(&config.sources_path);
            let outcome = app.run_once(&sources, config.supervisor.concurrency).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Run => {
            let app = TradeJournal::new(&config)?;
            app.initialize()
                .with_context(|| format!("initializing {}", config.journal_path.display()))?;

            tracing::info!(
                pid = std::process::id(),
                started_at = %config.clock.timestamp(),
                "starting trade journal"
            );

            let stop = CancellationToken::new();
            tokio::spawn(forward_shutdown_signals(stop.clone()));

            let mut supervisor = app.supervisor(
                SourceList::new(&config.sources_path),
                Schedule::new(config.trigger, config.run_on_start),
                config.supervisor,
            );
            if supervisor.run(stop).await == SupervisorExit::Restart {
                return restart(config.restart, config.clock);
            }
        }
    }
    Ok(0)
}

/// Cancel `stop` on SIGINT or SIGTERM.
async fn forward_shutdown_signals(stop: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM; only Ctrl-C will stop");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("shutdown signal received, waiting for the current run to complete");
    stop.cancel();
}

fn restart(policy: RestartPolicy, clock: ReferenceClock) -> anyhow::Result<i32> {
    match policy {
        RestartPolicy::ExitForManager => {
            tracing::warn!(exit_code = RESTART_EXIT_CODE, "exiting for restart by process manager");
            Ok(RESTART_EXIT_CODE)
        }
        RestartPolicy::Reexec => reexec(clock),
    }
}

#[cfg(unix)]
fn reexec(clock: ReferenceClock) -> anyhow::Result<i32> {
    use std::os::unix::process::CommandExt;

    let exe = std::env::current_exe().context("locating current executable")?;
    tracing::warn!(exe = %exe.display(), at = %clock.timestamp(), "re-executing process");
    // `exec` only returns on failure.
    let err = std::process::Command::new(&exe)
        .args(std::env::args_os().skip(1))
        .exec();
    Err(anyhow::Error::new(err).context("re-exec failed"))
}

#[cfg(not(unix))]
fn reexec(_clock: ReferenceClock) -> anyhow::Result<i32> {
    tracing::warn!("re-exec is unsupported on this platform, exiting for restart");
    Ok(RESTART_EXIT_CODE)
}
