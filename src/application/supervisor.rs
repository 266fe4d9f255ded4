//! Long-lived control loop: triggers dispatcher runs on a schedule, counts
//! consecutive run-level failures and asks for a restart once they pile up.
//!
//! ```text
//! Idle ──trigger──▶ Running ──ok──▶ Idle
//!                      │
//!                      └─err─▶ Idle (failures < threshold)
//!                      └─err─▶ Escalating ─▶ Restarting (failures == threshold)
//! any state ──stop token──▶ Stopped (an in-flight run is finished first)
//! ```

use crate::application::dispatcher::{Dispatcher, RunOutcome, DEFAULT_CONCURRENCY};
use crate::application::schedule::{Heartbeat, Schedule};
use crate::application::source_list::SourceList;
use crate::domain::error::RunError;
use crate::domain::ports::journal_store::JournalStore;
use crate::domain::values::clock::ReferenceClock;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Consecutive failed runs that trigger a restart.
pub const ESCALATION_THRESHOLD: u32 = 5;

/// Process exit code asking an external process manager for a restart
/// (`EX_TEMPFAIL`).
pub const RESTART_EXIT_CODE: i32 = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Running,
    Escalating,
    Restarting,
    Stopped,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorState::Idle => write!(f, "idle"),
            SupervisorState::Running => write!(f, "running"),
            SupervisorState::Escalating => write!(f, "escalating"),
            SupervisorState::Restarting => write!(f, "restarting"),
            SupervisorState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Why [`Supervisor::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorExit {
    Stopped,
    Restart,
}

/// How a restart request is carried out by the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartPolicy {
    /// Exit with [`RESTART_EXIT_CODE`] and let the process manager restart us.
    #[default]
    ExitForManager,
    /// Replace the process image with a fresh copy of itself.
    Reexec,
}

impl FromStr for RestartPolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exit" => Ok(RestartPolicy::ExitForManager),
            "reexec" => Ok(RestartPolicy::Reexec),
            _ => Err(format!("Unknown restart policy: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SupervisorConfig {
    pub concurrency: usize,
    /// Tick period of the control loop; bounds stop latency.
    pub poll_interval: Duration,
    pub heartbeat_interval: Duration,
    pub failure_threshold: u32,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            poll_interval: Duration::from_secs(60),
            heartbeat_interval: Duration::from_secs(3600),
            failure_threshold: ESCALATION_THRESHOLD,
        }
    }
}

pub struct Supervisor {
    dispatcher: Arc<Dispatcher>,
    store: Arc<dyn JournalStore>,
    sources: SourceList,
    schedule: Schedule,
    clock: ReferenceClock,
    config: SupervisorConfig,
    state: SupervisorState,
    consecutive_failures: u32,
}

impl Supervisor {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        store: Arc<dyn JournalStore>,
        sources: SourceList,
        schedule: Schedule,
        clock: ReferenceClock,
        config: SupervisorConfig,
    ) -> Self {
        Self {
            dispatcher,
            store,
            sources,
            schedule,
            clock,
            config,
            state: SupervisorState::Idle,
            consecutive_failures: 0,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// One full run: re-read the source list, dispatch, and fold the result
    /// into the failure counter.
    pub async fn trigger(&mut self) -> Result<RunOutcome, RunError> {
        self.state = SupervisorState::Running;
        info!(at = %self.clock.timestamp(), "starting run");
        let result = self.execute().await;
        self.record(&result);
        result
    }

    async fn execute(&self) -> Result<RunOutcome, RunError> {
        self.store.initialize()?;
        let ids = self.sources.load().await?;
        let outcome = self.dispatcher.run(&ids, self.config.concurrency).await;
        if outcome.all_failed() {
            return Err(RunError::AllSourcesFailed {
                failed: outcome.failed,
            });
        }
        Ok(outcome)
    }

    /// Apply a run result to the state machine and return the new state.
    pub fn record(&mut self, result: &Result<RunOutcome, RunError>) -> SupervisorState {
        match result {
            Ok(outcome) => {
                self.consecutive_failures = 0;
                self.state = SupervisorState::Idle;
                info!(
                    at = %self.clock.timestamp(),
                    signals = outcome.signals_recorded,
                    errors = outcome.errors.len(),
                    "run complete"
                );
            }
            Err(e) => {
                self.consecutive_failures += 1;
                error!(
                    error = %e,
                    consecutive_failures = self.consecutive_failures,
                    threshold = self.config.failure_threshold,
                    "run failed"
                );
                if self.consecutive_failures >= self.config.failure_threshold {
                    self.state = SupervisorState::Escalating;
                    error!(
                        critical = true,
                        consecutive_failures = self.consecutive_failures,
                        "too many consecutive run failures, restarting"
                    );
                    self.state = SupervisorState::Restarting;
                } else {
                    self.state = SupervisorState::Idle;
                }
            }
        }
        self.state
    }

    /// Drive the loop until `stop` is cancelled or a restart is needed.
    /// `stop` is checked once per poll tick and after each run; a run already
    /// in progress is never interrupted.
    pub async fn run(&mut self, stop: CancellationToken) -> SupervisorExit {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut heartbeat = Heartbeat::new(self.config.heartbeat_interval);

        info!(
            at = %self.clock.timestamp(),
            trigger = ?self.schedule.trigger(),
            timezone = %self.clock.timezone(),
            "scheduler started"
        );

        loop {
            tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                now = ticker.tick() => {
                    if heartbeat.due(now) {
                        info!("scheduler heartbeat - still running");
                    }
                    if !self.schedule.poll(self.clock.now()) {
                        continue;
                    }
                    // Errors are already logged and counted by `trigger`.
                    let _ = self.trigger().await;
                    if self.state == SupervisorState::Restarting {
                        return SupervisorExit::Restart;
                    }
                    if stop.is_cancelled() {
                        warn!("stop requested during run; run was allowed to finish");
                    }
                }
            }
        }

        self.state = SupervisorState::Stopped;
        info!("scheduler stopped");
        SupervisorExit::Stopped
    }
}
