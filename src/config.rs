use crate::application::dispatcher::{DispatchStrategy, DispatcherConfig};
use crate::application::schedule::Trigger;
use crate::application::supervisor::{RestartPolicy, SupervisorConfig, ESCALATION_THRESHOLD};
use crate::cli::commands::Settings;
use crate::domain::error::FatalConfigError;
use crate::domain::values::clock::ReferenceClock;
use chrono::NaiveTime;
use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;

const MAX_POLL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub enum PostSourceConfig {
    Http { base_url: String, timeout: Duration },
    Directory { dir: PathBuf },
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub journal_path: PathBuf,
    pub sources_path: PathBuf,
    pub post_source: PostSourceConfig,
    pub openai_api_key: Option<String>,
    pub model: Option<String>,
    pub clock: ReferenceClock,
    pub dispatcher: DispatcherConfig,
    pub supervisor: SupervisorConfig,
    pub trigger: Trigger,
    pub run_on_start: bool,
    pub restart: RestartPolicy,
}

impl Config {
    pub fn from_settings(s: &Settings) -> Result<Self, FatalConfigError> {
        let post_source = match s.post_source.to_lowercase().as_str() {
            "http" => PostSourceConfig::Http {
                base_url: s
                    .post_source_url
                    .clone()
                    .filter(|u| !u.trim().is_empty())
                    .ok_or("TRADEJOURNAL_POST_SOURCE_URL is required for the http post source")?,
                timeout: Duration::from_secs(s.fetch_timeout_secs.max(1)),
            },
            "dir" | "directory" => PostSourceConfig::Directory {
                dir: s
                    .post_dir
                    .clone()
                    .ok_or("TRADEJOURNAL_POST_DIR is required for the dir post source")?,
            },
            other => return Err(format!("Unknown post source: {other}").into()),
        };

        if s.concurrency == 0 {
            return Err("Concurrency must be at least 1".into());
        }
        if s.run_deadline_secs == 0 {
            return Err("Run deadline must be at least 1 second".into());
        }

        let tz: Tz = s
            .timezone
            .parse()
            .map_err(|e| FatalConfigError(format!("Invalid timezone {}: {e}", s.timezone)))?;

        let trigger = match s.run_every_secs {
            Some(0) => return Err("Run interval must be at least 1 second".into()),
            Some(secs) => Trigger::Every(Duration::from_secs(secs)),
            None => Trigger::Daily {
                at: NaiveTime::parse_from_str(&s.run_at, "%H:%M")
                    .map_err(|e| FatalConfigError(format!("Invalid run time {}: {e}", s.run_at)))?,
                weekdays_only: !s.weekends,
            },
        };

        Ok(Self {
            journal_path: s.journal.clone(),
            sources_path: s.sources.clone(),
            post_source,
            openai_api_key: s.openai_api_key.clone().filter(|k| !k.trim().is_empty()),
            model: s.model.clone(),
            clock: ReferenceClock::new(tz),
            dispatcher: DispatcherConfig {
                run_deadline: Duration::from_secs(s.run_deadline_secs),
                strategy: s.dispatch.parse::<DispatchStrategy>()?,
            },
            supervisor: SupervisorConfig {
                concurrency: s.concurrency,
                poll_interval: Duration::from_secs(s.poll_secs).clamp(Duration::from_secs(1), MAX_POLL),
                heartbeat_interval: Duration::from_secs(s.heartbeat_secs.max(1)),
                failure_threshold: ESCALATION_THRESHOLD,
            },
            trigger,
            run_on_start: s.run_on_start,
            restart: s.restart.parse::<RestartPolicy>()?,
        })
    }

    /// The classifier key is only needed by commands that classify.
    pub fn require_api_key(&self) -> Result<&str, FatalConfigError> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| FatalConfigError("OPENAI_API_KEY not found in environment".into()))
    }
}
