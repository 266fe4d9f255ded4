pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

use crate::application::dispatcher::{Dispatcher, DispatcherConfig, RunOutcome};
use crate::application::schedule::Schedule;
use crate::application::source_list::SourceList;
use crate::application::supervisor::{Supervisor, SupervisorConfig};
use crate::config::{Config, PostSourceConfig};
use crate::domain::entities::journal::Journal;
use crate::domain::error::{FatalConfigError, RunError, StoreError};
use crate::domain::ports::classifier::Classifier;
use crate::domain::ports::journal_store::JournalStore;
use crate::domain::ports::post_source::PostSource;
use crate::domain::values::clock::ReferenceClock;
use crate::infrastructure::classifier::openai::OpenAiClassifier;
use crate::infrastructure::journal::json_file::JsonFileJournal;
use crate::infrastructure::sources::directory::DirectoryPostSource;
use crate::infrastructure::sources::http::HttpPostSource;
use std::path::Path;
use std::sync::Arc;

/// Wires the journal, the post source and the classifier together.
pub struct TradeJournal {
    store: Arc<dyn JournalStore>,
    dispatcher: Arc<Dispatcher>,
    clock: ReferenceClock,
}

impl TradeJournal {
    /// Build from validated configuration. Requires the classifier API key.
    pub fn new(config: &Config) -> Result<Self, FatalConfigError> {
        let api_key = config.require_api_key()?.to_string();
        let classifier: Arc<dyn Classifier> =
            Arc::new(OpenAiClassifier::new(api_key, config.model.clone(), config.clock));
        let source: Arc<dyn PostSource> = match &config.post_source {
            PostSourceConfig::Http { base_url, timeout } => Arc::new(HttpPostSource::new(base_url.clone(), *timeout)),
            PostSourceConfig::Directory { dir } => Arc::new(DirectoryPostSource::new(dir.clone())),
        };

        Ok(Self::with_providers(
            &config.journal_path,
            config.clock,
            source,
            classifier,
            config.dispatcher,
        ))
    }

    pub fn with_providers(
        journal_path: &Path,
        clock: ReferenceClock,
        source: Arc<dyn PostSource>,
        classifier: Arc<dyn Classifier>,
        dispatcher_config: DispatcherConfig,
    ) -> Self {
        let store: Arc<dyn JournalStore> = Arc::new(JsonFileJournal::new(journal_path, clock));
        Self::with_store(store, clock, source, classifier, dispatcher_config)
    }

    pub fn with_store(
        store: Arc<dyn JournalStore>,
        clock: ReferenceClock,
        source: Arc<dyn PostSource>,
        classifier: Arc<dyn Classifier>,
        dispatcher_config: DispatcherConfig,
    ) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(source, classifier, store.clone(), dispatcher_config));
        Self {
            store,
            dispatcher,
            clock,
        }
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        self.store.initialize()
    }

    pub fn journal(&self) -> Result<Journal, StoreError> {
        self.store.load()
    }

    /// A single run over `sources`, outside the scheduler.
    pub async fn run_once(&self, sources: &SourceList, concurrency: usize) -> Result<RunOutcome, RunError> {
        self.store.initialize()?;
        let ids = sources.load().await?;
        Ok(self.dispatcher.run(&ids, concurrency).await)
    }

    pub fn supervisor(&self, sources: SourceList, schedule: Schedule, config: SupervisorConfig) -> Supervisor {
        Supervisor::new(
            self.dispatcher.clone(),
            self.store.clone(),
            sources,
            schedule,
            self.clock,
            config,
        )
    }
}
