//! Fan-out of one run across a bounded set of concurrent workers.
//!
//! Each worker pulls source ids, fetches their posts, drops posts without a
//! cashtag, classifies the rest and appends any signal to the journal. Errors
//! are isolated per source (fetch) or per post (classification, append) and
//! collected into the [`RunOutcome`]; they never abort the run.

use crate::domain::entities::post::PostRecord;
use crate::domain::ports::classifier::Classifier;
use crate::domain::ports::journal_store::JournalStore;
use crate::domain::ports::post_source::PostSource;
use crate::domain::values::ticker;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

pub const DEFAULT_CONCURRENCY: usize = 5;
pub const DEFAULT_RUN_DEADLINE: Duration = Duration::from_secs(300);

/// How source ids are handed to workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchStrategy {
    /// Fixed pool pulling one id at a time from a shared queue.
    #[default]
    Queue,
    /// One worker per contiguous group, see [`partition`].
    Partitioned,
}

impl fmt::Display for DispatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchStrategy::Queue => write!(f, "queue"),
            DispatchStrategy::Partitioned => write!(f, "partition"),
        }
    }
}

impl FromStr for DispatchStrategy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queue" => Ok(DispatchStrategy::Queue),
            "partition" | "partitioned" => Ok(DispatchStrategy::Partitioned),
            _ => Err(format!("Unknown dispatch strategy: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SourceFailure {
    pub source_id: String,
    pub error: String,
}

/// Summary of one dispatcher run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunOutcome {
    /// Source ids handed to workers.
    pub attempted: usize,
    /// Sources fetched and fully processed before the deadline.
    pub succeeded: usize,
    /// Sources whose fetch failed.
    pub failed: usize,
    /// Sources still in flight (or never started) when the deadline passed.
    pub incomplete: usize,
    pub posts_fetched: usize,
    pub posts_classified: usize,
    pub signals_recorded: usize,
    pub signals_dropped: usize,
    pub errors: Vec<SourceFailure>,
    pub timed_out: bool,
    pub elapsed_ms: u64,
}

impl RunOutcome {
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.failed == self.attempted
    }
}

/// Split `items` into `min(concurrency, len)` contiguous groups whose sizes
/// differ by at most one; earlier groups take the remainder.
pub fn partition<T>(items: &[T], concurrency: usize) -> Vec<&[T]> {
    if items.is_empty() {
        return Vec::new();
    }
    let groups = concurrency.clamp(1, items.len());
    let base = items.len() / groups;
    let extra = items.len() % groups;

    let mut out = Vec::with_capacity(groups);
    let mut start = 0;
    for g in 0..groups {
        let len = base + usize::from(g < extra);
        out.push(&items[start..start + len]);
        start += len;
    }
    out
}

#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    pub run_deadline: Duration,
    pub strategy: DispatchStrategy,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            run_deadline: DEFAULT_RUN_DEADLINE,
            strategy: DispatchStrategy::default(),
        }
    }
}

pub struct Dispatcher {
    worker: Worker,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(
        source: Arc<dyn PostSource>,
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn JournalStore>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            worker: Worker {
                source,
                classifier,
                store,
            },
            config,
        }
    }

    /// Process every id with at most `concurrency` workers and wait for them
    /// until the run deadline. Workers still busy at the deadline are detached
    /// and left to finish the source they hold; no new source is started after
    /// the deadline and progress past it is not reported.
    pub async fn run(&self, source_ids: &[String], concurrency: usize) -> RunOutcome {
        let started = Instant::now();
        let deadline = started + self.config.run_deadline;
        let progress = Arc::new(Mutex::new(Progress::default()));

        let mut workers = JoinSet::new();
        match self.config.strategy {
            DispatchStrategy::Queue => {
                let queue: Arc<Mutex<VecDeque<String>>> =
                    Arc::new(Mutex::new(source_ids.iter().cloned().collect()));
                let pool = concurrency.clamp(1, source_ids.len().max(1));
                for n in 0..pool {
                    let worker = self.worker.clone();
                    let queue = queue.clone();
                    let progress = progress.clone();
                    workers.spawn(async move {
                        while let Some(id) = next_id(&queue, deadline) {
                            worker.process(n, &id, &progress).await;
                        }
                    });
                }
            }
            DispatchStrategy::Partitioned => {
                for (n, group) in partition(source_ids, concurrency).into_iter().enumerate() {
                    let worker = self.worker.clone();
                    let group = group.to_vec();
                    let progress = progress.clone();
                    workers.spawn(async move {
                        for id in &group {
                            if Instant::now() >= deadline {
                                break;
                            }
                            worker.process(n, id, &progress).await;
                        }
                    });
                }
            }
        }
        info!(
            sources = source_ids.len(),
            workers = workers.len(),
            strategy = %self.config.strategy,
            "run started"
        );

        let mut timed_out = false;
        loop {
            match tokio::time::timeout_at(deadline, workers.join_next()).await {
                Ok(Some(Ok(()))) => {}
                Ok(Some(Err(e))) => error!(error = %e, "worker terminated abnormally"),
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        still_running = workers.len(),
                        deadline_secs = self.config.run_deadline.as_secs(),
                        "run deadline reached, abandoning remaining workers"
                    );
                    workers.detach_all();
                    timed_out = true;
                    break;
                }
            }
        }

        let progress = lock(&progress);
        let finished = progress.succeeded.len() + progress.failed.len();
        let outcome = RunOutcome {
            attempted: source_ids.len(),
            succeeded: progress.succeeded.len(),
            failed: progress.failed.len(),
            incomplete: source_ids.len().saturating_sub(finished),
            posts_fetched: progress.posts_fetched,
            posts_classified: progress.posts_classified,
            signals_recorded: progress.signals_recorded,
            signals_dropped: progress.signals_dropped,
            errors: progress.errors.clone(),
            timed_out,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            attempted = outcome.attempted,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            incomplete = outcome.incomplete,
            signals = outcome.signals_recorded,
            "run finished"
        );
        outcome
    }
}

/// Next queued id, or `None` once the deadline has passed. Detached workers
/// finish the id they hold but never start another.
fn next_id(queue: &Mutex<VecDeque<String>>, deadline: Instant) -> Option<String> {
    if Instant::now() >= deadline {
        return None;
    }
    queue.lock().unwrap_or_else(|p| p.into_inner()).pop_front()
}

fn lock(progress: &Mutex<Progress>) -> MutexGuard<'_, Progress> {
    progress.lock().unwrap_or_else(|p| p.into_inner())
}

#[derive(Default)]
struct Progress {
    succeeded: HashSet<String>,
    failed: HashSet<String>,
    posts_fetched: usize,
    posts_classified: usize,
    signals_recorded: usize,
    signals_dropped: usize,
    errors: Vec<SourceFailure>,
}

impl Progress {
    fn record_error(&mut self, source_id: &str, error: String) {
        self.errors.push(SourceFailure {
            source_id: source_id.to_string(),
            error,
        });
    }
}

#[derive(Clone)]
struct Worker {
    source: Arc<dyn PostSource>,
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn JournalStore>,
}

impl Worker {
    async fn process(&self, worker: usize, source_id: &str, progress: &Mutex<Progress>) {
        let posts = match self.source.fetch_posts(source_id).await {
            Ok(posts) => posts,
            Err(e) => {
                info!(worker, source_id, source = self.source.name(), error = %e, "skipping source");
                let mut p = lock(progress);
                p.failed.insert(source_id.to_string());
                p.record_error(source_id, e.to_string());
                return;
            }
        };
        debug!(worker, source_id, posts = posts.len(), "fetched posts");
        lock(progress).posts_fetched += posts.len();

        for post in posts {
            self.process_post(worker, source_id, post, progress).await;
        }

        lock(progress).succeeded.insert(source_id.to_string());
    }

    async fn process_post(&self, worker: usize, source_id: &str, post: PostRecord, progress: &Mutex<Progress>) {
        if post.is_empty() || !ticker::is_relevant(&post.text) {
            return;
        }

        lock(progress).posts_classified += 1;
        let signal = match self.classifier.classify(&post.author, &post.text).await {
            Ok(Some(signal)) => signal,
            Ok(None) => return,
            Err(e) => {
                warn!(worker, source_id, error = %e, "classification failed, treating as no signal");
                lock(progress).record_error(source_id, e.to_string());
                return;
            }
        };

        let company = signal.company_traded.clone();
        let store = self.store.clone();
        let appended = tokio::task::spawn_blocking(move || store.append(signal))
            .await
            .map_err(|e| e.to_string())
            .and_then(|r| r.map_err(|e| e.to_string()));

        let mut p = lock(progress);
        match appended {
            Ok(()) => {
                p.signals_recorded += 1;
                info!(worker, source_id, author = %post.author, company = %company, "recorded signal");
            }
            Err(e) => {
                p.signals_dropped += 1;
                error!(worker, source_id, error = %e, "failed to append signal, dropping it");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_covers_everything_in_order() {
        let ids: Vec<u32> = (0..23).collect();
        for concurrency in 1..=30 {
            let groups = partition(&ids, concurrency);
            assert_eq!(groups.len(), concurrency.min(ids.len()));
            let flat: Vec<u32> = groups.iter().flat_map(|g| g.iter().copied()).collect();
            assert_eq!(flat, ids, "concurrency {concurrency}");
            let sizes: Vec<usize> = groups.iter().map(|g| g.len()).collect();
            let (min, max) = (sizes.iter().min().unwrap(), sizes.iter().max().unwrap());
            assert!(max - min <= 1, "uneven groups {sizes:?}");
            assert!(sizes.windows(2).all(|w| w[0] >= w[1]), "remainder not front-loaded {sizes:?}");
        }
    }

    #[test]
    fn test_partition_small_inputs() {
        assert!(partition::<u8>(&[], 5).is_empty());
        assert_eq!(partition(&[1], 5), vec![&[1][..]]);
        assert_eq!(partition(&[1, 2, 3], 0), vec![&[1, 2, 3][..]]);
        assert_eq!(
            partition(&[1, 2, 3, 4, 5, 6, 7], 3),
            vec![&[1, 2, 3][..], &[4, 5][..], &[6, 7][..]]
        );
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("queue".parse::<DispatchStrategy>().unwrap(), DispatchStrategy::Queue);
        assert_eq!(
            "Partition".parse::<DispatchStrategy>().unwrap(),
            DispatchStrategy::Partitioned
        );
        assert!("steal".parse::<DispatchStrategy>().is_err());
    }

    #[test]
    fn test_all_failed() {
        let mut outcome = RunOutcome::default();
        assert!(!outcome.all_failed());
        outcome.attempted = 2;
        outcome.failed = 2;
        assert!(outcome.all_failed());
        outcome.failed = 1;
        assert!(!outcome.all_failed());
    }
}
