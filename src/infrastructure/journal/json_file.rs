use crate::domain::entities::journal::Journal;
use crate::domain::entities::trade_signal::TradeSignal;
use crate::domain::error::StoreError;
use crate::domain::ports::journal_store::JournalStore;
use crate::domain::values::clock::ReferenceClock;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Journal persisted as a single pretty-printed JSON document.
///
/// Every append is a full read-modify-write under one in-process lock. The
/// new document is written to a sibling temp file and renamed over the old
/// one, so a reader sees either the previous or the next journal.
pub struct JsonFileJournal {
    path: PathBuf,
    clock: ReferenceClock,
    lock: Mutex<()>,
}

impl JsonFileJournal {
    pub fn new(path: impl Into<PathBuf>, clock: ReferenceClock) -> Self {
        Self {
            path: path.into(),
            clock,
            lock: Mutex::new(()),
        }
    }

    /// Build the store and make sure the backing file exists.
    pub fn open(path: impl Into<PathBuf>, clock: ReferenceClock) -> Result<Self, StoreError> {
        let store = Self::new(path, clock);
        store.initialize()?;
        Ok(store)
    }

    fn read(&self) -> Result<Journal, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Journal::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, journal: &Journal) -> Result<(), StoreError> {
        let tmp = self.tmp_path();
        let mut file = fs::File::create(&tmp)?;
        serde_json::to_writer_pretty(&mut file, journal)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "journal".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl JournalStore for JsonFileJournal {
    fn initialize(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        self.write(&Journal::default())?;
        tracing::info!(path = %self.path.display(), "initialized empty journal");
        Ok(())
    }

    fn append(&self, signal: TradeSignal) -> Result<(), StoreError> {
        let date = self
            .clock
            .day_of(&signal.timestamp)
            .map_err(StoreError::Timestamp)?;

        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut journal = self.read()?;
        let created = journal.record(date, signal, || self.clock.timestamp());
        self.write(&journal)?;

        if created {
            tracing::info!(%date, "opened new day session");
        }
        Ok(())
    }

    fn load(&self) -> Result<Journal, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        self.read()
    }
}
