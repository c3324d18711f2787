//! Persisted topic -> identifier -> record store.
//!
//! Each publishing target owns one JSON store file that accumulates papers
//! across runs. A merge overlays the current run's records: an identifier that
//! already exists is replaced by the new record in full, never field-merged.
//!
//! Files are read once and rewritten once per run. There is no locking; two
//! overlapping runs resolve as last writer wins.

mod error;

pub use error::StoreError;

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::fetch::FetchedTopic;
use crate::paper::PaperRecord;

/// Papers of one topic, keyed by dedup identifier.
pub type TopicPapers = BTreeMap<String, PaperRecord>;

/// In-memory form of a store file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaperStore {
    topics: BTreeMap<String, TopicPapers>,
}

impl PaperStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All topics in name order.
    #[must_use]
    pub fn topics(&self) -> &BTreeMap<String, TopicPapers> {
        &self.topics
    }

    /// Papers stored for `topic`.
    #[must_use]
    pub fn topic(&self, topic: &str) -> Option<&TopicPapers> {
        self.topics.get(topic)
    }

    /// True when no topic is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Inserts or replaces one record.
    #[cfg(test)]
    pub(crate) fn insert(&mut self, topic: &str, id: &str, record: PaperRecord) {
        self.topics
            .entry(topic.to_string())
            .or_default()
            .insert(id.to_string(), record);
    }

    /// Overlays freshly fetched records.
    ///
    /// Known topics get their identifier -> record entries overwritten or
    /// added; unknown topics are inserted wholesale. Topics absent from
    /// `batch` are left untouched. Merging the same batch twice equals
    /// merging it once.
    pub fn merge(&mut self, batch: &[FetchedTopic]) {
        for fetched in batch {
            let papers = self.topics.entry(fetched.topic.clone()).or_default();
            papers.extend(
                fetched
                    .papers
                    .iter()
                    .map(|(id, record)| (id.clone(), record.clone())),
            );
        }
    }

    /// Reads a store file.
    ///
    /// A missing, empty or whitespace-only file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Malformed`] when the content is not a store and
    /// [`StoreError::Io`] when the file cannot be read.
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("Store file missing, starting empty");
                return Ok(Self::new());
            }
            Err(err) => return Err(StoreError::io(path, err)),
        };

        if raw.trim().is_empty() {
            debug!("Store file empty, starting empty");
            return Ok(Self::new());
        }

        serde_json::from_str(&raw).map_err(|err| StoreError::malformed(path, &err.to_string()))
    }

    /// Replaces the file content with this store as pretty JSON.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on serialization or I/O failure.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|err| StoreError::io(path, err))
    }
}

/// Loads the store at `path`, merges `batch` into it and writes it back.
///
/// Returns the merged store.
///
/// # Errors
///
/// Returns [`StoreError`] when the existing file is malformed or I/O fails;
/// in that case the file is left as it was.
pub fn merge_into_file(path: &Path, batch: &[FetchedTopic]) -> Result<PaperStore, StoreError> {
    let mut store = PaperStore::load(path)?;
    store.merge(batch);
    store.save(path)?;

    let papers: usize = store.topics().values().map(BTreeMap::len).sum();
    info!(
        path = %path.display(),
        topics = store.topics().len(),
        papers,
        "Store updated"
    );
    Ok(store)
}
