//! File-system implementation of the `EventStore` trait.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use chronicle_core::event::{ALL_STREAM, DomainEvent, EventPayload, Events};
use chronicle_core::registry::EventRegistry;
use chronicle_core::store::{Envelope, EventStore, StoreError, check_stream_id};

use crate::layout::{StoreLayout, next_key, parse_key};

/// Event store keeping one directory per stream and one JSON file per event.
///
/// Appends are serialized by a single lock that also guards the last issued
/// ordering key. Loads take no lock; an append in flight may or may not be
/// visible to a concurrent load, but a load never sees a partially written
/// record because records are renamed into place only once fully synced.
#[derive(Debug)]
pub struct FileEventStore<E> {
    layout: StoreLayout,
    registry: EventRegistry<E>,
    last_key: Mutex<u64>,
}

impl<E: DomainEvent> FileEventStore<E> {
    /// Opens (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the root or the global stream directory
    /// cannot be created or scanned.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let layout = StoreLayout::new(root);
        let all_dir = layout.stream_dir(ALL_STREAM);
        let io_err = |source| StoreError::Io {
            op: "open",
            stream: ALL_STREAM.to_owned(),
            source,
        };

        fs::create_dir_all(&all_dir).await.map_err(io_err)?;
        let last_key = latest_key(&all_dir).await.map_err(io_err)?;

        info!(root = %layout.root().display(), last_key, "opened event store");

        Ok(Self {
            layout,
            registry: EventRegistry::new(),
            last_key: Mutex::new(last_key),
        })
    }

    /// Registers the payload shape `P` for deserialization. Must be called for
    /// every stored event type before the store is shared or loaded from.
    pub fn register<P>(&mut self)
    where
        P: EventPayload + Into<E>,
    {
        self.registry.register::<P>();
    }

    /// The registry used to decode loaded envelopes.
    #[must_use]
    pub fn registry(&self) -> &EventRegistry<E> {
        &self.registry
    }

    /// The directory layout of this store.
    #[must_use]
    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    async fn append(&self, stream: &str, key: u64, data: &[u8]) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            op: "store",
            stream: stream.to_owned(),
            source,
        };

        fs::create_dir_all(self.layout.stream_dir(stream))
            .await
            .map_err(io_err)?;

        let temp = self.layout.temp_path(stream, key);
        let mut file = fs::File::create(&temp).await.map_err(io_err)?;
        file.write_all(data).await.map_err(io_err)?;
        file.sync_all().await.map_err(io_err)?;
        drop(file);

        fs::rename(&temp, self.layout.record_path(stream, key))
            .await
            .map_err(io_err)
    }

    async fn read_record(&self, stream: &str, path: &Path) -> Result<E, StoreError> {
        let data = fs::read(path).await.map_err(|source| StoreError::Io {
            op: "load_stream",
            stream: stream.to_owned(),
            source,
        })?;
        let ser_err = |source| StoreError::Serialization {
            op: "load_stream",
            stream: stream.to_owned(),
            source,
        };

        let envelope: Envelope = serde_json::from_slice(&data).map_err(ser_err)?;
        envelope.open(&self.registry).map_err(ser_err)
    }
}

#[async_trait]
impl<E: DomainEvent> EventStore<E> for FileEventStore<E> {
    async fn store(&self, event: &E) -> Result<(), StoreError> {
        let stream = event.aggregate_id();
        check_stream_id("store", stream)?;

        let mut last_key = self.last_key.lock().await;
        let stored_at = Utc::now();
        let key = next_key(*last_key, stored_at);

        let ser_err = |source| StoreError::Serialization {
            op: "store",
            stream: stream.to_owned(),
            source,
        };
        let envelope = Envelope::seal(event, stored_at).map_err(ser_err)?;
        let data = serde_json::to_vec_pretty(&envelope).map_err(ser_err)?;

        *last_key = key;
        self.append(ALL_STREAM, key, &data).await?;
        if let Err(err) = self.append(stream, key, &data).await {
            // The global log already holds the record; the caller has to know.
            error!(stream, key, error = %err, "event stored in global stream only");
            return Err(err);
        }

        debug!(stream, key, tag = event.tag(), "event stored");
        Ok(())
    }

    async fn load_stream(&self, id: &str) -> Result<Events<E>, StoreError> {
        let not_found = || StoreError::NotFound {
            op: "load_stream",
            stream: id.to_owned(),
        };
        if id != ALL_STREAM && check_stream_id("load_stream", id).is_err() {
            return Err(not_found());
        }

        let dir = self.layout.stream_dir(id);
        let keys = match record_keys(&dir).await {
            Ok(keys) => keys,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(source) => {
                return Err(StoreError::Io {
                    op: "load_stream",
                    stream: id.to_owned(),
                    source,
                });
            }
        };
        if keys.is_empty() && id != ALL_STREAM {
            return Err(not_found());
        }

        let mut events = Events::none();
        for key in keys {
            let path = self.layout.record_path(id, key);
            events.push(self.read_record(id, &path).await?);
        }
        Ok(events)
    }
}

/// Keys of the complete records in `dir`, ascending.
async fn record_keys(dir: &Path) -> io::Result<Vec<u64>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut keys = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if let Some(key) = entry.file_name().to_str().and_then(parse_key) {
            keys.push(key);
        }
    }
    keys.sort_unstable();
    Ok(keys)
}

async fn latest_key(dir: &Path) -> io::Result<u64> {
    Ok(record_keys(dir).await?.last().copied().unwrap_or(0))
}
