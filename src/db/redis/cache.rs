use std::fmt::Display;
use std::time::Duration;

use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisResult};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::models::MediaType;

/// Writes applied per Redis round trip
const MAX_WRITE_BATCH: usize = 64;

/// Cached TMDB lookups
///
/// Streaming offers change slowly; show and season metadata is refreshed hourly
/// so newly announced episodes show up on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    WatchProviders(MediaType, i64),
    TvBasic(i64),
    Season(i64, i64),
}

impl CacheKey {
    pub fn ttl(&self) -> Duration {
        match self {
            CacheKey::WatchProviders(..) => Duration::from_secs(6 * 60 * 60),
            CacheKey::TvBasic(_) | CacheKey::Season(..) => Duration::from_secs(60 * 60),
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::WatchProviders(media_type, id) => {
                write!(f, "tmdb:providers:{}:{}", media_type, id)
            }
            CacheKey::TvBasic(id) => write!(f, "tmdb:tv:{}", id),
            CacheKey::Season(id, season) => write!(f, "tmdb:season:{}:{}", id, season),
        }
    }
}

pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    Ok(Client::open(redis_url)?)
}

#[derive(Debug)]
struct PendingWrite {
    key: String,
    json: String,
    ttl_secs: u64,
}

/// Provider response cache backed by Redis
///
/// Reads go straight to Redis. Writes are queued and applied by a background
/// task so a slow Redis never delays a response.
#[derive(Clone)]
pub struct Cache {
    conn: ConnectionManager,
    write_tx: mpsc::UnboundedSender<PendingWrite>,
}

/// Stops the background writer once queued writes are flushed
pub struct CacheWriterHandle {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl CacheWriterHandle {
    pub async fn shutdown(self) {
        // The writer may already be gone if every cache handle was dropped
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task failed");
        }
    }
}

impl Cache {
    /// Connects to Redis and starts the background writer
    pub async fn connect(client: Client) -> RedisResult<(Self, CacheWriterHandle)> {
        let conn = ConnectionManager::new(client).await?;
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run_writer(conn.clone(), write_rx, shutdown_rx));

        Ok((
            Self { conn, write_tx },
            CacheWriterHandle { shutdown_tx, task },
        ))
    }

    /// Cached value for `key`
    ///
    /// An entry that no longer decodes into `T` is reported as a miss and
    /// overwritten by the next write.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> RedisResult<Option<T>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key.to_string()).await?;

        Ok(raw.and_then(|json| match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }))
    }

    /// Queues `value` under `key` with the key's TTL
    pub fn set_in_background<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Cache serialization error");
                return;
            }
        };

        let write = PendingWrite {
            key: key.to_string(),
            json,
            ttl_secs: key.ttl().as_secs(),
        };

        if self.write_tx.send(write).is_err() {
            tracing::warn!(key = %key, "Cache writer stopped, dropping write");
        }
    }
}

async fn run_writer(
    mut conn: ConnectionManager,
    mut write_rx: mpsc::UnboundedReceiver<PendingWrite>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    tracing::debug!("Cache writer started");

    loop {
        tokio::select! {
            received = write_rx.recv() => {
                let Some(first) = received else { break };
                let mut batch = vec![first];
                while batch.len() < MAX_WRITE_BATCH {
                    match write_rx.try_recv() {
                        Ok(write) => batch.push(write),
                        Err(_) => break,
                    }
                }
                flush(&mut conn, batch).await;
            }
            _ = &mut shutdown_rx => {
                let mut remaining = Vec::new();
                while let Ok(write) = write_rx.try_recv() {
                    remaining.push(write);
                }
                tracing::info!(pending = remaining.len(), "Cache writer flushing before shutdown");
                flush(&mut conn, remaining).await;
                break;
            }
        }
    }

    tracing::debug!("Cache writer stopped");
}

/// Applies a batch of writes in one pipeline
async fn flush(conn: &mut ConnectionManager, batch: Vec<PendingWrite>) {
    if batch.is_empty() {
        return;
    }

    let count = batch.len();
    let mut pipe = redis::pipe();
    for write in batch {
        pipe.set_ex(write.key, write.json, write.ttl_secs).ignore();
    }

    let result: RedisResult<()> = pipe.query_async(conn).await;
    match result {
        Ok(()) => tracing::debug!(count, "Cache writes applied"),
        Err(e) => tracing::error!(count, error = %e, "Failed to write to Redis cache"),
    }
}
