use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{MediaType, NewWatchlistItem, WatchlistItem},
};

/// Persistence for the user's watchlist
///
/// Items are keyed by `(id, media_type)`; adding an existing key is a no-op.
/// Every operation returns the watchlist newest-first.
#[async_trait::async_trait]
pub trait WatchlistStore: Send + Sync {
    async fn load(&self) -> AppResult<Vec<WatchlistItem>>;

    async fn add(&self, item: NewWatchlistItem) -> AppResult<Vec<WatchlistItem>>;

    async fn remove(&self, media_type: MediaType, id: i64) -> AppResult<Vec<WatchlistItem>>;
}

// ============================================================================
// Postgres
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct WatchlistRow {
    id: i64,
    media_type: String,
    title: String,
    poster_path: Option<String>,
    vote_average: f64,
    release_date: Option<String>,
    added_at: DateTime<Utc>,
}

impl TryFrom<WatchlistRow> for WatchlistItem {
    type Error = AppError;

    fn try_from(row: WatchlistRow) -> Result<Self, Self::Error> {
        let media_type = row.media_type.parse().map_err(|_| {
            AppError::Internal(format!("Unknown media type in watchlist: {}", row.media_type))
        })?;

        Ok(WatchlistItem {
            id: row.id,
            media_type,
            title: row.title,
            poster_path: row.poster_path,
            vote_average: row.vote_average,
            release_date: row.release_date,
            added_at: row.added_at,
        })
    }
}

#[derive(Clone)]
pub struct PgWatchlistStore {
    pool: PgPool,
}

impl PgWatchlistStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl WatchlistStore for PgWatchlistStore {
    async fn load(&self) -> AppResult<Vec<WatchlistItem>> {
        let rows: Vec<WatchlistRow> = sqlx::query_as(
            r#"
            SELECT id, media_type, title, poster_path, vote_average, release_date, added_at
            FROM watchlist
            ORDER BY added_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(WatchlistItem::try_from).collect()
    }

    async fn add(&self, item: NewWatchlistItem) -> AppResult<Vec<WatchlistItem>> {
        let result = sqlx::query(
            r#"
            INSERT INTO watchlist
                (id, media_type, title, poster_path, vote_average, release_date, added_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id, media_type) DO NOTHING
            "#,
        )
        .bind(item.id)
        .bind(item.media_type.as_str())
        .bind(&item.title)
        .bind(&item.poster_path)
        .bind(item.vote_average)
        .bind(&item.release_date)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            id = item.id,
            media_type = %item.media_type,
            inserted = result.rows_affected() > 0,
            "Watchlist add"
        );

        self.load().await
    }

    async fn remove(&self, media_type: MediaType, id: i64) -> AppResult<Vec<WatchlistItem>> {
        sqlx::query("DELETE FROM watchlist WHERE id = $1 AND media_type = $2")
            .bind(id)
            .bind(media_type.as_str())
            .execute(&self.pool)
            .await?;

        self.load().await
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Watchlist kept in process memory; contents are lost on restart
#[derive(Default)]
pub struct MemoryWatchlistStore {
    items: RwLock<Vec<WatchlistItem>>,
}

impl MemoryWatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest first; equal timestamps keep the later insertion first
    fn snapshot(items: &[WatchlistItem]) -> Vec<WatchlistItem> {
        let mut snapshot: Vec<WatchlistItem> = items.iter().rev().cloned().collect();
        snapshot.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        snapshot
    }
}

#[async_trait::async_trait]
impl WatchlistStore for MemoryWatchlistStore {
    async fn load(&self) -> AppResult<Vec<WatchlistItem>> {
        let items = self.items.read().await;
        Ok(Self::snapshot(&items))
    }

    async fn add(&self, item: NewWatchlistItem) -> AppResult<Vec<WatchlistItem>> {
        let mut items = self.items.write().await;
        let exists = items
            .iter()
            .any(|existing| existing.id == item.id && existing.media_type == item.media_type);

        if !exists {
            items.push(item.into_item(Utc::now()));
        }

        Ok(Self::snapshot(&items))
    }

    async fn remove(&self, media_type: MediaType, id: i64) -> AppResult<Vec<WatchlistItem>> {
        let mut items = self.items.write().await;
        items.retain(|item| !(item.id == id && item.media_type == media_type));
        Ok(Self::snapshot(&items))
    }
}
