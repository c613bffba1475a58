//! SQLite-backed checkpointer. Persistent across process restarts.
//!
//! One row per checkpoint; state bytes come from a `Serializer`, metadata is JSON
//! text. Each call opens its own connection inside `spawn_blocking`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata};
use crate::memory::checkpointer::{list_window, thread_id, CheckpointError, Checkpointer};
use crate::memory::config::RunnableConfig;
use crate::memory::serializer::Serializer;

fn storage(e: impl std::fmt::Display) -> CheckpointError {
    CheckpointError::Storage(e.to_string())
}

fn encode_metadata(metadata: &CheckpointMetadata) -> Result<String, CheckpointError> {
    serde_json::to_string(metadata).map_err(|e| CheckpointError::Serialization(e.to_string()))
}

fn decode_metadata(text: &str) -> Result<CheckpointMetadata, CheckpointError> {
    serde_json::from_str(text).map_err(|e| CheckpointError::Serialization(e.to_string()))
}

/// Row as read from the table, before the state is deserialized.
struct StoredRow {
    checkpoint_id: String,
    ts: String,
    next: Option<String>,
    state: Vec<u8>,
    metadata: String,
}

/// SQLite checkpointer.
///
/// **Interaction**: Used as `Arc<dyn Checkpointer<S>>` like `MemorySaver`; the
/// memory chatbot picks it when `CHATBOT_SQLITE_PATH` is set.
pub struct SqliteSaver<S> {
    db_path: PathBuf,
    serializer: Arc<dyn Serializer<S>>,
}

impl<S> SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Opens (or creates) the database and ensures the table exists.
    pub fn new(
        path: impl AsRef<Path>,
        serializer: Arc<dyn Serializer<S>>,
    ) -> Result<Self, CheckpointError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS checkpoints (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                thread_id TEXT NOT NULL,
                checkpoint_id TEXT NOT NULL,
                ts TEXT NOT NULL,
                next TEXT,
                state BLOB NOT NULL,
                metadata TEXT NOT NULL,
                UNIQUE (thread_id, checkpoint_id)
            )
            "#,
            [],
        )
        .map_err(storage)?;
        Ok(Self {
            db_path,
            serializer,
        })
    }
}

#[async_trait]
impl<S> Checkpointer<S> for SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError> {
        let thread = thread_id(config)?.to_string();
        let state = self.serializer.serialize(&checkpoint.values)?;
        let metadata = encode_metadata(&checkpoint.metadata)?;
        let id = checkpoint.id.clone();
        let ts = checkpoint.ts.clone();
        let next = checkpoint.next.clone();
        let db_path = self.db_path.clone();
        let saved_id = id.clone();

        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            conn.execute(
                "INSERT OR REPLACE INTO checkpoints (thread_id, checkpoint_id, ts, next, state, metadata) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![thread, id, ts, next, state, metadata],
            )
            .map_err(storage)?;
            Ok::<(), CheckpointError>(())
        })
        .await
        .map_err(storage)??;
        Ok(saved_id)
    }

    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError> {
        let thread = thread_id(config)?.to_string();
        let wanted = config.checkpoint_id.clone();
        let db_path = self.db_path.clone();

        let row = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            let map_row = |r: &rusqlite::Row<'_>| -> rusqlite::Result<StoredRow> {
                Ok(StoredRow {
                    checkpoint_id: r.get(0)?,
                    ts: r.get(1)?,
                    next: r.get(2)?,
                    state: r.get(3)?,
                    metadata: r.get(4)?,
                })
            };
            let row = match wanted {
                Some(id) => conn
                    .query_row(
                        "SELECT checkpoint_id, ts, next, state, metadata FROM checkpoints \
                         WHERE thread_id = ?1 AND checkpoint_id = ?2",
                        params![thread, id],
                        map_row,
                    )
                    .optional(),
                None => conn
                    .query_row(
                        "SELECT checkpoint_id, ts, next, state, metadata FROM checkpoints \
                         WHERE thread_id = ?1 ORDER BY seq DESC LIMIT 1",
                        params![thread],
                        map_row,
                    )
                    .optional(),
            }
            .map_err(storage)?;
            Ok::<Option<StoredRow>, CheckpointError>(row)
        })
        .await
        .map_err(storage)??;

        let Some(row) = row else {
            return Ok(None);
        };
        let metadata = decode_metadata(&row.metadata)?;
        let checkpoint = Checkpoint {
            id: row.checkpoint_id,
            ts: row.ts,
            values: self.serializer.deserialize(&row.state)?,
            next: row.next,
            metadata: metadata.clone(),
        };
        Ok(Some((checkpoint, metadata)))
    }

    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
        before: Option<&str>,
        after: Option<&str>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let thread = thread_id(config)?.to_string();
        let db_path = self.db_path.clone();

        let rows = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            let mut stmt = conn
                .prepare(
                    "SELECT checkpoint_id, metadata FROM checkpoints \
                     WHERE thread_id = ?1 ORDER BY seq ASC",
                )
                .map_err(storage)?;
            let rows = stmt
                .query_map(params![thread], |r| {
                    Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
                })
                .map_err(storage)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(storage)?;
            Ok::<Vec<(String, String)>, CheckpointError>(rows)
        })
        .await
        .map_err(storage)??;

        let history = rows
            .into_iter()
            .map(|(checkpoint_id, metadata)| {
                Ok(CheckpointListItem {
                    checkpoint_id,
                    metadata: decode_metadata(&metadata)?,
                })
            })
            .collect::<Result<Vec<_>, CheckpointError>>()?;
        Ok(list_window(history, limit, before, after))
    }
}
