//! Memory: run config, checkpoints, checkpointers, session store.
//!
//! Aligns with the LangGraph checkpointer: a graph compiled with a checkpointer
//! saves the state after its input and after every node, keyed by `thread_id`,
//! and resumes from the latest checkpoint on the next run of that thread.

mod checkpoint;
mod checkpointer;
mod config;
mod memory_saver;
mod serializer;
mod session;
#[cfg(feature = "sqlite")]
mod sqlite_saver;

pub use checkpoint::{
    Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource, StateSnapshot,
};
pub use checkpointer::{CheckpointError, Checkpointer};
pub use config::RunnableConfig;
pub use memory_saver::MemorySaver;
pub use serializer::{JsonSerializer, Serializer};
pub use session::SessionStore;
#[cfg(feature = "sqlite")]
pub use sqlite_saver::SqliteSaver;
