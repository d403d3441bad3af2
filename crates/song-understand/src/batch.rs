//! Batch conversion.
//!
//! Songs are independent, so a batch fans out over the blocking thread
//! pool with a bound on how many run at once. Each song gets a wall clock
//! budget; a song over budget is reported as rejected with "timed out"
//! rather than failing the batch. Results come back in input order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::types::{RejectionReason, Song, SongInput};
use crate::SongConverter;

/// What happened to one song of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchOutcome {
    Accepted(Song),
    /// Turned away by the quality gate, or out of time. A timed-out song
    /// has no record.
    Rejected {
        identifier: String,
        reasons: Vec<RejectionReason>,
        song: Option<Song>,
    },
    /// Structural problem, e.g. no usable track.
    Failed { identifier: String, error: String },
}

impl BatchOutcome {
    pub fn identifier(&self) -> &str {
        match self {
            BatchOutcome::Accepted(song) => &song.identifier,
            BatchOutcome::Rejected { identifier, .. } | BatchOutcome::Failed { identifier, .. } => {
                identifier
            }
        }
    }

    fn from_song(song: Song) -> Self {
        if song.is_accepted() {
            BatchOutcome::Accepted(song)
        } else {
            BatchOutcome::Rejected {
                identifier: song.identifier.clone(),
                reasons: song.quality.reasons().to_vec(),
                song: Some(song),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    /// Position of the song in the submitted batch
    pub index: usize,
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub failed: usize,
}

pub fn summarize(entries: &[BatchEntry]) -> BatchSummary {
    let mut summary = BatchSummary {
        total: entries.len(),
        ..BatchSummary::default()
    };
    for entry in entries {
        match entry.outcome {
            BatchOutcome::Accepted(_) => summary.accepted += 1,
            BatchOutcome::Rejected { .. } => summary.rejected += 1,
            BatchOutcome::Failed { .. } => summary.failed += 1,
        }
    }
    summary
}

/// Convert every song, at most `batch.max_concurrent` at a time.
pub async fn convert_batch(
    converter: Arc<SongConverter>,
    inputs: Vec<SongInput>,
) -> Vec<BatchEntry> {
    let batch = &converter.config().batch;
    let permits = Arc::new(Semaphore::new(batch.max_concurrent.max(1)));
    let budget = Duration::from_millis(batch.song_timeout_ms);

    let mut tasks = JoinSet::new();
    let mut pending = HashMap::with_capacity(inputs.len());
    for (index, input) in inputs.into_iter().enumerate() {
        let converter = Arc::clone(&converter);
        let permits = Arc::clone(&permits);
        let label = (index, input.identifier.clone());
        let handle = tasks.spawn(async move {
            // the semaphore is never closed
            let _permit = permits.acquire_owned().await.ok();
            let identifier = input.identifier.clone();

            let outcome = match timeout(
                budget,
                tokio::task::spawn_blocking(move || converter.convert(&input)),
            )
            .await
            {
                Ok(Ok(Ok(song))) => BatchOutcome::from_song(song),
                Ok(Ok(Err(e))) => {
                    warn!(identifier = %identifier, error = %e, "song conversion failed");
                    BatchOutcome::Failed {
                        identifier,
                        error: e.to_string(),
                    }
                }
                Ok(Err(join_err)) => {
                    warn!(identifier = %identifier, error = %join_err, "song conversion panicked");
                    BatchOutcome::Failed {
                        identifier,
                        error: format!("conversion task panicked: {join_err}"),
                    }
                }
                Err(_) => {
                    warn!(
                        identifier = %identifier,
                        timeout_ms = budget.as_millis() as u64,
                        "song conversion timed out"
                    );
                    BatchOutcome::Rejected {
                        identifier,
                        reasons: vec![RejectionReason::TimedOut],
                        song: None,
                    }
                }
            };

            BatchEntry { index, outcome }
        });
        pending.insert(handle.id(), label);
    }

    let entries = collect_entries(tasks, pending).await;

    let summary = summarize(&entries);
    info!(
        total = summary.total,
        accepted = summary.accepted,
        rejected = summary.rejected,
        failed = summary.failed,
        "batch complete"
    );
    entries
}

/// Drain the join set into input order.
///
/// `pending` maps each task to its song's index and identifier, so a
/// task that panics or is cancelled still yields a `Failed` entry.
async fn collect_entries(
    mut tasks: JoinSet<BatchEntry>,
    mut pending: HashMap<Id, (usize, String)>,
) -> Vec<BatchEntry> {
    let mut entries = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((id, entry)) => {
                pending.remove(&id);
                entries.push(entry);
            }
            Err(e) => {
                let Some((index, identifier)) = pending.remove(&e.id()) else {
                    warn!(error = %e, "unknown batch task did not complete");
                    continue;
                };
                warn!(identifier = %identifier, error = %e, "batch task did not complete");
                entries.push(BatchEntry {
                    index,
                    outcome: BatchOutcome::Failed {
                        identifier,
                        error: format!("batch task did not complete: {e}"),
                    },
                });
            }
        }
    }
    entries.sort_by_key(|e| e.index);
    entries
}
