//! Batch anonymization pipeline
//!
//! [`Dispatcher`] walks a [`Batch`], sends every `sip` entry through the
//! configured [`Redact`] capability and hands back a batch with the same
//! length, order and metadata. A batch either comes back whole or fails with
//! a single error; no partially redacted batch ever leaves this crate.

use std::sync::Arc;

use siplog_core::{Batch, DispatchPolicy, Error, ExecutionStrategy, LogEntry, Result};
use siplog_security::Redact;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Produce the output entry for `entry`, which sits at `index` in its batch.
///
/// Candidates get their text replaced by the redactor's output; everything
/// else is returned untouched. `meta_info` and `entry_type` are always moved
/// over as they are.
pub fn process_entry(redactor: &dyn Redact, index: usize, entry: LogEntry) -> Result<LogEntry> {
    if !entry.is_redaction_candidate() {
        return Ok(entry);
    }

    let redacted = redactor
        .redact(entry.text.as_bytes())
        .map_err(|e| Error::RedactionFailure {
            index,
            reason: e.to_string(),
        })?;

    let text = String::from_utf8(redacted).map_err(|e| Error::RedactionFailure {
        index,
        reason: format!("redacted output is not valid UTF-8: {}", e),
    })?;

    Ok(LogEntry { text, ..entry })
}

pub struct Dispatcher {
    redactor: Arc<dyn Redact>,
    policy: DispatchPolicy,
}

impl Dispatcher {
    pub fn new(redactor: Arc<dyn Redact>, policy: DispatchPolicy) -> Self {
        Self { redactor, policy }
    }

    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    /// Anonymize a batch.
    ///
    /// Returns [`Error::Cancelled`] once `cancel` fires and
    /// [`Error::DeadlineExceeded`] when the policy deadline elapses first.
    /// Either way all outstanding per-entry work is abandoned.
    pub async fn anonymize(&self, batch: Batch, cancel: &CancellationToken) -> Result<Batch> {
        let Batch { entries, meta } = batch;
        let total = entries.len();

        debug!(
            strategy = %self.policy.strategy,
            entries = total,
            candidates = entries.iter().filter(|e| e.is_redaction_candidate()).count(),
            "Dispatching batch"
        );

        // Cancelled on every exit path, stops a detached sequential loop.
        let token = cancel.child_token();
        let _guard = token.clone().drop_guard();

        let run = async {
            match self.policy.strategy {
                ExecutionStrategy::Sequential => self.run_sequential(entries, token.clone()).await,
                ExecutionStrategy::FanOut => self.run_fan_out(entries, token.clone()).await,
            }
        };

        let bounded = async {
            match self.policy.deadline() {
                Some(deadline) => match tokio::time::timeout(deadline, run).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::DeadlineExceeded(deadline)),
                },
                None => run.await,
            }
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            result = bounded => result,
        };

        match result {
            Ok(entries) => {
                debug!(entries = entries.len(), "Batch anonymized");
                Ok(Batch { entries, meta })
            }
            Err(e) => {
                warn!(entries = total, error = %e, "Batch anonymization failed");
                Err(e)
            }
        }
    }

    async fn run_sequential(
        &self,
        entries: Vec<LogEntry>,
        token: CancellationToken,
    ) -> Result<Vec<LogEntry>> {
        if entries.is_empty() {
            return Ok(entries);
        }

        let redactor = Arc::clone(&self.redactor);
        tokio::task::spawn_blocking(move || {
            let mut results = Vec::with_capacity(entries.len());
            for (index, entry) in entries.into_iter().enumerate() {
                if token.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                results.push(process_entry(redactor.as_ref(), index, entry)?);
            }
            Ok(results)
        })
        .await
        .map_err(|e| Error::Internal(format!("sequential redaction worker failed: {}", e)))?
    }

    async fn run_fan_out(
        &self,
        entries: Vec<LogEntry>,
        token: CancellationToken,
    ) -> Result<Vec<LogEntry>> {
        let total = entries.len();
        let permits = Arc::new(Semaphore::new(self.policy.effective_max_in_flight()));
        let mut units = JoinSet::new();

        // Slots are owned here, so an abandoned unit has nowhere to write.
        // Returning early drops `units`, which aborts whatever is still running.
        let mut slots: Vec<Option<LogEntry>> = vec![None; total];

        for (index, entry) in entries.into_iter().enumerate() {
            // A unit is only spawned once it holds a permit, so at most
            // `max_in_flight` units exist at any time.
            let permit = loop {
                tokio::select! {
                    biased;
                    Some(joined) = units.join_next() => store(&mut slots, joined)?,
                    permit = Arc::clone(&permits).acquire_owned() => {
                        break permit.map_err(|_| Error::Cancelled)?;
                    }
                }
            };
            if token.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let redactor = Arc::clone(&self.redactor);
            units.spawn(async move {
                let _permit = permit;
                let entry = tokio::task::spawn_blocking(move || {
                    process_entry(redactor.as_ref(), index, entry)
                })
                .await
                .map_err(|e| Error::Internal(format!("redaction worker for entry {} failed: {}", index, e)))??;

                Ok((index, entry))
            });
        }

        while let Some(joined) = units.join_next().await {
            store(&mut slots, joined)?;
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| Error::Internal(format!("no result for entry {}", index)))
            })
            .collect()
    }
}

fn store(
    slots: &mut [Option<LogEntry>],
    joined: std::result::Result<Result<(usize, LogEntry)>, JoinError>,
) -> Result<()> {
    let (index, entry) =
        joined.map_err(|e| Error::Internal(format!("redaction task failed: {}", e)))??;
    slots[index] = Some(entry);
    Ok(())
}
