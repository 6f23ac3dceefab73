// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batched transcript writer.
//!
//! Lines accumulate in memory and flush either when the buffer fills or on
//! a periodic tick. Flush failures are logged and the batch is dropped;
//! transcripts are best-effort like the rest of the relay surface.

use std::sync::Arc;

use huddle_core::traits::MessageStore;
use huddle_core::types::TranscriptLine;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct TranscriptWriter {
    store: Arc<dyn MessageStore>,
    buffer: Mutex<Vec<TranscriptLine>>,
    buffer_max: usize,
}

impl TranscriptWriter {
    pub fn new(store: Arc<dyn MessageStore>, buffer_max: usize) -> Self {
        Self {
            store,
            buffer: Mutex::new(Vec::new()),
            buffer_max: buffer_max.max(1),
        }
    }

    /// Buffers one line, flushing if the buffer reached its cap.
    pub async fn submit(&self, line: TranscriptLine) {
        let full = {
            let mut buffer = self.buffer.lock().await;
            buffer.push(line);
            buffer.len() >= self.buffer_max
        };
        if full {
            self.flush().await;
        }
    }

    /// Writes out everything currently buffered.
    pub async fn flush(&self) {
        let batch = {
            let mut buffer = self.buffer.lock().await;
            std::mem::take(&mut *buffer)
        };
        if batch.is_empty() {
            return;
        }
        let count = batch.len();
        if let Err(e) = self.store.append_transcripts(&batch).await {
            warn!(error = %e, count, "transcript flush failed, batch dropped");
        } else {
            debug!(count, "flushed transcript batch");
        }
    }

    /// Spawns the periodic flusher. A final flush runs on cancellation.
    pub fn spawn_flusher(
        self: &Arc<Self>,
        interval_secs: u64,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let writer = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick =
                tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = tick.tick() => writer.flush().await,
                    _ = cancel.cancelled() => {
                        writer.flush().await;
                        break;
                    }
                }
            }
        })
    }
}
