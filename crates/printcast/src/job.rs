//! Background estimation with cancellation.
//!
//! Decoding a large mesh or a long toolpath is linear in its size and blocks
//! the calling thread. Interactive hosts run it through an [`EstimateJob`]
//! instead and cancel it when the user picks another file.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::warn;

use crate::kind::FileKind;
use crate::report::{ingest_cancellable, IngestOptions, Report};
use crate::{Error, Result};

/// Shared flag that asks a running job to stop.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// The underlying flag, as accepted by the `*_cancellable` functions.
    pub fn flag(&self) -> &AtomicBool {
        &self.0
    }
}

/// Ingestion running on a background thread.
#[derive(Debug)]
pub struct EstimateJob {
    handle: JoinHandle<Result<Report>>,
    token: CancellationToken,
}

impl EstimateJob {
    /// Start ingesting `bytes` on a new thread.
    pub fn spawn(kind: FileKind, bytes: Vec<u8>, options: IngestOptions) -> Self {
        Self::spawn_with_token(kind, bytes, options, CancellationToken::new())
    }

    /// Start ingesting with a caller-provided token.
    pub fn spawn_with_token(
        kind: FileKind,
        bytes: Vec<u8>,
        options: IngestOptions,
        token: CancellationToken,
    ) -> Self {
        let worker_token = token.clone();
        let handle =
            thread::spawn(move || ingest_cancellable(kind, &bytes, &options, worker_token.flag()));
        Self { handle, token }
    }

    /// Token controlling this job.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the worker thread has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the result.
    pub fn join(self) -> Result<Report> {
        self.handle.join().unwrap_or_else(|_| {
            warn!("estimate worker panicked");
            Err(Error::WorkerPanicked)
        })
    }
}
