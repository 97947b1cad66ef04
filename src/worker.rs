//! Background conversion.
//!
//! [`ConversionWorker`] runs one conversion at a time on Tokio's blocking
//! thread pool so an interactive front end stays responsive. Starting a job
//! returns a [`ConversionTask`] future for the typed result, and every state
//! change is also published on a `watch` channel as a [`ConversionStatus`].
//!
//! A worker never queues: a second [`start`](ConversionWorker::start) while
//! a job is in flight is rejected with [`ConversionError::Busy`]. Running
//! jobs cannot be cancelled.
//!
//! # Example
//!
//! ```no_run
//! use vidgif::{ConversionRequest, ConversionWorker, TargetParameters};
//!
//! # async fn example() -> Result<(), vidgif::ConversionError> {
//! let worker = ConversionWorker::default();
//! let mut status = worker.subscribe();
//!
//! let request = ConversionRequest::new("in.mov", "out.gif", TargetParameters::new(10.0, 480)?);
//! let task = worker.start(request)?;
//!
//! status.changed().await.ok();
//! println!("{}", *status.borrow());
//!
//! let report = task.await?;
//! println!("saved next to {:?}", worker.last_output_directory());
//! # Ok(())
//! # }
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    future::Future,
    path::PathBuf,
    pin::Pin,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    task::{Context, Poll},
};

use tokio::{sync::watch, task::JoinHandle};

use crate::{
    configuration::{ConversionRequest, TargetParameters},
    convert::{ConversionReport, Converter},
    error::ConversionError,
    source::FrameSource,
};

/// What the worker is doing, as shown to a user.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConversionStatus {
    /// No conversion has run yet.
    #[default]
    Idle,
    /// A conversion is running.
    Processing,
    /// The last conversion succeeded.
    Complete(ConversionReport),
    /// The last conversion failed with this message.
    Failed(String),
}

impl ConversionStatus {
    /// `true` once a job has either completed or failed.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            ConversionStatus::Complete(_) | ConversionStatus::Failed(_)
        )
    }
}

impl Display for ConversionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ConversionStatus::Idle => Ok(()),
            ConversionStatus::Processing => f.write_str("Processing... This may take a while."),
            ConversionStatus::Complete(_) => f.write_str("Conversion Complete"),
            ConversionStatus::Failed(message) => f.write_str(message),
        }
    }
}

/// Runs conversions on a background thread, one at a time.
#[derive(Debug)]
pub struct ConversionWorker {
    converter: Converter,
    busy: Arc<AtomicBool>,
    status: Arc<watch::Sender<ConversionStatus>>,
    last_output: Arc<Mutex<Option<PathBuf>>>,
}

impl Default for ConversionWorker {
    fn default() -> Self {
        Self::new(Converter::default())
    }
}

impl ConversionWorker {
    /// Create an idle worker that runs jobs with `converter`.
    pub fn new(converter: Converter) -> Self {
        let (status, _) = watch::channel(ConversionStatus::Idle);
        Self {
            converter,
            busy: Arc::new(AtomicBool::new(false)),
            status: Arc::new(status),
            last_output: Arc::new(Mutex::new(None)),
        }
    }

    /// Start converting `request` in the background.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`ConversionError::Busy`] if a job is already running.
    /// - [`ConversionError::WorkerFailed`] if there is no Tokio runtime.
    pub fn start(&self, request: ConversionRequest) -> Result<ConversionTask, ConversionError> {
        let converter = self.converter.clone();
        self.launch(move || converter.convert(&request))
    }

    /// Start converting frames from `source` in the background.
    ///
    /// # Errors
    ///
    /// As [`start`](ConversionWorker::start).
    pub fn start_source<S>(
        &self,
        mut source: S,
        output: PathBuf,
        target: TargetParameters,
    ) -> Result<ConversionTask, ConversionError>
    where
        S: FrameSource + Send + 'static,
    {
        let converter = self.converter.clone();
        self.launch(move || converter.convert_source(&mut source, &output, &target))
    }

    /// Receive status updates. The current status is available immediately.
    pub fn subscribe(&self) -> watch::Receiver<ConversionStatus> {
        self.status.subscribe()
    }

    /// Snapshot of the current status.
    pub fn status(&self) -> ConversionStatus {
        self.status.borrow().clone()
    }

    /// Whether a job is running. Cleared before the job's final status is
    /// published.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Output path of the most recent successful conversion.
    pub fn last_output(&self) -> Option<PathBuf> {
        self.last_output.lock().ok().and_then(|slot| slot.clone())
    }

    /// Directory containing the most recent successful output, for an
    /// "open containing folder" action.
    pub fn last_output_directory(&self) -> Option<PathBuf> {
        self.last_output().map(|path| match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        })
    }

    fn launch<F>(&self, job: F) -> Result<ConversionTask, ConversionError>
    where
        F: FnOnce() -> Result<ConversionReport, ConversionError> + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|error| ConversionError::WorkerFailed(error.to_string()))?;

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("Rejecting conversion: another conversion is in progress");
            return Err(ConversionError::Busy);
        }

        self.status.send_replace(ConversionStatus::Processing);

        let guard = BusyGuard(self.busy.clone());
        let status = self.status.clone();
        let last_output = self.last_output.clone();

        let handle = runtime.spawn_blocking(move || {
            // Busy is cleared before the outcome is published.
            let result = {
                let _guard = guard;
                job()
            };
            match &result {
                Ok(report) => {
                    if let Ok(mut slot) = last_output.lock() {
                        *slot = Some(report.output.clone());
                    }
                    status.send_replace(ConversionStatus::Complete(report.clone()));
                }
                Err(error) => {
                    log::error!("Conversion failed: {error}");
                    status.send_replace(ConversionStatus::Failed(error.to_string()));
                }
            }
            result
        });

        Ok(ConversionTask {
            handle,
            status: self.status.clone(),
        })
    }
}

/// Clears the busy flag when the job ends, including by panic.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A running conversion. Resolves to the conversion's result.
///
/// Dropping the task does not stop the conversion; it runs to completion
/// and its outcome is still published on the status channel.
pub struct ConversionTask {
    handle: JoinHandle<Result<ConversionReport, ConversionError>>,
    status: Arc<watch::Sender<ConversionStatus>>,
}

impl Future for ConversionTask {
    type Output = Result<ConversionReport, ConversionError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| {
            joined.unwrap_or_else(|error| {
                let error = ConversionError::WorkerFailed(error.to_string());
                self.status
                    .send_replace(ConversionStatus::Failed(error.to_string()));
                Err(error)
            })
        })
    }
}
