use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::AcademicService;
use crate::error::ApiError;
use crate::types::Student;
use crate::views::{ViewError, ViewLoader, ViewState};

/// Identifies one fetch batch: the student it was issued for and the
/// generation that was active when it started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    student_id: String,
    generation: u64,
}

struct Inner<T> {
    active: Option<String>,
    generation: u64,
    state: ViewState<T>,
}

/// Idle / Loading / Error / Ready state machine for one view instance.
///
/// Every change of key (or retry) bumps the generation and hands out a
/// [`FetchTicket`]. Results are only applied when their ticket still
/// matches; anything older is dropped, so a slow response for a previous
/// student can never overwrite the current one. Selecting a new student
/// clears the previous data immediately.
pub struct ViewOrchestrator<L: ViewLoader> {
    loader: L,
    service: Arc<dyn AcademicService>,
    inner: Mutex<Inner<L::Output>>,
}

impl<L: ViewLoader> ViewOrchestrator<L> {
    pub fn new(loader: L, service: Arc<dyn AcademicService>) -> Self {
        Self {
            loader,
            service,
            inner: Mutex::new(Inner {
                active: None,
                generation: 0,
                state: ViewState::Idle,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<L::Output>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ViewState<L::Output> {
        self.lock().state.clone()
    }

    pub fn active_student(&self) -> Option<String> {
        self.lock().active.clone()
    }

    /// Point the view at `selected`.
    ///
    /// Returns a ticket when a fetch must be issued. Re-selecting the student
    /// already active is a no-op; use [`ViewOrchestrator::begin_retry`] to
    /// refetch.
    pub fn begin(&self, selected: Option<&Student>) -> Option<FetchTicket> {
        let mut inner = self.lock();
        let key = selected.map(|s| s.id.trim()).filter(|id| !id.is_empty());

        match key {
            None => {
                if inner.active.take().is_some() {
                    tracing::debug!("View reset to idle");
                }
                inner.generation += 1;
                inner.state = ViewState::Idle;
                None
            }
            Some(key) if inner.active.as_deref() == Some(key) => None,
            Some(key) => Some(Self::start(&mut inner, key.to_string())),
        }
    }

    /// Re-issue the batch for the active student, if any
    pub fn begin_retry(&self) -> Option<FetchTicket> {
        let mut inner = self.lock();
        let key = inner.active.clone()?;
        Some(Self::start(&mut inner, key))
    }

    fn start(inner: &mut Inner<L::Output>, key: String) -> FetchTicket {
        inner.generation += 1;
        inner.active = Some(key.clone());
        inner.state = ViewState::Loading;
        FetchTicket {
            student_id: key,
            generation: inner.generation,
        }
    }

    /// Apply a batch result. Returns `false` when the ticket was superseded
    /// and the result was discarded.
    pub fn complete(&self, ticket: &FetchTicket, result: Result<L::Output, ApiError>) -> bool {
        let mut inner = self.lock();
        if inner.generation != ticket.generation || inner.active.as_deref() != Some(ticket.student_id.as_str()) {
            tracing::debug!(
                "Discarding stale result for student {} (generation {} superseded by {})",
                ticket.student_id,
                ticket.generation,
                inner.generation
            );
            return false;
        }

        inner.state = match result {
            Ok(data) => ViewState::Ready(data),
            Err(e) if e.is_unauthorized() => {
                // the client already invalidated the session; nothing to show here
                inner.active = None;
                ViewState::Idle
            }
            Err(e) => {
                tracing::debug!("View load for student {} failed: {}", ticket.student_id, e);
                ViewState::Error(ViewError {
                    message: self.loader.error_message().to_string(),
                    code: e.error_code(),
                })
            }
        };
        true
    }

    /// Run the loader for `ticket` and apply the result
    pub async fn run(&self, ticket: FetchTicket) -> bool {
        let result = self.loader.load(self.service.as_ref(), &ticket.student_id).await;
        self.complete(&ticket, result)
    }

    /// Bring the view in line with `selected` and return the resulting state
    pub async fn sync(&self, selected: Option<&Student>) -> ViewState<L::Output> {
        if let Some(ticket) = self.begin(selected) {
            self.run(ticket).await;
        }
        self.state()
    }

    pub async fn retry(&self) -> ViewState<L::Output> {
        if let Some(ticket) = self.begin_retry() {
            self.run(ticket).await;
        }
        self.state()
    }

    /// Follow a selected-student channel, starting a fetch on every change.
    ///
    /// Fetches run as their own tasks so a new selection never waits for the
    /// previous one; the task ends when the channel's sender is dropped.
    pub fn follow(self: Arc<Self>, mut selected: watch::Receiver<Option<Student>>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let current = selected.borrow_and_update().clone();
                if let Some(ticket) = self.begin(current.as_ref()) {
                    let view = Arc::clone(&self);
                    tokio::spawn(async move {
                        view.run(ticket).await;
                    });
                }
                if selected.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}
