//! Student-keyed views and the orchestrator that keeps them consistent with
//! the selected student.

pub mod absences;
pub mod dashboard;
pub mod orchestrator;
pub mod profile;
pub mod roster;
pub mod subjects;

use async_trait::async_trait;
use serde::Serialize;

use crate::api::AcademicService;
use crate::error::ApiError;

pub use absences::{AbsenceSummaryView, AbsencesView};
pub use dashboard::DashboardView;
pub use orchestrator::{FetchTicket, ViewOrchestrator};
pub use profile::ProfileView;
pub use roster::StudentRoster;
pub use subjects::SubjectsView;

/// What a view shows at any moment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ViewState<T> {
    /// No student selected; nothing fetched
    Idle,
    Loading,
    Error(ViewError),
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_ready(self) -> Option<T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }
}

/// Generic per-view failure; the kind is kept for logs and JSON output only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewError {
    pub message: String,
    pub code: &'static str,
}

/// Fetch-and-aggregate step of one view, run for a single student id.
///
/// Implementations issue their fetches concurrently and fail the whole batch
/// if any of them fails.
#[async_trait]
pub trait ViewLoader: Send + Sync + 'static {
    type Output: Clone + Send + Sync + 'static;

    /// Message shown when the batch fails, e.g. "Could not load the dashboard"
    fn error_message(&self) -> &'static str;

    async fn load(&self, service: &dyn AcademicService, student_id: &str) -> Result<Self::Output, ApiError>;
}
