pub mod credential;
pub mod guard;
pub mod navigation;
pub mod student;

use std::sync::Arc;

pub use credential::{CredentialStore, CREDENTIAL_KEY};
pub use guard::{Access, AccessGuard, Guarded};
pub use navigation::{Navigator, Route};
pub use student::{SelectedStudentStore, STUDENT_KEY};

use crate::storage::{Storage, StorageError};
use crate::types::Student;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("API key must not be empty")]
    EmptyCredential,
    #[error("Student record has no id")]
    MissingStudentId,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Why the session was torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    Logout,
    /// The service answered 401 to a request carrying our credential
    Unauthorized,
}

/// Process-wide session state: credential, selected student and active route.
///
/// Built once from durable storage and shared by `Arc` with the service
/// client and the front end. Logout and the client's 401 hook both end up in
/// [`Session::invalidate`].
pub struct Session {
    credentials: CredentialStore,
    student: SelectedStudentStore,
    navigator: Navigator,
}

impl Session {
    pub fn hydrate(storage: Arc<dyn Storage>) -> Result<Self, StorageError> {
        let credentials = CredentialStore::hydrate(storage.clone())?;
        let student = SelectedStudentStore::hydrate(storage)?;

        let initial = match (credentials.is_present(), student.current_id()) {
            (false, _) => Route::Login,
            (true, None) => Route::SelectStudent,
            (true, Some(_)) => Route::Dashboard,
        };

        Ok(Self {
            credentials,
            student,
            navigator: Navigator::new(initial),
        })
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn student(&self) -> &SelectedStudentStore {
        &self.student
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_present()
    }

    pub fn login(&self, token: &str) -> Result<(), SessionError> {
        self.credentials.save(token)?;
        tracing::info!("Credential saved");
        self.navigator.navigate(Route::SelectStudent);
        Ok(())
    }

    pub fn select_student(&self, student: Student) -> Result<(), SessionError> {
        self.student.select(student)?;
        self.navigator.navigate(Route::Dashboard);
        Ok(())
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.invalidate(InvalidationReason::Logout)
    }

    /// Clear credential and selected student, then show the login view.
    ///
    /// Both clears always run; the first storage failure is reported after
    /// the route has already moved to login.
    pub fn invalidate(&self, reason: InvalidationReason) -> Result<(), SessionError> {
        let credential = self.credentials.clear();
        let student = self.student.clear();
        self.navigator.navigate(Route::Login);

        match reason {
            InvalidationReason::Logout => tracing::info!("Session closed by logout"),
            InvalidationReason::Unauthorized => tracing::warn!("Session invalidated: credential rejected by service"),
        }

        if let Err(e) = &credential {
            tracing::warn!("Failed to remove stored credential: {}", e);
        }
        if let Err(e) = &student {
            tracing::warn!("Failed to remove stored student: {}", e);
        }

        credential.and(student).map_err(SessionError::from)
    }
}
