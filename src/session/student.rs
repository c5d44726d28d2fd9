use std::sync::Arc;
use tokio::sync::watch;

use crate::session::SessionError;
use crate::storage::{Storage, StorageError};
use crate::types::Student;

/// Durable storage slot holding the serialized selected student
pub const STUDENT_KEY: &str = "student";

/// The student every keyed view fetches for.
///
/// Each `select` publishes the new record; views subscribed through
/// [`SelectedStudentStore::subscribe`] treat that as a new fetch key.
pub struct SelectedStudentStore {
    storage: Arc<dyn Storage>,
    current: watch::Sender<Option<Student>>,
}

impl SelectedStudentStore {
    pub fn hydrate(storage: Arc<dyn Storage>) -> Result<Self, StorageError> {
        let current = match storage.load(STUDENT_KEY)? {
            Some(raw) => match serde_json::from_str::<Student>(&raw) {
                Ok(student) if !student.id.trim().is_empty() => Some(student),
                Ok(_) => {
                    tracing::warn!("Discarding stored student without an id");
                    discard(storage.as_ref());
                    None
                }
                Err(e) => {
                    tracing::warn!("Discarding unreadable stored student: {}", e);
                    discard(storage.as_ref());
                    None
                }
            },
            None => None,
        };

        let (current, _) = watch::channel(current);
        Ok(Self { storage, current })
    }

    pub fn select(&self, student: Student) -> Result<(), SessionError> {
        if student.id.trim().is_empty() {
            return Err(SessionError::MissingStudentId);
        }

        let raw = serde_json::to_string_pretty(&student).map_err(StorageError::from)?;
        self.storage.save(STUDENT_KEY, &raw)?;
        tracing::info!("Selected student {} ({})", student.id, student.name);
        self.current.send_replace(Some(student));
        Ok(())
    }

    /// Forget the selection. Memory is cleared even when storage fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        let removed = self.storage.remove(STUDENT_KEY);
        self.current.send_replace(None);
        removed
    }

    pub fn current(&self) -> Option<Student> {
        self.current.borrow().clone()
    }

    pub fn current_id(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|s| s.id.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Student>> {
        self.current.subscribe()
    }
}

/// Drop a bad stored record; a slot that cannot be removed must not block startup
fn discard(storage: &dyn Storage) {
    if let Err(e) = storage.remove(STUDENT_KEY) {
        tracing::warn!("Failed to remove discarded student record: {}", e);
    }
}
