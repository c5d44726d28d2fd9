use std::sync::Arc;

use thiserror::Error;

use crate::api::AcademicService;
use crate::error::ApiError;
use crate::session::{Session, SessionError};
use crate::types::Student;

#[derive(Debug, Error)]
pub enum SelectError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Student picker. Not keyed on the selected student; it lists everyone.
pub struct StudentRoster {
    service: Arc<dyn AcademicService>,
}

impl StudentRoster {
    pub fn new(service: Arc<dyn AcademicService>) -> Self {
        Self { service }
    }

    pub async fn load(&self) -> Result<Vec<Student>, ApiError> {
        self.service.list_students().await
    }

    /// Students whose name or student number contains `search`, ignoring case
    pub fn filter<'a>(students: &'a [Student], search: &str) -> Vec<&'a Student> {
        let needle = search.trim().to_lowercase();
        students
            .iter()
            .filter(|s| {
                needle.is_empty()
                    || s.name.to_lowercase().contains(&needle)
                    || s.student_id.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Fetch the full record for `student_id` and make it the selected student
    pub async fn select(&self, session: &Session, student_id: &str) -> Result<Student, SelectError> {
        let student = self.service.get_student(student_id).await?;
        session.select_student(student.clone())?;
        Ok(student)
    }
}
