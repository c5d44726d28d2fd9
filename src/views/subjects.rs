use async_trait::async_trait;
use serde::Serialize;

use crate::api::AcademicService;
use crate::error::ApiError;
use crate::types::Enrollment;
use crate::views::ViewLoader;

/// Enrollment count above which the "at most 2 subjects" reminder shows
pub const MAX_ENROLLED_SUBJECTS: usize = 2;

/// Enrolled subjects of the selected student
pub struct SubjectsView;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectsData {
    pub enrollments: Vec<Enrollment>,
}

impl SubjectsData {
    /// Enrollments whose subject name or code contains `search`, ignoring case
    pub fn filter(&self, search: &str) -> Vec<&Enrollment> {
        let needle = search.trim().to_lowercase();
        self.enrollments
            .iter()
            .filter(|e| {
                needle.is_empty()
                    || e.subject.name.to_lowercase().contains(&needle)
                    || e.subject.code.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn over_enrollment_limit(&self) -> bool {
        self.enrollments.len() > MAX_ENROLLED_SUBJECTS
    }
}

#[async_trait]
impl ViewLoader for SubjectsView {
    type Output = SubjectsData;

    fn error_message(&self) -> &'static str {
        "Could not load enrolled subjects"
    }

    async fn load(&self, service: &dyn AcademicService, student_id: &str) -> Result<SubjectsData, ApiError> {
        let enrollments = service.list_enrollments(student_id).await?;
        Ok(SubjectsData { enrollments })
    }
}
