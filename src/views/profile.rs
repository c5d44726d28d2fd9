use async_trait::async_trait;
use serde::Serialize;

use crate::api::AcademicService;
use crate::error::ApiError;
use crate::types::{Enrollment, Student};
use crate::views::ViewLoader;

/// Full student record, fetched fresh, next to the current enrollments
pub struct ProfileView;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileData {
    pub student: Student,
    pub enrollments: Vec<Enrollment>,
    pub enrolled_credits: u32,
}

#[async_trait]
impl ViewLoader for ProfileView {
    type Output = ProfileData;

    fn error_message(&self) -> &'static str {
        "Could not load the student profile"
    }

    async fn load(&self, service: &dyn AcademicService, student_id: &str) -> Result<ProfileData, ApiError> {
        let (student, enrollments) = futures::try_join!(
            service.get_student(student_id),
            service.list_enrollments(student_id),
        )?;
        let enrolled_credits = enrollments.iter().filter_map(|e| e.subject.credits).sum();
        Ok(ProfileData {
            student,
            enrollments,
            enrolled_credits,
        })
    }
}
