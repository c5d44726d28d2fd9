use async_trait::async_trait;
use serde::Serialize;

use crate::api::AcademicService;
use crate::error::ApiError;
use crate::types::{AbsenceRecord, AbsenceSummary, Enrollment, SubjectAbsenceTotals};
use crate::views::ViewLoader;

/// Landing view: enrolled subjects, recent absences and the headline counts
pub struct DashboardView;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub enrollments: Vec<Enrollment>,
    pub absences: Vec<AbsenceRecord>,
    pub summary: AbsenceSummary,
    pub total_subjects: usize,
    pub subject_names: Vec<String>,
    pub totals: SubjectAbsenceTotals,
}

impl DashboardData {
    pub fn new(enrollments: Vec<Enrollment>, absences: Vec<AbsenceRecord>, summary: AbsenceSummary) -> Self {
        let subject_names = enrollments.iter().map(|e| e.subject.name.clone()).collect();
        Self {
            total_subjects: enrollments.len(),
            totals: summary.totals(),
            subject_names,
            enrollments,
            absences,
            summary,
        }
    }

    pub fn total_absences(&self) -> u32 {
        self.totals.absences
    }

    pub fn total_justified(&self) -> u32 {
        self.totals.justified
    }
}

#[async_trait]
impl ViewLoader for DashboardView {
    type Output = DashboardData;

    fn error_message(&self) -> &'static str {
        "Could not load the dashboard"
    }

    async fn load(&self, service: &dyn AcademicService, student_id: &str) -> Result<DashboardData, ApiError> {
        let (enrollments, absences, summary) = futures::try_join!(
            service.list_enrollments(student_id),
            service.list_absences(student_id),
            service.get_absence_summary(student_id),
        )?;
        Ok(DashboardData::new(enrollments, absences, summary))
    }
}
