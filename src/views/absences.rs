use async_trait::async_trait;
use serde::Serialize;

use crate::api::AcademicService;
use crate::error::ApiError;
use crate::types::{AbsenceRecord, AbsenceSummary, SubjectAbsenceTotals};
use crate::views::ViewLoader;

pub use crate::types::NO_SUBJECT;

/// Records of one subject joined with that subject's summary totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbsenceGroup {
    pub subject: String,
    pub records: Vec<AbsenceRecord>,
    /// From the summary; zero when the summary does not list the subject
    pub totals: SubjectAbsenceTotals,
}

/// Group records by subject name, in order of first appearance.
///
/// Nothing is dropped: unnamed records land in [`NO_SUBJECT`].
pub fn group_by_subject(records: &[AbsenceRecord]) -> Vec<(String, Vec<AbsenceRecord>)> {
    let mut groups: Vec<(String, Vec<AbsenceRecord>)> = Vec::new();
    for record in records {
        let name = record
            .subject_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(NO_SUBJECT);

        match groups.iter_mut().find(|(subject, _)| subject == name) {
            Some((_, bucket)) => bucket.push(record.clone()),
            None => groups.push((name.to_string(), vec![record.clone()])),
        }
    }
    groups
}

/// Join grouped records with the summary; the summary stays authoritative
/// for counts, the records for per-row detail
pub fn join_with_summary(records: &[AbsenceRecord], summary: &AbsenceSummary) -> Vec<AbsenceGroup> {
    group_by_subject(records)
        .into_iter()
        .map(|(subject, records)| AbsenceGroup {
            totals: summary.totals_for(&subject),
            subject,
            records,
        })
        .collect()
}

/// Absence table: records grouped by subject plus summary totals
pub struct AbsencesView;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbsencesData {
    pub groups: Vec<AbsenceGroup>,
    pub total_records: usize,
    pub summary: AbsenceSummary,
    pub summary_totals: SubjectAbsenceTotals,
}

impl AbsencesData {
    pub fn new(records: Vec<AbsenceRecord>, summary: AbsenceSummary) -> Self {
        Self {
            groups: join_with_summary(&records, &summary),
            total_records: records.len(),
            summary_totals: summary.totals(),
            summary,
        }
    }

    /// Subject names available to filter on
    pub fn subject_options(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.subject.as_str()).collect()
    }

    /// Groups whose subject contains `search` (ignoring case) and, when
    /// given, equals `subject` exactly
    pub fn filtered(&self, search: &str, subject: Option<&str>) -> Vec<&AbsenceGroup> {
        let needle = search.trim().to_lowercase();
        self.groups
            .iter()
            .filter(|g| needle.is_empty() || g.subject.to_lowercase().contains(&needle))
            .filter(|g| subject.map_or(true, |s| g.subject == s))
            .collect()
    }
}

#[async_trait]
impl ViewLoader for AbsencesView {
    type Output = AbsencesData;

    fn error_message(&self) -> &'static str {
        "Could not load absences"
    }

    async fn load(&self, service: &dyn AcademicService, student_id: &str) -> Result<AbsencesData, ApiError> {
        let (records, summary) = futures::try_join!(
            service.list_absences(student_id),
            service.get_absence_summary(student_id),
        )?;
        Ok(AbsencesData::new(records, summary))
    }
}

/// Absence summary cards: per-subject totals and attendance rate
pub struct AbsenceSummaryView;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbsenceSummaryData {
    pub summary: AbsenceSummary,
    pub totals: SubjectAbsenceTotals,
    pub attendance_rate: f64,
}

impl From<AbsenceSummary> for AbsenceSummaryData {
    fn from(summary: AbsenceSummary) -> Self {
        let totals = summary.totals();
        Self {
            attendance_rate: totals.attendance_rate(),
            totals,
            summary,
        }
    }
}

#[async_trait]
impl ViewLoader for AbsenceSummaryView {
    type Output = AbsenceSummaryData;

    fn error_message(&self) -> &'static str {
        "Could not load the attendance summary"
    }

    async fn load(&self, service: &dyn AcademicService, student_id: &str) -> Result<AbsenceSummaryData, ApiError> {
        Ok(service.get_absence_summary(student_id).await?.into())
    }
}
