//! Canonical entity shapes shared by the client, the stores and the views.
//!
//! Everything here has already been through `api::wire` normalization, so
//! downstream code never has to guess which field name the server used.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A student record, also the value persisted as the selected student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Enrollment number shown to people, distinct from `id`
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub semester: u32,
    #[serde(default)]
    pub gpa: f64,
    #[serde(default)]
    pub total_credits: u32,
    #[serde(default)]
    pub enrollment_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: Option<String>,
    pub code: String,
    pub name: String,
    pub instructor: Option<String>,
    pub credits: Option<u32>,
    pub location: Option<String>,
    pub schedule: Option<String>,
    pub semester: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: String,
    pub student_id: Option<String>,
    pub subject: Subject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsenceRecord {
    pub id: String,
    pub date: String,
    pub reason: Option<String>,
    pub comment: Option<String>,
    pub subject_id: Option<String>,
    pub subject_name: Option<String>,
}

impl AbsenceRecord {
    /// Text for the detail column: reason, else comment, else `-`
    pub fn detail(&self) -> &str {
        self.reason
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.comment.as_deref().filter(|s| !s.trim().is_empty()))
            .unwrap_or("-")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectAbsenceTotals {
    pub total: u32,
    pub absences: u32,
    pub justified: u32,
}

impl SubjectAbsenceTotals {
    pub fn add(self, other: SubjectAbsenceTotals) -> Self {
        Self {
            total: self.total.saturating_add(other.total),
            absences: self.absences.saturating_add(other.absences),
            justified: self.justified.saturating_add(other.justified),
        }
    }

    /// Share of sessions attended, 0 when nothing was recorded
    pub fn attendance_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let attended = self.total.saturating_sub(self.absences);
        f64::from(attended) / f64::from(self.total) * 100.0
    }
}

/// Subject bucket for absences whose subject name cannot be resolved
pub const NO_SUBJECT: &str = "no subject";

/// Per-subject absence aggregates keyed by subject name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbsenceSummary {
    pub by_subject: BTreeMap<String, SubjectAbsenceTotals>,
}

impl AbsenceSummary {
    /// Totals for one subject; subjects the summary does not know are all zero
    pub fn totals_for(&self, subject: &str) -> SubjectAbsenceTotals {
        self.by_subject.get(subject).copied().unwrap_or_default()
    }

    pub fn totals(&self) -> SubjectAbsenceTotals {
        self.by_subject
            .values()
            .fold(SubjectAbsenceTotals::default(), |acc, t| acc.add(*t))
    }
}

/// Body of `POST /absences/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAbsence {
    pub student_id: u64,
    pub subject_id: u64,
    /// Serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    pub reason: String,
    pub comment: String,
}

/// Partial update for `PUT /students/{id}/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<u32>,
}

impl StudentUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.major.is_none() && self.semester.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub detail: serde_json::Value,
}
