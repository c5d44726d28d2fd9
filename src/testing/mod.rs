use std::collections::HashMap;
use std::io;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::api::AcademicService;
use crate::error::ApiError;
use crate::storage::{MemoryStorage, Storage, StorageError};
use crate::types::{AbsenceRecord, AbsenceSummary, Enrollment, Student, Subject, SubjectAbsenceTotals};

/// Test builders for the canonical entities
pub fn student(id: &str, name: &str) -> Student {
    Student {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.edu", name.to_lowercase().replace(' ', ".")),
        student_id: format!("S-{}", id),
        major: "Mathematics".to_string(),
        semester: 3,
        gpa: 3.5,
        total_credits: 48,
        enrollment_date: Some("2023-08-01".to_string()),
    }
}

pub fn enrollment(id: &str, subject_name: &str, code: &str) -> Enrollment {
    Enrollment {
        id: id.to_string(),
        student_id: None,
        subject: Subject {
            id: Some(id.to_string()),
            code: code.to_string(),
            name: subject_name.to_string(),
            ..Subject::default()
        },
    }
}

pub fn absence(id: &str, subject_name: &str, date: &str) -> AbsenceRecord {
    AbsenceRecord {
        id: id.to_string(),
        date: date.to_string(),
        reason: None,
        comment: None,
        subject_id: None,
        subject_name: (!subject_name.is_empty()).then(|| subject_name.to_string()),
    }
}

pub fn summary(entries: &[(&str, u32, u32, u32)]) -> AbsenceSummary {
    let mut summary = AbsenceSummary::default();
    for (name, total, absences, justified) in entries {
        summary.by_subject.insert(
            name.to_string(),
            SubjectAbsenceTotals { total: *total, absences: *absences, justified: *justified },
        );
    }
    summary
}

/// Storage whose `remove` fails for one key
pub struct FailingStorage {
    inner: MemoryStorage,
    failing_key: String,
}

impl FailingStorage {
    pub fn failing_remove(key: &str) -> Self {
        Self {
            inner: MemoryStorage::new(),
            failing_key: key.to_string(),
        }
    }

    pub fn inner(&self) -> &MemoryStorage {
        &self.inner
    }
}

impl Storage for FailingStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.save(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if key == self.failing_key {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only slot").into());
        }
        self.inner.remove(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Students,
    Student,
    Enrollments,
    Absences,
    Summary,
}

/// Everything the fake serves for one student
#[derive(Debug, Clone)]
pub struct StudentFixture {
    pub student: Student,
    pub enrollments: Vec<Enrollment>,
    pub absences: Vec<AbsenceRecord>,
    pub summary: AbsenceSummary,
}

impl StudentFixture {
    pub fn new(student: Student) -> Self {
        Self {
            student,
            enrollments: Vec::new(),
            absences: Vec::new(),
            summary: AbsenceSummary::default(),
        }
    }
}

/// In-memory academic service with failure injection and gated responses.
///
/// A gated student id holds every fetch for that id until the gate opens,
/// which lets tests resolve fetches in whatever order they need.
#[derive(Default)]
pub struct FakeAcademicService {
    fixtures: Mutex<HashMap<String, StudentFixture>>,
    failures: Mutex<HashMap<(String, Endpoint), ApiError>>,
    gates: Mutex<HashMap<String, watch::Receiver<bool>>>,
    calls: Mutex<Vec<(Endpoint, String)>>,
}

pub struct Gate(watch::Sender<bool>);

impl Gate {
    pub fn open(&self) {
        self.0.send_replace(true);
    }
}

impl FakeAcademicService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixture(self, fixture: StudentFixture) -> Self {
        lock(&self.fixtures).insert(fixture.student.id.clone(), fixture);
        self
    }

    pub fn fail(&self, student_id: &str, endpoint: Endpoint, error: ApiError) {
        lock(&self.failures).insert((student_id.to_string(), endpoint), error);
    }

    pub fn heal(&self, student_id: &str, endpoint: Endpoint) {
        lock(&self.failures).remove(&(student_id.to_string(), endpoint));
    }

    pub fn gate(&self, student_id: &str) -> Gate {
        let (tx, rx) = watch::channel(false);
        lock(&self.gates).insert(student_id.to_string(), rx);
        Gate(tx)
    }

    pub fn calls(&self) -> Vec<(Endpoint, String)> {
        lock(&self.calls).clone()
    }

    async fn serve<T>(
        &self,
        endpoint: Endpoint,
        student_id: &str,
        pick: impl FnOnce(&StudentFixture) -> T,
    ) -> Result<T, ApiError> {
        lock(&self.calls).push((endpoint, student_id.to_string()));

        let gate = lock(&self.gates).get(student_id).cloned();
        if let Some(mut gate) = gate {
            // a dropped gate counts as open
            let _ = gate.wait_for(|open| *open).await;
        }

        if let Some(error) = lock(&self.failures).get(&(student_id.to_string(), endpoint)) {
            return Err(error.clone());
        }

        lock(&self.fixtures)
            .get(student_id)
            .map(pick)
            .ok_or_else(|| ApiError::NotFound(format!("student {}", student_id)))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl AcademicService for FakeAcademicService {
    async fn list_students(&self) -> Result<Vec<Student>, ApiError> {
        lock(&self.calls).push((Endpoint::Students, String::new()));
        if let Some(error) = lock(&self.failures).get(&(String::new(), Endpoint::Students)) {
            return Err(error.clone());
        }
        let mut students: Vec<Student> = lock(&self.fixtures).values().map(|f| f.student.clone()).collect();
        students.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(students)
    }

    async fn get_student(&self, student_id: &str) -> Result<Student, ApiError> {
        self.serve(Endpoint::Student, student_id, |f| f.student.clone()).await
    }

    async fn list_enrollments(&self, student_id: &str) -> Result<Vec<Enrollment>, ApiError> {
        self.serve(Endpoint::Enrollments, student_id, |f| f.enrollments.clone()).await
    }

    async fn list_absences(&self, student_id: &str) -> Result<Vec<AbsenceRecord>, ApiError> {
        self.serve(Endpoint::Absences, student_id, |f| f.absences.clone()).await
    }

    async fn get_absence_summary(&self, student_id: &str) -> Result<AbsenceSummary, ApiError> {
        self.serve(Endpoint::Summary, student_id, |f| f.summary.clone()).await
    }
}
