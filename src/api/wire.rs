//! Normalization of academic service payloads.
//!
//! The service is not consistent about shapes: a subject may arrive flat
//! (`subject_name`, `subject_code`) or nested (`subject.name`), ids may be
//! numbers or strings, students come in camelCase or snake_case, and the
//! absence summary is either a map keyed by subject or a list. Everything is
//! folded into `crate::types` here and nowhere else.

use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::types::{
    AbsenceRecord, AbsenceSummary, Enrollment, HealthStatus, Student, Subject, SubjectAbsenceTotals, NO_SUBJECT,
};

/// Field lookup over a JSON object with alias fallbacks
#[derive(Clone, Copy)]
struct Fields<'a>(&'a Map<String, Value>);

impl<'a> Fields<'a> {
    fn of(value: &'a Value) -> Option<Self> {
        value.as_object().map(Fields)
    }

    /// First alias present with a non-null value
    fn value(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find(|v| !v.is_null())
    }

    fn string(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find_map(scalar_string)
    }

    fn number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find_map(scalar_number)
    }

    fn count(&self, keys: &[&str]) -> Option<u32> {
        self.number(keys)
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n.round().min(f64::from(u32::MAX)) as u32)
    }

    fn nested(&self, key: &str) -> Option<Fields<'a>> {
        self.0.get(key).and_then(Fields::of)
    }
}

/// Non-empty string or number rendered as a string
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn scalar_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Collections arrive bare or wrapped in `results`/`data`/`items`
fn list_items(value: &Value) -> Result<&[Value], ApiError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(&[]),
        Value::Object(map) => ["results", "data", "items"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(|items| items.as_slice())
            .ok_or_else(|| ApiError::InvalidResponse("expected a list".to_string())),
        _ => Err(ApiError::InvalidResponse("expected a list".to_string())),
    }
}

fn object<'a>(value: &'a Value, what: &str) -> Result<Fields<'a>, ApiError> {
    Fields::of(value).ok_or_else(|| ApiError::InvalidResponse(format!("{} is not an object", what)))
}

pub fn student(value: &Value) -> Result<Student, ApiError> {
    let f = object(value, "student")?;
    let id = f
        .string(&["id", "pk"])
        .ok_or_else(|| ApiError::InvalidResponse("student without id".to_string()))?;

    let name = f.string(&["name", "full_name", "fullName"]).unwrap_or_else(|| {
        let first = f.string(&["first_name", "firstName"]).unwrap_or_default();
        let last = f.string(&["last_name", "lastName"]).unwrap_or_default();
        format!("{} {}", first, last).trim().to_string()
    });

    Ok(Student {
        id,
        name,
        email: f.string(&["email"]).unwrap_or_default(),
        student_id: f
            .string(&["studentId", "student_id", "student_number", "enrollment_number"])
            .unwrap_or_default(),
        major: f.string(&["major", "career", "program"]).unwrap_or_default(),
        semester: f.count(&["semester"]).unwrap_or_default(),
        gpa: f.number(&["gpa"]).unwrap_or_default(),
        total_credits: f.count(&["totalCredits", "total_credits", "credits"]).unwrap_or_default(),
        enrollment_date: f.string(&["enrollmentDate", "enrollment_date"]),
    })
}

pub fn students(value: &Value) -> Result<Vec<Student>, ApiError> {
    list_items(value)?.iter().map(student).collect()
}

pub fn subject(value: &Value) -> Result<Subject, ApiError> {
    let f = object(value, "subject")?;
    Ok(subject_from(Some(f), f))
}

pub fn subjects(value: &Value) -> Result<Vec<Subject>, ApiError> {
    list_items(value)?.iter().map(subject).collect()
}

/// Assemble a subject from a nested object (if any) and flat `subject_*` keys
fn subject_from(nested: Option<Fields<'_>>, flat: Fields<'_>) -> Subject {
    let pick = |nested_keys: &[&str], flat_keys: &[&str]| {
        nested
            .and_then(|n| n.string(nested_keys))
            .or_else(|| flat.string(flat_keys))
    };
    let pick_count = |nested_keys: &[&str], flat_keys: &[&str]| {
        nested
            .and_then(|n| n.count(nested_keys))
            .or_else(|| flat.count(flat_keys))
    };

    // `subject` itself may be a bare name or a bare id
    let bare = flat.value(&["subject"]);
    let bare_name = bare.and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty());
    let bare_id = bare.filter(|v| v.is_number()).and_then(scalar_string);

    Subject {
        id: pick(&["id"], &["subject_id", "subjectId"]).or(bare_id),
        code: pick(&["code"], &["subject_code", "subjectCode", "code"]).unwrap_or_default(),
        name: pick(&["name"], &["subject_name", "subjectName", "name"])
            .or_else(|| bare_name.map(str::to_string))
            .unwrap_or_default(),
        instructor: pick(&["teacher", "professor"], &["teacher", "professor"]),
        credits: pick_count(&["credits"], &["subject_credits", "credits"]),
        location: pick(&["location", "classroom"], &["location", "classroom"]),
        schedule: pick(&["schedule"], &["schedule"]),
        semester: pick_count(&["semester"], &["semester"]),
    }
}

pub fn enrollment(value: &Value, position: usize) -> Result<Enrollment, ApiError> {
    let f = object(value, "enrollment")?;
    let subject = subject_from(f.nested("subject"), f);
    let id = f
        .string(&["id", "pk"])
        .or_else(|| subject.id.clone())
        .unwrap_or_else(|| position.to_string());

    Ok(Enrollment {
        id,
        student_id: f
            .string(&["student_id", "studentId"])
            .or_else(|| f.nested("student").and_then(|s| s.string(&["id"]))),
        subject,
    })
}

pub fn enrollments(value: &Value) -> Result<Vec<Enrollment>, ApiError> {
    list_items(value)?
        .iter()
        .enumerate()
        .map(|(i, item)| enrollment(item, i))
        .collect()
}

pub fn absence(value: &Value, position: usize) -> Result<AbsenceRecord, ApiError> {
    let f = object(value, "absence")?;
    let subject = subject_from(f.nested("subject"), f);

    Ok(AbsenceRecord {
        id: f.string(&["id", "pk"]).unwrap_or_else(|| position.to_string()),
        date: f.string(&["date", "absence_date"]).unwrap_or_default(),
        reason: f.string(&["reason"]),
        comment: f.string(&["comment", "notes"]),
        subject_id: subject.id,
        subject_name: (!subject.name.is_empty()).then_some(subject.name),
    })
}

pub fn absences(value: &Value) -> Result<Vec<AbsenceRecord>, ApiError> {
    list_items(value)?
        .iter()
        .enumerate()
        .map(|(i, item)| absence(item, i))
        .collect()
}

fn totals(f: Fields<'_>) -> SubjectAbsenceTotals {
    SubjectAbsenceTotals {
        total: f.count(&["total", "total_classes", "sessions"]).unwrap_or_default(),
        absences: f.count(&["absences", "absent", "total_absences"]).unwrap_or_default(),
        justified: f.count(&["justified", "justified_absences"]).unwrap_or_default(),
    }
}

pub fn absence_summary(value: &Value) -> Result<AbsenceSummary, ApiError> {
    let mut summary = AbsenceSummary::default();
    let mut insert = |name: String, t: SubjectAbsenceTotals| {
        let entry = summary.by_subject.entry(name).or_default();
        *entry = entry.add(t);
    };

    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                let f = object(item, "summary entry")?;
                let name = f
                    .string(&["subject_name", "subjectName", "name"])
                    .or_else(|| f.nested("subject").and_then(|s| s.string(&["name"])))
                    .or_else(|| f.value(&["subject"]).and_then(Value::as_str).map(str::to_string))
                    .unwrap_or_else(|| NO_SUBJECT.to_string());
                insert(name, totals(f));
            }
        }
        Value::Object(map) => {
            if let Some(inner) = ["summary", "subjects"].iter().find_map(|k| {
                map.get(*k).filter(|v| v.is_array() || v.is_object())
            }) {
                return absence_summary(inner);
            }
            for (name, entry) in map {
                if let Some(f) = Fields::of(entry) {
                    insert(name.clone(), totals(f));
                }
            }
        }
        _ => return Err(ApiError::InvalidResponse("absence summary has unexpected shape".to_string())),
    }

    Ok(summary)
}

/// Any 2xx from `/health` counts as up; the body is kept for display
pub fn health(body: &str) -> HealthStatus {
    match serde_json::from_str::<Value>(body) {
        Ok(detail) => {
            let status = Fields::of(&detail)
                .and_then(|f| {
                    f.string(&["status"])
                        .or_else(|| f.nested("data").and_then(|d| d.string(&["status"])))
                })
                .unwrap_or_else(|| "ok".to_string());
            HealthStatus { status, detail }
        }
        Err(_) => HealthStatus {
            status: "ok".to_string(),
            detail: Value::String(body.trim().to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn student_accepts_both_casings_and_numeric_id() {
        let camel = student(&json!({
            "id": "42", "name": "Ada", "studentId": "A-1", "totalCredits": 30,
            "gpa": 3.8, "semester": 4, "enrollmentDate": "2022-08-01"
        }))
        .unwrap();
        let snake = student(&json!({
            "id": 42, "name": "Ada", "student_id": "A-1", "total_credits": "30",
            "gpa": "3.8", "semester": 4, "enrollment_date": "2022-08-01"
        }))
        .unwrap();
        assert_eq!(camel, snake);
        assert_eq!(camel.id, "42");
        assert_eq!(camel.total_credits, 30);
    }

    #[test]
    fn student_without_id_is_rejected() {
        assert!(matches!(student(&json!({"name": "x"})), Err(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn enrollment_flat_and_nested_agree() {
        let flat = enrollments(&json!([
            {"id": 1, "student_id": 42, "subject_id": 7, "subject_name": "Calc", "subject_code": "MA101"}
        ]))
        .unwrap();
        let nested = enrollments(&json!({"results": [
            {"id": 1, "student_id": 42, "subject": {"id": 7, "name": "Calc", "code": "MA101", "location": "B-12"}}
        ]}))
        .unwrap();

        assert_eq!(flat[0].subject.name, "Calc");
        assert_eq!(nested[0].subject.name, "Calc");
        assert_eq!(flat[0].subject.code, nested[0].subject.code);
        assert_eq!(flat[0].subject.id.as_deref(), Some("7"));
        assert_eq!(nested[0].subject.location.as_deref(), Some("B-12"));
        assert_eq!(flat[0].student_id.as_deref(), Some("42"));
    }

    #[test]
    fn absence_resolves_subject_and_notes() {
        let records = absences(&json!([
            {"id": 1, "date": "2024-01-15", "subject": {"name": "Calc"}, "notes": "late bus"},
            {"id": 2, "date": "2024-01-16", "subject_name": "Physics", "reason": "sick"},
            {"id": 3, "date": "2024-01-17", "subject": 9},
            {"id": 4, "date": "2024-01-18", "subject": "Chemistry"}
        ]))
        .unwrap();

        assert_eq!(records[0].subject_name.as_deref(), Some("Calc"));
        assert_eq!(records[0].detail(), "late bus");
        assert_eq!(records[1].subject_name.as_deref(), Some("Physics"));
        assert_eq!(records[2].subject_name, None);
        assert_eq!(records[2].subject_id.as_deref(), Some("9"));
        assert_eq!(records[3].subject_name.as_deref(), Some("Chemistry"));
    }

    #[test]
    fn summary_from_map_or_list() {
        let from_map = absence_summary(&json!({
            "Calc": {"total": 10, "absences": 2, "justified": 1},
            "student_id": 42
        }))
        .unwrap();
        let from_list = absence_summary(&json!([
            {"subject_name": "Calc", "total": 10, "absences": 2, "justified": 1}
        ]))
        .unwrap();

        assert_eq!(from_map, from_list);
        assert_eq!(from_map.by_subject.len(), 1);
    }

    #[test]
    fn summary_missing_counts_default_to_zero() {
        let summary = absence_summary(&json!({"Calc": {"absences": 3}})).unwrap();
        assert_eq!(summary.totals_for("Calc"), SubjectAbsenceTotals { total: 0, absences: 3, justified: 0 });
    }

    #[test]
    fn summary_sums_huge_counts_without_overflow() {
        let summary = absence_summary(&json!({
            "Math": {"total": 4294967295u64},
            "Physics": {"total": 1}
        }))
        .unwrap();
        assert_eq!(summary.totals().total, u32::MAX);

        let merged = absence_summary(&json!([
            {"subject_name": "Math", "absences": 4294967295u64},
            {"subject_name": "Math", "absences": 7}
        ]))
        .unwrap();
        assert_eq!(merged.totals_for("Math").absences, u32::MAX);
    }

    #[test]
    fn unnamed_summary_entry_shares_view_bucket() {
        let summary = absence_summary(&json!([{"absences": 2, "total": 5}])).unwrap();
        assert_eq!(summary.totals_for(crate::views::absences::NO_SUBJECT).absences, 2);
        assert_eq!(summary.by_subject.keys().map(String::as_str).collect::<Vec<_>>(), vec![NO_SUBJECT]);
    }

    #[test]
    fn health_accepts_text_or_json() {
        assert_eq!(health(r#"{"status":"healthy"}"#).status, "healthy");
        assert_eq!(health("OK").status, "ok");
    }
}
