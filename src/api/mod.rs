pub mod wire;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::{json, Value};
use url::Url;

use crate::config::BackendConfig;
use crate::error::{error_detail, ApiError};
use crate::session::{InvalidationReason, Session};
use crate::types::{AbsenceRecord, AbsenceSummary, Enrollment, HealthStatus, NewAbsence, Student, StudentUpdate, Subject};

/// Header carrying the credential on every request
pub const API_KEY_HEADER: &str = "x-api-key";

/// Read side of the academic service that views fetch through.
///
/// [`ApiClient`] is the real implementation; tests substitute fakes.
#[async_trait]
pub trait AcademicService: Send + Sync {
    async fn list_students(&self) -> Result<Vec<Student>, ApiError>;
    async fn get_student(&self, student_id: &str) -> Result<Student, ApiError>;
    async fn list_enrollments(&self, student_id: &str) -> Result<Vec<Enrollment>, ApiError>;
    async fn list_absences(&self, student_id: &str) -> Result<Vec<AbsenceRecord>, ApiError>;
    async fn get_absence_summary(&self, student_id: &str) -> Result<AbsenceSummary, ApiError>;
}

/// HTTP client for the academic records service.
///
/// Reads the credential from the shared [`Session`] at send time and routes
/// any 401 through [`Session::invalidate`].
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(config: &BackendConfig, session: Arc<Session>) -> Result<Self, ApiError> {
        let base_url = Url::parse(&crate::config::normalize_base_url(&config.base_url))
            .map_err(|e| ApiError::ConfigurationError(format!("invalid base URL '{}': {}", config.base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("student-portal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::ConfigurationError(e.to_string()))?;

        Ok(Self { http, base_url, session })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::ConfigurationError(format!("invalid endpoint '{}': {}", path, e)))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        let mut request = self.http.request(method, url);
        if let Some(token) = self.session.credentials().current() {
            request = request.header(API_KEY_HEADER, token);
        }
        Ok(request)
    }

    /// Send and map non-2xx statuses; a 401 also tears down the session
    /// unless the credential has been replaced since the request went out
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = request.build().map_err(|e| ApiError::ConfigurationError(e.to_string()))?;
        let method = request.method().clone();
        let url = request.url().clone();
        let sent_key = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        tracing::debug!("{} {}", method, url);

        let response = self.http.execute(request).await.map_err(ApiError::from_transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status.as_u16(), error_detail(&body));
        tracing::debug!("{} {} failed with {}", method, url, status);

        if error.is_unauthorized() {
            if self.session.credentials().current() != sent_key {
                tracing::debug!("Ignoring 401 for {} {}: credential changed since it was sent", method, url);
            } else if let Err(e) = self.session.invalidate(InvalidationReason::Unauthorized) {
                tracing::warn!("Session invalidation incomplete: {}", e);
            }
        }
        Err(error)
    }

    async fn send_json(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = self.send(request).await?;
        let body = response.text().await.map_err(ApiError::from_transport)?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        let request = self.request(Method::GET, path)?.query(query);
        self.send_json(request).await
    }

    // --- Students ---

    pub async fn list_students(&self) -> Result<Vec<Student>, ApiError> {
        let value = self.get_json("students/", &[]).await?;
        wire::students(&value)
    }

    pub async fn get_student(&self, student_id: &str) -> Result<Student, ApiError> {
        let student_id = require_id("student id", student_id)?;
        let value = self.get_json(&format!("students/{}/", student_id), &[]).await?;
        wire::student(&value)
    }

    pub async fn update_student(&self, student_id: &str, update: &StudentUpdate) -> Result<Student, ApiError> {
        let student_id = require_id("student id", student_id)?;
        if update.is_empty() {
            return Err(ApiError::InvalidArgument("nothing to update".to_string()));
        }
        let request = self
            .request(Method::PUT, &format!("students/{}/", student_id))?
            .json(update);
        let value = self.send_json(request).await?;
        wire::student(&value)
    }

    // --- Subjects ---

    pub async fn list_subjects(&self) -> Result<Vec<Subject>, ApiError> {
        let value = self.get_json("subjects/", &[]).await?;
        wire::subjects(&value)
    }

    pub async fn get_subject(&self, subject_id: &str) -> Result<Subject, ApiError> {
        let subject_id = require_id("subject id", subject_id)?;
        let value = self.get_json(&format!("subjects/{}", subject_id), &[]).await?;
        wire::subject(&value)
    }

    // --- Enrollments ---

    pub async fn list_enrollments(&self, student_id: &str) -> Result<Vec<Enrollment>, ApiError> {
        let student_id = require_id("student id", student_id)?;
        let value = self.get_json("enrollments/", &[("student_id", student_id)]).await?;
        wire::enrollments(&value)
    }

    /// Enroll a student; returns whatever the service echoed back
    pub async fn enroll(&self, student_id: u64, subject_id: u64) -> Result<Value, ApiError> {
        require_nonzero("student id", student_id)?;
        require_nonzero("subject id", subject_id)?;
        let request = self
            .request(Method::POST, "enrollments/")?
            .json(&json!({ "student_id": student_id, "subject_id": subject_id }));
        self.send_json(request).await
    }

    pub async fn drop_enrollment(&self, student_id: u64, subject_id: u64) -> Result<(), ApiError> {
        require_nonzero("student id", student_id)?;
        require_nonzero("subject id", subject_id)?;
        let request = self.request(Method::DELETE, "enrollments/")?.query(&[
            ("student_id", student_id.to_string()),
            ("subject_id", subject_id.to_string()),
        ]);
        self.send(request).await?;
        Ok(())
    }

    // --- Absences ---

    pub async fn list_absences(&self, student_id: &str) -> Result<Vec<AbsenceRecord>, ApiError> {
        let student_id = require_id("student id", student_id)?;
        let value = self.get_json("absences/", &[("student_id", student_id)]).await?;
        wire::absences(&value)
    }

    pub async fn list_absences_for_subject(
        &self,
        student_id: &str,
        subject_id: &str,
    ) -> Result<Vec<AbsenceRecord>, ApiError> {
        let student_id = require_id("student id", student_id)?;
        let subject_id = require_id("subject id", subject_id)?;
        let value = self
            .get_json("absences/", &[("student_id", student_id), ("subject_id", subject_id)])
            .await?;
        wire::absences(&value)
    }

    pub async fn create_absence(&self, absence: &NewAbsence) -> Result<AbsenceRecord, ApiError> {
        require_nonzero("student id", absence.student_id)?;
        require_nonzero("subject id", absence.subject_id)?;
        let request = self.request(Method::POST, "absences/")?.json(absence);
        let value = self.send_json(request).await?;
        wire::absence(&value, 0)
    }

    pub async fn get_absence_summary(&self, student_id: &str) -> Result<AbsenceSummary, ApiError> {
        let student_id = require_id("student id", student_id)?;
        let value = self
            .get_json(&format!("students/{}/absence_summary/", student_id), &[])
            .await?;
        wire::absence_summary(&value)
    }

    // --- Service ---

    pub async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        let response = self.send(self.request(Method::GET, "health")?).await?;
        let body = response.text().await.map_err(ApiError::from_transport)?;
        Ok(wire::health(&body))
    }
}

#[async_trait]
impl AcademicService for ApiClient {
    async fn list_students(&self) -> Result<Vec<Student>, ApiError> {
        ApiClient::list_students(self).await
    }

    async fn get_student(&self, student_id: &str) -> Result<Student, ApiError> {
        ApiClient::get_student(self, student_id).await
    }

    async fn list_enrollments(&self, student_id: &str) -> Result<Vec<Enrollment>, ApiError> {
        ApiClient::list_enrollments(self, student_id).await
    }

    async fn list_absences(&self, student_id: &str) -> Result<Vec<AbsenceRecord>, ApiError> {
        ApiClient::list_absences(self, student_id).await
    }

    async fn get_absence_summary(&self, student_id: &str) -> Result<AbsenceSummary, ApiError> {
        ApiClient::get_absence_summary(self, student_id).await
    }
}

fn require_id<'a>(what: &str, id: &'a str) -> Result<&'a str, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::InvalidArgument(format!("{} must not be empty", what)));
    }
    if id.contains('/') || id.contains('?') || id.contains('#') {
        return Err(ApiError::InvalidArgument(format!("{} '{}' is not a valid identifier", what, id)));
    }
    Ok(id)
}

fn require_nonzero(what: &str, id: u64) -> Result<(), ApiError> {
    if id == 0 {
        return Err(ApiError::InvalidArgument(format!("{} must not be zero", what)));
    }
    Ok(())
}
