mod common;

use anyhow::Result;
use axum::http::Method;
use serde_json::json;

use common::MockService;
use student_portal::api::ApiClient;
use student_portal::config::BackendConfig;
use student_portal::error::ApiError;
use student_portal::session::Session;
use student_portal::storage::MemoryStorage;
use std::sync::Arc;

#[tokio::test]
async fn attaches_stored_key_to_every_request() -> Result<()> {
    let mock = MockService::start("abc123").await?;
    mock.ok("/students/", json!([{"id": 1, "name": "Ada"}]));
    mock.ok("/enrollments/", json!([]));
    let (_session, client) = mock.client(Some("abc123"))?;

    client.list_students().await?;
    client.list_enrollments("1").await?;

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.api_key.as_deref() == Some("abc123")));
    assert_eq!(requests[1].query.as_deref(), Some("student_id=1"));
    Ok(())
}

#[tokio::test]
async fn omits_header_without_credential() -> Result<()> {
    let mock = MockService::start("abc123").await?;
    mock.ok("/students/", json!([]));
    let (_session, client) = mock.client(None)?;

    let result = client.list_students().await;

    assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    assert_eq!(mock.last_request().and_then(|r| r.api_key), None);
    Ok(())
}

#[tokio::test]
async fn maps_status_codes_to_error_kinds() -> Result<()> {
    let mock = MockService::start("k").await?;
    let (_session, client) = mock.client(Some("k"))?;

    let cases = [
        (400, "BAD_REQUEST"),
        (403, "FORBIDDEN"),
        (404, "NOT_FOUND"),
        (409, "CONFLICT"),
        (422, "VALIDATION_ERROR"),
        (500, "SERVER_ERROR"),
        (503, "UNKNOWN_STATUS"),
    ];
    for (status, code) in cases {
        mock.respond(Method::GET, "/students/7/", status, json!({"detail": format!("failed with {}", status)}));
        let err = client.get_student("7").await.unwrap_err();
        assert_eq!(err.error_code(), code, "status {}", status);
        assert_eq!(err.status_code(), Some(status));
        assert!(err.to_string().contains(&format!("failed with {}", status)));
    }
    Ok(())
}

#[tokio::test]
async fn unreachable_service_is_network_error() -> Result<()> {
    // picked but never bound
    let port = portpicker::pick_unused_port().expect("free port");
    let session = Arc::new(Session::hydrate(Arc::new(MemoryStorage::new()))?);
    session.login("k")?;
    let client = ApiClient::new(&BackendConfig::with_base_url(&format!("http://127.0.0.1:{}", port)), session.clone())?;

    let err = client.list_students().await.unwrap_err();

    assert!(matches!(err, ApiError::NetworkUnreachable(_)), "got {:?}", err);
    assert_eq!(err.status_code(), None);
    assert!(session.is_authenticated());
    Ok(())
}

#[tokio::test]
async fn normalizes_heterogeneous_payloads() -> Result<()> {
    let mock = MockService::start("k").await?;
    mock.ok(
        "/enrollments/",
        json!({"results": [
            {"id": 1, "subject": {"id": 7, "name": "Calc", "code": "MA101"}},
            {"id": 2, "subject_id": 8, "subject_name": "Physics", "subject_code": "PH200"}
        ]}),
    );
    mock.ok(
        "/absences/",
        json!([
            {"id": 10, "date": "2024-01-15", "subject": {"name": "Calc"}, "notes": "late bus"},
            {"id": 11, "date": "2024-01-16", "subject_name": "Physics", "reason": "sick"}
        ]),
    );
    mock.ok(
        "/students/42/absence_summary/",
        json!([{"subject_name": "Calc", "total": 1, "absences": 1, "justified": 0}]),
    );
    let (_session, client) = mock.client(Some("k"))?;

    let enrollments = client.list_enrollments("42").await?;
    let names: Vec<&str> = enrollments.iter().map(|e| e.subject.name.as_str()).collect();
    assert_eq!(names, vec!["Calc", "Physics"]);
    assert_eq!(enrollments[1].subject.code, "PH200");

    let absences = client.list_absences("42").await?;
    assert_eq!(absences[0].subject_name.as_deref(), Some("Calc"));
    assert_eq!(absences[0].detail(), "late bus");
    assert_eq!(absences[1].detail(), "sick");

    let summary = client.get_absence_summary("42").await?;
    assert_eq!(summary.totals_for("Calc").absences, 1);
    Ok(())
}

#[tokio::test]
async fn write_endpoints_send_expected_bodies() -> Result<()> {
    let mock = MockService::start("k").await?;
    mock.respond(Method::POST, "/enrollments/", 201, json!({"id": 5, "student_id": 42, "subject_id": 7}));
    mock.respond(Method::DELETE, "/enrollments/", 204, serde_json::Value::Null);
    mock.respond(
        Method::POST,
        "/absences/",
        201,
        json!({"id": 99, "date": "2024-03-01", "subject_id": 7, "reason": "sick", "comment": ""}),
    );
    let (_session, client) = mock.client(Some("k"))?;

    client.enroll(42, 7).await?;
    let body = mock.last_request().and_then(|r| r.body).expect("enroll body");
    assert_eq!(body, json!({"student_id": 42, "subject_id": 7}));

    client.drop_enrollment(42, 7).await?;
    let drop = mock.last_request().expect("drop request");
    assert_eq!(drop.method, Method::DELETE);
    assert_eq!(drop.query.as_deref(), Some("student_id=42&subject_id=7"));

    let created = client
        .create_absence(&student_portal::types::NewAbsence {
            student_id: 42,
            subject_id: 7,
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
            reason: "sick".to_string(),
            comment: String::new(),
        })
        .await?;
    assert_eq!(created.id, "99");
    assert_eq!(created.subject_id.as_deref(), Some("7"));
    let body = mock.last_request().and_then(|r| r.body).expect("absence body");
    assert_eq!(body["date"], "2024-03-01");
    Ok(())
}

#[tokio::test]
async fn health_needs_no_key() -> Result<()> {
    let mock = MockService::start("k").await?;
    mock.ok("/health", json!({"status": "healthy"}));
    let (_session, client) = mock.client(None)?;

    let health = client.health_check().await?;

    assert_eq!(health.status, "healthy");
    Ok(())
}
