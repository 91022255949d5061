//! Integration tests for the PostgREST backend client against a mock server

use hallticket::adapters::backend::{PostgrestBackend, SchoolBackend};
use hallticket::config::{secret_string, BackendConfig, RetryConfig};
use hallticket::domain::{BackendError, ClassId, HallTicketError, RollNumber, StudentId};
use mockito::{Matcher, Server};

const TENANT: &str = "9abe534f-1a12-474c-a387-f8795ad3ab5a";

fn config(base_url: &str) -> BackendConfig {
    BackendConfig {
        base_url: base_url.to_string(),
        anon_key: Some(secret_string("anon-test-key".to_string())),
        tenant_id: TENANT.to_string(),
        timeout_seconds: 5,
        retry: RetryConfig {
            max_retries: 3,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
        },
        ..Default::default()
    }
}

fn tenant_filter() -> Matcher {
    Matcher::UrlEncoded("tenant_id".into(), format!("eq.{TENANT}"))
}

#[tokio::test]
async fn test_list_classes_sends_headers_and_tenant_filter() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/classes")
        .match_query(Matcher::AllOf(vec![
            tenant_filter(),
            Matcher::UrlEncoded("select".into(), "id,class_name,section".into()),
            Matcher::UrlEncoded("order".into(), "class_name.asc,section.asc".into()),
        ]))
        .match_header("apikey", "anon-test-key")
        .match_header("authorization", "Bearer anon-test-key")
        .match_header("x-application-name", "hallticket-global")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"id": "c-10a", "class_name": "10", "section": "A"},
                {"id": 42, "class_name": "9", "section": null},
                {"id": "  ", "class_name": "broken", "section": "Z"}
            ]"#,
        )
        .expect(1)
        .create_async()
        .await;

    let backend = PostgrestBackend::new(&config(&server.url())).unwrap();
    let classes = backend.list_classes().await.unwrap();

    mock.assert_async().await;
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[0].label(), "10 - A");
    assert_eq!(classes[1].id.as_str(), "42");
    assert_eq!(classes[1].label(), "9");
}

#[tokio::test]
async fn test_fetch_roster_parses_mixed_roll_numbers() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/students")
        .match_query(Matcher::AllOf(vec![
            tenant_filter(),
            Matcher::UrlEncoded("class_id".into(), "eq.c-10a".into()),
            Matcher::UrlEncoded("order".into(), "roll_no.asc,name.asc".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"id": "s1", "name": "Asha", "admission_no": "ADM-1", "roll_no": 1},
                {"id": "s2", "name": "Ravi", "admission_no": 1002, "roll_no": "2B"},
                {"id": "s3", "name": "Meera", "admission_no": null, "roll_no": null}
            ]"#,
        )
        .create_async()
        .await;

    let backend = PostgrestBackend::new(&config(&server.url())).unwrap();
    let students = backend
        .fetch_roster(&ClassId::new("c-10a").unwrap())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(students.len(), 3);
    assert_eq!(students[0].roll_no, Some(RollNumber::Number(1)));
    assert_eq!(students[1].admission_no.as_deref(), Some("1002"));
    assert_eq!(students[1].roll_no, Some(RollNumber::Text("2B".into())));
    assert!(students[2].roll_no.is_none());
}

#[tokio::test]
async fn test_guardian_lookup_filters_relation() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/parents")
        .match_query(Matcher::AllOf(vec![
            tenant_filter(),
            Matcher::UrlEncoded("student_id".into(), "eq.s1".into()),
            Matcher::UrlEncoded("relation".into(), "eq.Father".into()),
            Matcher::UrlEncoded("limit".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"student_id": "s1", "name": "Suresh", "relation": "Father"}]"#)
        .create_async()
        .await;

    let backend = PostgrestBackend::new(&config(&server.url())).unwrap();
    let name = backend
        .fetch_guardian_name(&StudentId::new("s1").unwrap())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(name.as_deref(), Some("Suresh"));
}

#[tokio::test]
async fn test_bulk_photo_lookup_uses_in_filter() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/users")
        .match_query(Matcher::AllOf(vec![
            tenant_filter(),
            Matcher::UrlEncoded("linked_student_id".into(), r#"in.("s1","s2")"#.into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"linked_student_id": "s1", "profile_url": "https://cdn.example.com/s1.png"},
                {"linked_student_id": "s2", "profile_url": "   "}
            ]"#,
        )
        .expect(1)
        .create_async()
        .await;

    let backend = PostgrestBackend::new(&config(&server.url())).unwrap();
    let ids = vec![StudentId::new("s1").unwrap(), StudentId::new("s2").unwrap()];
    let photos = backend.fetch_profile_photos(&ids).await.unwrap();

    mock.assert_async().await;
    assert_eq!(photos.len(), 1);
    assert_eq!(
        photos.get(&ids[0]).map(String::as_str),
        Some("https://cdn.example.com/s1.png")
    );
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/school_details")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("upstream unavailable")
        .expect(3)
        .create_async()
        .await;

    let backend = PostgrestBackend::new(&config(&server.url())).unwrap();
    let err = backend.fetch_school_details().await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(
        err,
        HallTicketError::Backend(BackendError::ServerError { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_auth_errors_are_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/classes")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"message": "Invalid API key"}"#)
        .expect(1)
        .create_async()
        .await;

    let backend = PostgrestBackend::new(&config(&server.url())).unwrap();
    let err = backend.list_classes().await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(
        err,
        HallTicketError::Backend(BackendError::AuthenticationFailed(_))
    ));
}

#[tokio::test]
async fn test_missing_class_is_none() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/rest/v1/classes")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.nope".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let backend = PostgrestBackend::new(&config(&server.url())).unwrap();
    let class = backend
        .fetch_class(&ClassId::new("nope").unwrap())
        .await
        .unwrap();
    assert!(class.is_none());
}

#[test]
fn test_missing_key_is_a_configuration_error() {
    let mut cfg = config("https://school.supabase.co");
    cfg.anon_key = None;
    assert!(matches!(
        PostgrestBackend::new(&cfg),
        Err(HallTicketError::Configuration(_))
    ));
}
