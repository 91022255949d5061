//! PostgREST (Supabase) backend client
//!
//! Reads go to `<base_url>/rest/v1/<table>` with the anon key sent both as
//! `apikey` and as a bearer token. Every query is scoped with
//! `tenant_id=eq.<tenant>`.

use super::models::{ClassRow, ParentRow, ProfilePhotoRow, RecordPhotoRow, StudentRow, SubjectRecord};
use super::SchoolBackend;
use crate::config::{BackendConfig, RetryConfig};
use crate::domain::{
    BackendError, ClassId, ClassSection, HallTicketError, Result, SchoolDetails, Student,
    StudentId, TenantId,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// Maximum ids per `in.(...)` filter
const BULK_CHUNK_SIZE: usize = 100;

type QueryParams = Vec<(&'static str, String)>;

/// PostgREST implementation of [`SchoolBackend`]
///
/// # Example
///
/// ```no_run
/// use hallticket::adapters::backend::{PostgrestBackend, SchoolBackend};
/// use hallticket::config::load_config;
///
/// # async fn example() -> hallticket::domain::Result<()> {
/// let config = load_config("hallticket.toml")?;
/// let backend = PostgrestBackend::new(&config.backend)?;
///
/// for class in backend.list_classes().await? {
///     println!("{}", class.label());
/// }
/// # Ok(())
/// # }
/// ```
pub struct PostgrestBackend {
    rest_url: String,
    client: Client,
    tenant: TenantId,
    guardian_relation: String,
    retry: RetryConfig,
}

impl PostgrestBackend {
    /// Builds a client from backend configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the key, tenant or headers are
    /// unusable, or the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let tenant = config.tenant().map_err(HallTicketError::Configuration)?;

        let key = config
            .anon_key
            .as_ref()
            .map(|k| k.expose_secret().as_str().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| HallTicketError::Configuration("backend.anon_key is required".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", sensitive_header(&key)?);
        headers.insert(AUTHORIZATION, sensitive_header(&format!("Bearer {key}"))?);
        headers.insert(
            "x-application-name",
            HeaderValue::from_str(&config.application_name).map_err(|e| {
                HallTicketError::Configuration(format!("Invalid application_name header: {e}"))
            })?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut client_builder = ClientBuilder::new()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification disabled for backend");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            HallTicketError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            rest_url: rest_url(&config.base_url),
            client,
            tenant,
            guardian_relation: config.guardian_relation.trim().to_string(),
            retry: config.retry.clone(),
        })
    }

    /// Tenant every query is scoped to
    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    /// Runs a select against `table`, retrying transient failures
    async fn select<T: DeserializeOwned>(&self, table: &str, params: QueryParams) -> Result<Vec<T>> {
        self.retry_request(|| self.select_once(table, &params)).await
    }

    async fn select_once<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&'static str, String)],
    ) -> Result<Vec<T>> {
        let url = format!("{}/{}", self.rest_url, table);

        let mut query: Vec<(&str, String)> = Vec::with_capacity(params.len() + 1);
        query.push(("tenant_id", format!("eq.{}", self.tenant)));
        query.extend(params.iter().cloned());

        tracing::debug!(table = %table, "Backend select");

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(table, status, body).into());
        }

        response.json::<Vec<T>>().await.map_err(|e| {
            BackendError::InvalidResponse(format!("{table}: {e}")).into()
        })
    }

    /// Retry a request with exponential backoff
    ///
    /// Only transport failures, timeouts and 5xx responses are retried.
    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.retry.max_retries.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_attempts || !is_retryable(&e) {
                        return Err(e);
                    }

                    let delay_ms = backoff_delay_ms(&self.retry, attempt);
                    crate::log_retry_attempt!(attempt, max_attempts, delay_ms, e);
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    /// Bulk lookup split into `in.(...)` chunks
    async fn select_many<T, F>(
        &self,
        table: &str,
        select: &str,
        id_column: &'static str,
        student_ids: &[StudentId],
        extra: &[(&'static str, String)],
        into_pair: F,
    ) -> Result<HashMap<StudentId, String>>
    where
        T: DeserializeOwned,
        F: Fn(T) -> Option<(StudentId, String)>,
    {
        let mut found = HashMap::new();

        for chunk in student_ids.chunks(BULK_CHUNK_SIZE) {
            let mut params: QueryParams = vec![
                ("select", select.to_string()),
                (id_column, in_filter(chunk)),
            ];
            params.extend(extra.iter().cloned());

            let rows: Vec<T> = self.select(table, params).await?;
            for (student_id, value) in rows.into_iter().filter_map(&into_pair) {
                found.entry(student_id).or_insert(value);
            }
        }

        Ok(found)
    }

    async fn select_first<T, F>(
        &self,
        table: &str,
        params: QueryParams,
        into_pair: F,
    ) -> Result<Option<String>>
    where
        T: DeserializeOwned,
        F: Fn(T) -> Option<(StudentId, String)>,
    {
        let rows: Vec<T> = self.select(table, params).await?;
        Ok(rows.into_iter().find_map(into_pair).map(|(_, value)| value))
    }
}

#[async_trait]
impl SchoolBackend for PostgrestBackend {
    async fn list_classes(&self) -> Result<Vec<ClassSection>> {
        let rows: Vec<ClassRow> = self
            .select(
                "classes",
                vec![
                    ("select", "id,class_name,section".to_string()),
                    ("order", "class_name.asc,section.asc".to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().filter_map(ClassRow::into_domain).collect())
    }

    async fn fetch_class(&self, class_id: &ClassId) -> Result<Option<ClassSection>> {
        let rows: Vec<ClassRow> = self
            .select(
                "classes",
                vec![
                    ("select", "id,class_name,section".to_string()),
                    ("id", format!("eq.{class_id}")),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().find_map(ClassRow::into_domain))
    }

    async fn fetch_roster(&self, class_id: &ClassId) -> Result<Vec<Student>> {
        let rows: Vec<StudentRow> = self
            .select(
                "students",
                vec![
                    ("select", "id,name,admission_no,roll_no".to_string()),
                    ("class_id", format!("eq.{class_id}")),
                    ("order", "roll_no.asc,name.asc".to_string()),
                ],
            )
            .await?;

        let total = rows.len();
        let students: Vec<Student> = rows.into_iter().filter_map(StudentRow::into_domain).collect();
        if students.len() != total {
            tracing::warn!(
                class_id = %class_id,
                skipped = total - students.len(),
                "Skipped roster rows without a usable id"
            );
        }

        Ok(students)
    }

    async fn list_subjects(&self, class_id: &ClassId) -> Result<Vec<String>> {
        let rows: Vec<SubjectRecord> = self
            .select(
                "subjects",
                vec![
                    ("select", "id,name".to_string()),
                    ("class_id", format!("eq.{class_id}")),
                    ("order", "name.asc".to_string()),
                ],
            )
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.name)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect())
    }

    async fn fetch_school_details(&self) -> Result<Option<SchoolDetails>> {
        let rows: Vec<SchoolDetails> = self
            .select(
                "school_details",
                vec![
                    (
                        "select",
                        "name,address,city,state,pincode,logo_url,principal_name".to_string(),
                    ),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().next())
    }

    async fn fetch_guardian_name(&self, student_id: &StudentId) -> Result<Option<String>> {
        self.select_first(
            "parents",
            vec![
                ("select", "student_id,name,relation".to_string()),
                ("student_id", format!("eq.{student_id}")),
                ("relation", format!("eq.{}", self.guardian_relation)),
                ("limit", "1".to_string()),
            ],
            ParentRow::into_pair,
        )
        .await
    }

    async fn fetch_guardian_names(
        &self,
        student_ids: &[StudentId],
    ) -> Result<HashMap<StudentId, String>> {
        self.select_many(
            "parents",
            "student_id,name,relation",
            "student_id",
            student_ids,
            &[("relation", format!("eq.{}", self.guardian_relation))],
            ParentRow::into_pair,
        )
        .await
    }

    async fn fetch_profile_photo(&self, student_id: &StudentId) -> Result<Option<String>> {
        self.select_first(
            "users",
            vec![
                ("select", "linked_student_id,profile_url".to_string()),
                ("linked_student_id", format!("eq.{student_id}")),
                ("limit", "1".to_string()),
            ],
            ProfilePhotoRow::into_pair,
        )
        .await
    }

    async fn fetch_profile_photos(
        &self,
        student_ids: &[StudentId],
    ) -> Result<HashMap<StudentId, String>> {
        self.select_many(
            "users",
            "linked_student_id,profile_url",
            "linked_student_id",
            student_ids,
            &[],
            ProfilePhotoRow::into_pair,
        )
        .await
    }

    async fn fetch_record_photo(&self, student_id: &StudentId) -> Result<Option<String>> {
        self.select_first(
            "students",
            vec![
                ("select", "id,photo_url".to_string()),
                ("id", format!("eq.{student_id}")),
                ("limit", "1".to_string()),
            ],
            RecordPhotoRow::into_pair,
        )
        .await
    }

    async fn fetch_record_photos(
        &self,
        student_ids: &[StudentId],
    ) -> Result<HashMap<StudentId, String>> {
        self.select_many(
            "students",
            "id,photo_url",
            "id",
            student_ids,
            &[],
            RecordPhotoRow::into_pair,
        )
        .await
    }
}

fn sensitive_header(value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|_| {
        HallTicketError::Configuration("backend.anon_key contains invalid characters".into())
    })?;
    header.set_sensitive(true);
    Ok(header)
}

/// `<base>/rest/v1`, accepting a base that already includes the path
fn rest_url(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if base.ends_with("/rest/v1") {
        base.to_string()
    } else {
        format!("{base}/rest/v1")
    }
}

/// `in.("a","b")` filter with each id quoted
fn in_filter(ids: &[StudentId]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.as_str().replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

pub(crate) fn backoff_delay_ms(retry: &RetryConfig, attempt: usize) -> u64 {
    let exponent = attempt.saturating_sub(1).min(16) as i32;
    let delay = retry.initial_delay_ms as f64 * retry.backoff_multiplier.powi(exponent);
    (delay as u64).min(retry.max_delay_ms)
}

fn is_retryable(error: &HallTicketError) -> bool {
    matches!(error, HallTicketError::Backend(e) if e.is_retryable())
}

fn transport_error(error: reqwest::Error) -> HallTicketError {
    if error.is_timeout() {
        BackendError::Timeout(error.to_string()).into()
    } else {
        BackendError::ConnectionFailed(error.to_string()).into()
    }
}

fn status_error(table: &str, status: StatusCode, body: String) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            BackendError::AuthenticationFailed(format!("{table}: {status} {body}"))
        }
        s if s.is_server_error() => BackendError::ServerError {
            status: s.as_u16(),
            message: body,
        },
        _ => BackendError::QueryFailed {
            table: table.to_string(),
            message: format!("{status}: {body}"),
        },
    }
}
