//! Universer API connector implementation
//!
//! Implements the [`ExchangeClient`] trait over the Universer HTTP API.

use async_trait::async_trait;
use bridge_traits::http::{ByteStream, HttpClient, HttpRequest, HttpResponse};
use bytes::Bytes;
use core_library::models::kind_code;
use core_runtime::config::{GatewayConfig, DEFAULT_API_PREFIX, DEFAULT_REQUEST_TIMEOUT};
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, UniverserError};
use crate::types::{
    CreateUnitRequest, Credential, ExchangeDirection, ExportRequest, FileUploaded, ImportRequest,
    Reply, SignedUrl, TaskPoll, TaskStarted, TaskStatus, UnitCreated, IMPORT_OUTPUT_TYPE,
};

/// Form field carrying the uploaded file
const UPLOAD_FIELD: &str = "file";

const STATUS_DONE: &str = "done";
const STATUS_PENDING: &str = "pending";

/// Remote operations against the document-processing service
///
/// Every call forwards the credential verbatim and makes exactly one
/// attempt; retry policy belongs to the caller.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Create an empty unit of the named kind owned by `owner_user_id`
    async fn create_unit(
        &self,
        name: &str,
        kind: &str,
        owner_user_id: &str,
        credential: &Credential,
    ) -> Result<String>;

    /// Upload raw file content and return the remote file id
    async fn upload_file(
        &self,
        file_name: &str,
        size: u64,
        content: Bytes,
        credential: &Credential,
    ) -> Result<String>;

    /// Start converting an uploaded file into a unit; returns the task id
    async fn start_import(
        &self,
        file_id: &str,
        kind_code: i64,
        credential: &Credential,
    ) -> Result<String>;

    /// Start converting a unit into a downloadable file; returns the task id
    async fn start_export(
        &self,
        unit_id: &str,
        kind_code: i64,
        credential: &Credential,
    ) -> Result<String>;

    /// Poll an exchange task once
    async fn poll_task(
        &self,
        task_id: &str,
        direction: ExchangeDirection,
        credential: &Credential,
    ) -> Result<TaskPoll>;

    /// Resolve a signed URL for a remote file and stream its bytes
    async fn fetch_file(&self, file_id: &str, credential: &Credential) -> Result<ByteStream>;
}

/// Universer API connector
///
/// # Example
///
/// ```ignore
/// use provider_universer::{Credential, ExchangeClient, UniverserConnector};
///
/// let connector = UniverserConnector::new(http_client, "http://localhost:8000");
/// let unit_id = connector
///     .create_unit("Roadmap", "doc", "42", &Credential::new(cookie))
///     .await?;
/// ```
pub struct UniverserConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Service host, used to absolutize host-relative signed URLs
    host: String,

    /// Host plus API prefix
    api_base: String,

    /// Per-request timeout
    timeout: Duration,
}

impl UniverserConnector {
    /// Create a connector for `host` with the default `/universer-api` prefix
    pub fn new(http_client: Arc<dyn HttpClient>, host: impl Into<String>) -> Self {
        let host = host.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            api_base: format!("{}{}", host, DEFAULT_API_PREFIX),
            host,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(config.http_client.clone(), config.universer_host.clone())
            .with_api_prefix(&config.api_prefix)
            .with_timeout(config.request_timeout)
    }

    pub fn with_api_prefix(mut self, prefix: &str) -> Self {
        self.api_base = format!("{}{}", self.host, prefix);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn request(&self, request: HttpRequest, credential: &Credential) -> HttpRequest {
        request
            .cookie(credential.as_str())
            .header("Accept", "application/json")
            .timeout(self.timeout)
    }

    /// Execute once and require a 200 status
    async fn send(&self, operation: &'static str, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.http_client.execute(request).await.map_err(|e| {
            warn!(operation, error = %e, "Universer request failed");
            UniverserError::from(e)
        })?;

        if response.status != 200 {
            let message = response.text_lossy();
            warn!(operation, status = response.status, message = %message, "Universer returned an error status");
            return Err(UniverserError::HttpStatus {
                status_code: response.status,
                message,
            });
        }

        debug!(operation, bytes = response.body.len(), "Universer request succeeded");
        Ok(response)
    }

    /// Resolve a signed URL. Absolute URLs are kept as given; anything else
    /// is appended to the service host, path included.
    fn absolutize(&self, url: &str) -> Result<String> {
        if Url::parse(url).is_ok() {
            return Ok(url.to_string());
        }

        let resolved = if url.starts_with('/') {
            format!("{}{}", self.host, url)
        } else {
            format!("{}/{}", self.host, url)
        };
        Url::parse(&resolved)
            .map_err(|e| UniverserError::InvalidUrl(format!("{}: {}", resolved, e)))?;
        Ok(resolved)
    }

    fn non_empty(value: String, operation: &'static str, field: &'static str) -> Result<String> {
        if value.is_empty() {
            warn!(operation, field, "Universer returned an empty identifier");
            return Err(UniverserError::EmptyResult { operation, field });
        }
        Ok(value)
    }
}

#[async_trait]
impl ExchangeClient for UniverserConnector {
    #[instrument(skip(self, credential))]
    async fn create_unit(
        &self,
        name: &str,
        kind: &str,
        owner_user_id: &str,
        credential: &Credential,
    ) -> Result<String> {
        let url = self.endpoint(&format!("/snapshot/{}/unit/-/create", kind_code(kind)));
        let request = self
            .request(HttpRequest::post(url), credential)
            .json(&CreateUnitRequest {
                name,
                creator: owner_user_id,
            })?;

        let response = self.send("create_unit", request).await?;
        let created = Reply::<UnitCreated>::from_slice(&response.body)?.into_result()?;
        let unit_id = Self::non_empty(created.unit_id, "create_unit", "unitID")?;

        info!(unit_id = %unit_id, "Created Universer unit");
        Ok(unit_id)
    }

    #[instrument(skip(self, content, credential), fields(content_len = content.len()))]
    async fn upload_file(
        &self,
        file_name: &str,
        size: u64,
        content: Bytes,
        credential: &Credential,
    ) -> Result<String> {
        let url = self.endpoint(&format!("/stream/file/upload?size={}", size));
        let request = self
            .request(HttpRequest::post(url), credential)
            .multipart_file(UPLOAD_FIELD, file_name, content);

        let response = self.send("upload_file", request).await?;
        // The upload endpoint may answer without an envelope.
        let uploaded = Reply::<FileUploaded>::from_slice_lenient(&response.body)?.into_result()?;
        let file_id = Self::non_empty(uploaded.file_id, "upload_file", "FileId")?;

        info!(file_id = %file_id, "Uploaded file to Universer");
        Ok(file_id)
    }

    #[instrument(skip(self, credential))]
    async fn start_import(
        &self,
        file_id: &str,
        kind_code: i64,
        credential: &Credential,
    ) -> Result<String> {
        let url = self.endpoint(&format!("/exchange/{}/import", kind_code));
        let request = self
            .request(HttpRequest::post(url), credential)
            .json(&ImportRequest {
                file_id,
                output_type: IMPORT_OUTPUT_TYPE,
            })?;

        let response = self.send("start_import", request).await?;
        let started = Reply::<TaskStarted>::from_slice(&response.body)?.into_result()?;
        let task_id = Self::non_empty(started.task_id, "start_import", "taskID")?;

        info!(task_id = %task_id, "Started import task");
        Ok(task_id)
    }

    #[instrument(skip(self, credential))]
    async fn start_export(
        &self,
        unit_id: &str,
        kind_code: i64,
        credential: &Credential,
    ) -> Result<String> {
        let url = self.endpoint(&format!("/exchange/{}/export", kind_code));
        let request = self
            .request(HttpRequest::post(url), credential)
            .json(&ExportRequest {
                unit_id,
                kind: kind_code,
            })?;

        let response = self.send("start_export", request).await?;
        let started = Reply::<TaskStarted>::from_slice(&response.body)?.into_result()?;
        let task_id = Self::non_empty(started.task_id, "start_export", "taskID")?;

        info!(task_id = %task_id, "Started export task");
        Ok(task_id)
    }

    #[instrument(skip(self, credential))]
    async fn poll_task(
        &self,
        task_id: &str,
        direction: ExchangeDirection,
        credential: &Credential,
    ) -> Result<TaskPoll> {
        let url = self.endpoint(&format!("/exchange/task/{}", urlencoding::encode(task_id)));
        let request = self.request(HttpRequest::get(url), credential);

        let response = self.send("poll_task", request).await?;
        let status = Reply::<TaskStatus>::from_slice(&response.body)?.into_result()?;

        debug!(status = %status.status, "Polled exchange task");

        match status.status.as_str() {
            STATUS_PENDING => Ok(TaskPoll::Pending),
            STATUS_DONE => {
                let result_id = match direction {
                    ExchangeDirection::Import => {
                        Self::non_empty(status.import.unit_id, "poll_task", "import.unitID")?
                    }
                    ExchangeDirection::Export => {
                        Self::non_empty(status.export.file_id, "poll_task", "export.fileID")?
                    }
                };
                Ok(TaskPoll::Done(result_id))
            }
            _ => {
                warn!(task_id, status = %status.status, "Exchange task failed");
                Err(UniverserError::TaskFailed {
                    task_id: task_id.to_string(),
                    status: status.status,
                })
            }
        }
    }

    #[instrument(skip(self, credential))]
    async fn fetch_file(&self, file_id: &str, credential: &Credential) -> Result<ByteStream> {
        let url = self.endpoint(&format!("/file/{}/sign-url", urlencoding::encode(file_id)));
        let request = self.request(HttpRequest::get(url), credential);

        let response = self.send("fetch_file", request).await?;
        let signed = Reply::<SignedUrl>::from_slice(&response.body)?.into_result()?;
        let signed_url = Self::non_empty(signed.url, "fetch_file", "url")?;
        let download_url = self.absolutize(&signed_url)?;

        debug!(url = %download_url, "Downloading exported file");

        let request = HttpRequest::get(download_url)
            .cookie(credential.as_str())
            .timeout(self.timeout);
        let stream = self.http_client.download_stream(request).await?;

        info!("Opened export download stream");
        Ok(stream)
    }
}
