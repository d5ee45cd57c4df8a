//! HTTP Client Abstraction
//!
//! Provides single-attempt async HTTP operations, multipart uploads and
//! streaming downloads. Retries are a caller concern.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::error::{BridgeError, Result};

/// A readable byte stream handed to the caller, who is responsible for
/// draining and dropping it.
pub type ByteStream = Box<dyn tokio::io::AsyncRead + Send + Unpin>;

/// HTTP method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A single file part of a `multipart/form-data` body
#[derive(Clone)]
pub struct MultipartFile {
    pub field_name: String,
    pub file_name: String,
    pub content: Bytes,
}

impl fmt::Debug for MultipartFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultipartFile")
            .field("field_name", &self.field_name)
            .field("file_name", &self.file_name)
            .field("content_len", &self.content.len())
            .finish()
    }
}

/// Request body variants
#[derive(Debug, Clone)]
pub enum HttpBody {
    Bytes(Bytes),
    Multipart(MultipartFile),
}

/// HTTP request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<HttpBody>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Forward an opaque session cookie verbatim
    pub fn cookie(self, cookie: impl Into<String>) -> Self {
        self.header("Cookie", cookie)
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let json = serde_json::to_vec(body).map_err(|e| {
            BridgeError::OperationFailed(format!("JSON serialization failed: {}", e))
        })?;
        self.body = Some(HttpBody::Bytes(Bytes::from(json)));
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(HttpBody::Bytes(body));
        self
    }

    /// Attach a single file as a `multipart/form-data` body. The transport
    /// sets the boundary and content type.
    pub fn multipart_file(
        mut self,
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        content: Bytes,
    ) -> Self {
        self.body = Some(HttpBody::Multipart(MultipartFile {
            field_name: field_name.into(),
            file_name: file_name.into(),
            content,
        }));
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// HTTP response
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Get response body as UTF-8 string, replacing invalid sequences
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

/// Async HTTP client trait
///
/// This trait abstracts HTTP operations to allow the transport to be swapped
/// (reqwest on desktop, mocks in tests). Implementations must not retry:
/// each call maps to exactly one request on the wire.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::{HttpClient, HttpRequest};
///
/// async fn fetch(client: &dyn HttpClient) -> Result<String> {
///     let request = HttpRequest::get("https://docs.example.com/universer-api/exchange/task/t1")
///         .cookie("_on-premise=abc");
///
///     let response = client.execute(request).await?;
///     Ok(response.text_lossy())
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and buffer the full response body
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Transport`] if no response was received. A
    /// non-2xx status is *not* an error at this layer.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Execute a request and return the response body as a stream of bytes
    ///
    /// Used for downloads that should not be buffered in memory. A non-2xx
    /// status is reported as [`BridgeError::OperationFailed`].
    async fn download_stream(&self, request: HttpRequest) -> Result<ByteStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_request_builder() {
        let request = HttpRequest::get("https://example.com")
            .header("User-Agent", "test")
            .cookie("session=abc")
            .timeout(Duration::from_secs(30));

        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://example.com");
        assert_eq!(request.headers.get("User-Agent"), Some(&"test".to_string()));
        assert_eq!(request.headers.get("Cookie"), Some(&"session=abc".to_string()));
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let request = HttpRequest::post("https://example.com")
            .json(&serde_json::json!({ "name": "Report" }))
            .unwrap();

        assert_eq!(
            request.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
        match request.body {
            Some(HttpBody::Bytes(bytes)) => assert_eq!(&bytes[..], br#"{"name":"Report"}"#),
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_multipart_body() {
        let request = HttpRequest::post("https://example.com/upload").multipart_file(
            "file",
            "report.docx",
            Bytes::from_static(b"PK"),
        );

        match request.body {
            Some(HttpBody::Multipart(part)) => {
                assert_eq!(part.field_name, "file");
                assert_eq!(part.file_name, "report.docx");
                assert_eq!(part.content.len(), 2);
            }
            other => panic!("unexpected body: {:?}", other),
        }
        assert!(!request.headers.contains_key("Content-Type"));
    }

    #[test]
    fn test_text_lossy_replaces_invalid_utf8() {
        let response = HttpResponse {
            status: 502,
            headers: HashMap::new(),
            body: Bytes::from_static(b"bad \xff gateway"),
        };
        assert_eq!(response.text_lossy(), "bad \u{fffd} gateway");
    }
}
