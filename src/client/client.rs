//! # Detection Service Client
//!
//! Typed HTTP client for the detection API. Every call returns a uniform
//! outcome: the parsed payload on success, or a [`ClientError`] that tells
//! the caller whether the transport failed, the server rejected the request
//! (with the server-provided detail text), or the response body was
//! malformed.
//!
//! Submissions are independent inference requests: no retries, no
//! idempotency keys, no cross-request ordering.

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

use crate::common::types::{
    BatchResponse, DetectionResult, ErrorBody, HealthResponse, ModelInfo, ServiceInfo,
};
use crate::detection::brands::BrandRecord;

/// Uniform client-side error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced an HTTP response
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-2xx status; `detail` is the server's
    /// `{"detail": ...}` text, falling back to the HTTP status text, and is
    /// never empty
    #[error("server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    /// A 2xx response whose body did not match the contract
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// HTTP client for the detection service.
pub struct DetectClient {
    http: reqwest::Client,
    base_url: String,
}

impl DetectClient {
    /// # Arguments
    /// - `base_url`: service root, e.g. "http://127.0.0.1:8000"
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Submit one image for analysis.
    pub async fn analyze(
        &self,
        image: Vec<u8>,
        filename: &str,
    ) -> Result<DetectionResult, ClientError> {
        let form = Form::new().part("image", image_part(image, filename)?);
        let response = self
            .http
            .post(self.url("/analyze"))
            .multipart(form)
            .send()
            .await?;
        parse_json(check(response).await?).await
    }

    /// Submit several images in one request.
    ///
    /// The returned results are ordered by submission position.
    pub async fn analyze_batch(
        &self,
        images: Vec<(Vec<u8>, String)>,
    ) -> Result<BatchResponse, ClientError> {
        let mut form = Form::new();
        for (data, filename) in images {
            form = form.part("images", image_part(data, &filename)?);
        }
        let response = self
            .http
            .post(self.url("/analyze/batch"))
            .multipart(form)
            .send()
            .await?;
        parse_json(check(response).await?).await
    }

    pub async fn service_info(&self) -> Result<ServiceInfo, ClientError> {
        self.get_json("/").await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get_json("/health").await
    }

    pub async fn model_info(&self) -> Result<ModelInfo, ClientError> {
        self.get_json("/model/info").await
    }

    pub async fn brands_database(
        &self,
    ) -> Result<BTreeMap<String, BrandRecord>, ClientError> {
        self.get_json("/brands/database").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.http.get(self.url(path)).send().await?;
        parse_json(check(response).await?).await
    }
}

/// Convert a non-2xx response into [`ClientError::Server`] with a non-empty
/// detail message.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let fallback = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();
    let detail = match response.json::<ErrorBody>().await {
        Ok(body) if !body.detail.trim().is_empty() => body.detail,
        _ => fallback,
    };
    Err(ClientError::Server {
        status: status.as_u16(),
        detail,
    })
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::Unexpected(format!("malformed response body: {}", e)))
}

fn image_part(data: Vec<u8>, filename: &str) -> Result<Part, ClientError> {
    let part = Part::bytes(data)
        .file_name(filename.to_string())
        .mime_str(mime_for(filename))?;
    Ok(part)
}

fn mime_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}
