// crates/core/src/api.rs
//! HTTP client for the pipeline server's REST surface.
//!
//! One method per endpoint. Start-job calls fold the server's
//! `success:false` shape into `ApiError::Server` so callers either get a
//! usable `JobHandle` or an error to surface — a poller is never started
//! for a job that didn't start.

use bytes::Bytes;
use maskdeck_types::{
    ExtractResponse, HealthResponse, JobHandle, JobStatusResponse, ScanResponse,
    StartJobResponse, StepKind,
};

use crate::error::ApiError;

/// Client for the remote document-processing server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the server at `base_url` (no trailing slash
    /// required; one is stripped if present).
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&url, e))?;
        Self::decode(url, response).await
    }

    async fn post_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&url, e))?;
        Self::decode(url, response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        url: String,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        if !response.status().is_success() {
            return Err(ApiError::Status {
                code: response.status().as_u16(),
                url,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::from_reqwest(&url, e))
    }

    /// `GET /scan-pdfs` — enumerate the source documents folder.
    pub async fn scan_pdfs(&self) -> Result<ScanResponse, ApiError> {
        let resp: ScanResponse = self.get_json("/scan-pdfs").await?;
        if !resp.success {
            return Err(ApiError::server(resp.error, "scan failed"));
        }
        Ok(resp)
    }

    /// `POST /mask-pdfs` — start the masking job.
    pub async fn mask_pdfs(&self) -> Result<JobHandle, ApiError> {
        let resp: StartJobResponse = self.post_json("/mask-pdfs").await?;
        Self::into_handle(resp, StepKind::Masking, "masking failed to start")
    }

    /// `POST /run-gemini-ocr-async` — start the OCR job.
    pub async fn run_ocr(&self) -> Result<JobHandle, ApiError> {
        let resp: StartJobResponse = self.post_json("/run-gemini-ocr-async").await?;
        Self::into_handle(resp, StepKind::Ocr, "ocr failed to start")
    }

    fn into_handle(
        resp: StartJobResponse,
        step: StepKind,
        fallback: &str,
    ) -> Result<JobHandle, ApiError> {
        if !resp.success {
            return Err(ApiError::server(resp.error, fallback));
        }
        let job_id = resp.job_id.ok_or(ApiError::MissingJobId)?;
        Ok(JobHandle::new(job_id, step))
    }

    /// `POST /extract-info` — synchronous personal-info extraction.
    pub async fn extract_info(&self) -> Result<ExtractResponse, ApiError> {
        let resp: ExtractResponse = self.post_json("/extract-info").await?;
        if !resp.success {
            return Err(ApiError::server(resp.error, "extraction failed"));
        }
        Ok(resp)
    }

    /// `GET /job-status/{id}` — one poll snapshot.
    ///
    /// Errors here are transport-level or shape-level; the poller treats
    /// them as inconclusive and retries on its fixed cadence.
    pub async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, ApiError> {
        self.get_json(&format!("/job-status/{job_id}")).await
    }

    /// `GET /health` — connectivity probe and folder inventory.
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.get_json("/health").await
    }

    /// `GET /download-masked` — the masked-files archive.
    pub async fn download_masked(&self) -> Result<Bytes, ApiError> {
        let url = self.url("/download-masked");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&url, e))?;
        if !response.status().is_success() {
            return Err(ApiError::Status {
                code: response.status().as_u16(),
                url,
            });
        }
        response
            .bytes()
            .await
            .map_err(|e| ApiError::from_reqwest(&url, e))
    }
}
