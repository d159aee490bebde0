//! Typed REST client for the sampling backend.
//!
//! All endpoints speak JSON under `/api/v1`. Partial updates go through
//! PATCH with a `SamplePatch` body: omitted fields stay untouched on the
//! server, explicit nulls clear.

use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use fieldsamp_core::models::{Address, Project, Sample, SampleId, SamplePatch};

/// Errors from backend calls.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {message}")]
    Status {
        url: String,
        status: StatusCode,
        message: String,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no sample with cassette barcode '{0}'")]
    BarcodeNotFound(String),
}

/// Result type for backend calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP client for the sampling backend.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for the given base URL. `token`, when present, is
    /// sent as a bearer credential on every request.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    fn request(&self, method: Method, path: &str) -> (String, RequestBuilder) {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, &url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        (url, builder)
    }

    async fn send_json<T: DeserializeOwned>(
        url: String,
        builder: RequestBuilder,
    ) -> ApiResult<T> {
        let response = builder.send().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            let message = Self::error_detail(response).await;
            return Err(ApiError::Status {
                url,
                status,
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }

    async fn send_empty(url: String, builder: RequestBuilder) -> ApiResult<()> {
        let response = builder.send().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            let message = Self::error_detail(response).await;
            return Err(ApiError::Status {
                url,
                status,
                message,
            });
        }
        Ok(())
    }

    /// Pull the `detail` field out of an error body when present (the
    /// backend's usual shape), falling back to the raw text.
    async fn error_detail(response: reqwest::Response) -> String {
        let body = response.text().await.unwrap_or_default();
        serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .unwrap_or(body)
    }

    /// List every sample visible to the caller.
    pub async fn list_samples(&self) -> ApiResult<Vec<Sample>> {
        let (url, builder) = self.request(Method::GET, "/api/v1/samples");
        Self::send_json(url, builder).await
    }

    /// List samples for one address, optionally filtered to a single date.
    pub async fn samples_by_address(
        &self,
        address_id: i64,
        date: Option<NaiveDate>,
    ) -> ApiResult<Vec<Sample>> {
        let (url, mut builder) = self.request(Method::GET, "/api/v1/samples");
        builder = builder.query(&[("address_id", address_id.to_string())]);
        if let Some(date) = date {
            builder = builder.query(&[("date", date.to_string())]);
        }
        Self::send_json(url, builder).await
    }

    pub async fn get_sample(&self, id: SampleId) -> ApiResult<Sample> {
        let (url, builder) = self.request(Method::GET, &format!("/api/v1/samples/{id}"));
        Self::send_json(url, builder).await
    }

    /// Resolve a scanned cassette barcode to its full sample record: the
    /// analysis screen's scan flow (list, match barcode, fetch detail).
    pub async fn find_by_barcode(&self, barcode: &str) -> ApiResult<Sample> {
        let samples = self.list_samples().await?;
        let found = samples
            .iter()
            .find(|s| s.cassette_barcode.as_deref() == Some(barcode))
            .ok_or_else(|| ApiError::BarcodeNotFound(barcode.to_string()))?;
        self.get_sample(found.id).await
    }

    pub async fn create_sample(
        &self,
        address_id: i64,
        description: &str,
    ) -> ApiResult<Sample> {
        let (url, builder) = self.request(Method::POST, "/api/v1/samples");
        let body = serde_json::json!({
            "address_id": address_id,
            "description": description,
        });
        Self::send_json(url, builder.json(&body)).await
    }

    /// Partial update; returns the full updated record.
    pub async fn update_sample(&self, id: SampleId, patch: &SamplePatch) -> ApiResult<Sample> {
        let (url, builder) = self.request(Method::PATCH, &format!("/api/v1/samples/{id}"));
        Self::send_json(url, builder.json(patch)).await
    }

    pub async fn delete_sample(&self, id: SampleId) -> ApiResult<()> {
        let (url, builder) = self.request(Method::DELETE, &format!("/api/v1/samples/{id}"));
        Self::send_empty(url, builder).await
    }

    pub async fn get_project(&self, id: i64) -> ApiResult<Project> {
        let (url, builder) = self.request(Method::GET, &format!("/api/v1/projects/{id}"));
        Self::send_json(url, builder).await
    }

    pub async fn list_addresses(&self, project_id: i64) -> ApiResult<Vec<Address>> {
        let (url, builder) =
            self.request(Method::GET, &format!("/api/v1/projects/{project_id}/addresses"));
        Self::send_json(url, builder).await
    }

    pub async fn create_address(
        &self,
        project_id: i64,
        name: &str,
        date: NaiveDate,
    ) -> ApiResult<Address> {
        let (url, builder) =
            self.request(Method::POST, &format!("/api/v1/projects/{project_id}/addresses"));
        let body = serde_json::json!({
            "name": name,
            "date": date.to_string(),
        });
        Self::send_json(url, builder.json(&body)).await
    }
}
