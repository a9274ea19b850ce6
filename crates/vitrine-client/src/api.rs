//! HTTP client for the gallery API.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use vitrine_shared::{ApiResponse, ImageId, ImageRecord, NewStorageRequest, StorageRequest};

use crate::config::GalleryConfig;
use crate::error::{ClientError, Result};

#[derive(Debug, Clone)]
pub struct GalleryApi {
    base_url: String,
    http: reqwest::Client,
    timeout: Duration,
}

impl GalleryApi {
    pub fn new(config: &GalleryConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: &GalleryConfig, http: reqwest::Client) -> Self {
        Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            http,
            timeout: config.request_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `GET /api/images`: the whole catalog, ascending by number.
    pub async fn list_images(&self) -> Result<Vec<ImageRecord>> {
        let url = format!("{}/api/images", self.base_url);
        let images: Vec<ImageRecord> = self
            .bounded(async {
                let resp = self.http.get(&url).send().await?;
                decode(resp).await
            })
            .await?;
        debug!(count = images.len(), "catalog fetched");
        Ok(images)
    }

    /// `GET /api/images/{id}`. `None` when the server doesn't know the id.
    pub async fn get_image(&self, id: &ImageId) -> Result<Option<ImageRecord>> {
        let url = format!("{}/api/images/{}", self.base_url, id);
        self.bounded(async {
            let resp = self.http.get(&url).send().await?;
            if resp.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            decode(resp).await.map(Some)
        })
        .await
    }

    /// Validate `form` locally, then `POST /api/storage-requests`.
    ///
    /// A form that fails validation is rejected without any request.
    pub async fn submit_storage_request(&self, form: &NewStorageRequest) -> Result<StorageRequest> {
        form.validate()?;

        let url = format!("{}/api/storage-requests", self.base_url);
        let body: ApiResponse<StorageRequest> = self
            .bounded(async {
                let resp = self.http.post(&url).json(form).send().await?;
                decode(resp).await
            })
            .await?;

        match body.data {
            Some(request) if body.success => {
                debug!(id = %request.id, code = %request.image_code, "storage request accepted");
                Ok(request)
            }
            _ => Err(ClientError::Status {
                status: StatusCode::OK.as_u16(),
                message: body
                    .error
                    .unwrap_or_else(|| "storage request rejected".to_string()),
            }),
        }
    }

    async fn bounded<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))?
    }
}

/// Parse a success body, or turn an error status into `ClientError::Status`
/// carrying the server's `error` message when there is one.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&text)
        .ok()
        .and_then(|body| body.error)
        .unwrap_or(text);
    warn!(status = status.as_u16(), %message, "gallery API error");
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_api() -> GalleryApi {
        // Port 9 (discard) on loopback; nothing is listening in the test env.
        let config = GalleryConfig {
            api_url: "http://127.0.0.1:9/".into(),
            request_timeout: Duration::from_secs(2),
            ..GalleryConfig::default()
        };
        GalleryApi::new(&config)
    }

    #[test]
    fn base_url_is_normalised() {
        assert_eq!(unreachable_api().base_url(), "http://127.0.0.1:9");
    }

    #[tokio::test]
    async fn invalid_form_never_leaves_the_client() {
        let api = unreachable_api();
        let form = NewStorageRequest {
            email: "not-an-email".into(),
            image_code: "S-1".into(),
            reason: "keep it".into(),
        };
        let err = api.submit_storage_request(&form).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
