use super::{ContentStore, StoreError};
use crate::core::types::StoreLocation;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

const ERROR_CODE_HEADER: &str = "x-ms-error-code";
const CONTAINER_NOT_FOUND: &str = "ContainerNotFound";

/// Blob service reached over HTTP: `GET <base>/<container>/<directory>/<name>[?sas]`.
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    http: reqwest::Client,
    base_url: Url,
    sas_token: Option<String>,
}

impl HttpBlobStore {
    pub fn new(base_url: &str, sas_token: Option<String>, timeout: Duration) -> crate::Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("blob store base url {} cannot carry a path", base_url);
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let sas_token = sas_token
            .map(|token| token.trim_start_matches('?').to_string())
            .filter(|token| !token.is_empty());
        Ok(HttpBlobStore {
            http,
            base_url,
            sas_token,
        })
    }

    /// URL of the blob at `location`.
    pub fn blob_url(&self, location: &StoreLocation) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                StoreError::Unavailable(format!("invalid blob store url {}", self.base_url))
            })?;
            segments.pop_if_empty();
            segments.push(&location.container);
            for segment in location.directory_segments() {
                segments.push(segment);
            }
            segments.push(&location.name);
        }
        url.set_query(self.sas_token.as_deref());
        Ok(url)
    }
}

#[async_trait]
impl ContentStore for HttpBlobStore {
    async fn fetch(&self, location: &StoreLocation) -> Result<Vec<u8>, StoreError> {
        let url = self.blob_url(location)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let code = response
                .headers()
                .get(ERROR_CODE_HEADER)
                .and_then(|value| value.to_str().ok());
            return Err(if code == Some(CONTAINER_NOT_FOUND) {
                StoreError::ContainerNotFound(location.container.clone())
            } else {
                StoreError::NotFound(location.clone())
            });
        }
        if !status.is_success() {
            return Err(StoreError::Unavailable(format!(
                "blob store answered {} for {}",
                status, location
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}
