use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::traits::{AugmentRequest, Augmenter};
use crate::brief::RemoteAnalysis;
use crate::error::{AppError, Result};

/// Augmenter that POSTs the brief and local context as JSON to a fixed endpoint.
pub struct HttpAugmenter {
    client: Client,
    url: Url,
    auth_token: Option<String>,
}

impl HttpAugmenter {
    pub fn new(url: &str, timeout: Duration, auth_token: Option<String>) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url: Url::parse(url)?,
            auth_token,
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| AppError::Config(format!("Invalid augmentation token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Augmenter for HttpAugmenter {
    async fn augment(&self, request: &AugmentRequest) -> Result<Option<RemoteAnalysis>> {
        debug!("Sending brief to augmentation backend at {}", self.url);

        let res = self
            .client
            .post(self.url.clone())
            .headers(self.headers()?)
            .json(request)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Http(format!(
                "Augmentation request failed with status {}: {}",
                status, body
            )));
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = res.text().await?;
        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&body)?))
    }
}
