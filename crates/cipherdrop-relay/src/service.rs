//! RelayService: forwards every call to the storage tier unchanged.
//!
//! The relay never holds a key. Request and response bodies are parsed only
//! to validate their shape and pick out the file name; every field is passed
//! on exactly as received.

use anyhow::{bail, Context};
use cipherdrop_core::{
    api::{
        paths, DownloadResponse, ErrorResponse, ExchangeKeysRequest, ExchangeKeysResponse,
        MessageResponse, UploadRequest,
    },
    config::RelayConfig,
    validate_file_name,
};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{RelayError, RelayResult};
use crate::mirror::Mirror;

pub const UPLOAD_STORED_MESSAGE: &str = "Encrypted data from upload stored successfully!";
pub const DOWNLOAD_STORED_MESSAGE: &str = "Encrypted data from download stored successfully!";

pub struct RelayService {
    http: reqwest::Client,
    backend: Url,
    uploads: Mirror,
    downloads: Mirror,
}

impl RelayService {
    pub fn new(config: &RelayConfig) -> anyhow::Result<Self> {
        let backend = Url::parse(&config.backend_url)
            .with_context(|| format!("parsing backend_url {}", config.backend_url))?;
        if backend.cannot_be_a_base() {
            bail!("backend_url {} cannot carry a path", config.backend_url);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("building HTTP client")?;

        let uploads = Mirror::open(&config.uploads_mirror).with_context(|| {
            format!("creating uploads mirror {}", config.uploads_mirror.display())
        })?;
        let downloads = Mirror::open(&config.downloads_mirror).with_context(|| {
            format!(
                "creating downloads mirror {}",
                config.downloads_mirror.display()
            )
        })?;

        info!(backend = %backend, timeout_secs = config.timeout_secs, "relay configured");
        Ok(Self {
            http,
            backend,
            uploads,
            downloads,
        })
    }

    pub fn backend(&self) -> &Url {
        &self.backend
    }

    pub async fn exchange_keys(
        &self,
        request: &ExchangeKeysRequest,
    ) -> RelayResult<ExchangeKeysResponse> {
        let url = self.endpoint(paths::EXCHANGE_KEYS, None);
        let response = self.forward(self.http.post(url).json(request)).await?;
        debug!("key exchange forwarded");
        Ok(response)
    }

    /// Forward an upload, then mirror the envelope that was accepted.
    pub async fn upload(&self, request: &UploadRequest) -> RelayResult<MessageResponse> {
        validate_file_name(&request.filename)?;

        let url = self.endpoint(paths::UPLOAD, None);
        let _: MessageResponse = self.forward(self.http.post(url).json(request)).await?;

        self.uploads
            .store_or_warn(&request.filename, &request.envelope)
            .await;
        info!(filename = %request.filename, "upload forwarded");

        Ok(MessageResponse {
            message: UPLOAD_STORED_MESSAGE.to_string(),
        })
    }

    /// Fetch an envelope from the storage tier and mirror it before answering.
    pub async fn download(&self, filename: &str) -> RelayResult<DownloadResponse> {
        validate_file_name(filename)?;

        let url = self.endpoint(paths::DOWNLOAD, Some(filename));
        let response: DownloadResponse = self.forward(self.http.get(url)).await?;

        self.downloads
            .store_or_warn(filename, &response.envelope)
            .await;
        info!(filename = %filename, "download forwarded");

        Ok(DownloadResponse {
            envelope: response.envelope,
            message: Some(DOWNLOAD_STORED_MESSAGE.to_string()),
        })
    }

    pub async fn list_files(&self) -> RelayResult<Vec<String>> {
        let url = self.endpoint(paths::FILES, None);
        self.forward(self.http.get(url)).await
    }

    async fn forward<T: DeserializeOwned>(&self, request: RequestBuilder) -> RelayResult<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("backend error")
                    .to_string(),
            };
            return Err(RelayError::Backend { status, message });
        }
        Ok(response.json().await?)
    }

    /// Backend URL for `path`, with `name` appended as one percent-encoded segment.
    fn endpoint(&self, path: &str, name: Option<&str>) -> Url {
        let mut url = self.backend.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()));
            if let Some(name) = name {
                segments.push(name);
            }
        }
        url
    }
}
