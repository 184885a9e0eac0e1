//! cipherdrop-client: the initiating side of the protocol
//!
//! ```no_run
//! # async fn demo() -> Result<(), cipherdrop_client::ClientError> {
//! let mut client = cipherdrop_client::Client::new("http://127.0.0.1:3001")?;
//! client.handshake().await?;
//! client.upload("report.pdf", b"%PDF-1.7").await?;
//! let contents = client.download("report.pdf").await?;
//! # Ok(()) }
//! ```
//!
//! Plaintext and the session key never leave this process; the relay and the
//! network only carry public points and envelopes.

mod error;

pub use error::{ClientError, ClientResult};

use cipherdrop_core::api::{
    decode_public_key, encode_public_key, paths, DownloadResponse, ErrorResponse,
    ExchangeKeysRequest, ExchangeKeysResponse, MessageResponse, UploadRequest, WireEnvelope,
};
use cipherdrop_crypto::{open, seal, Handshake, SharedKey};
use reqwest::{Response, Url};
use tracing::{debug, info};

pub struct Client {
    http: reqwest::Client,
    base: Url,
    session: Option<SharedKey>,
}

impl Client {
    /// Point a client at a relay (or directly at a storage tier).
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_http(base_url, reqwest::Client::new())
    }

    pub fn with_http(base_url: &str, http: reqwest::Client) -> ClientResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| ClientError::Failed(format!("invalid base URL {base_url}: {e}")))?;
        Ok(Self {
            http,
            base,
            session: None,
        })
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Run a fresh key agreement, replacing any previous session key.
    pub async fn handshake(&mut self) -> ClientResult<()> {
        let handshake = Handshake::begin();
        let request = ExchangeKeysRequest {
            public_key: encode_public_key(handshake.public_key()),
        };

        let response = self
            .http
            .post(self.endpoint(paths::EXCHANGE_KEYS, None)?)
            .json(&request)
            .send()
            .await?;
        let body: ExchangeKeysResponse = check(response).await?.json().await?;

        let remote = decode_public_key(&body.public_key)?;
        self.session = Some(handshake.complete(&remote)?);
        info!(server = %self.base, "session key established");
        Ok(())
    }

    /// Seal `contents` and upload them as `filename`. Returns the server's message.
    pub async fn upload(&self, filename: &str, contents: &[u8]) -> ClientResult<String> {
        let envelope = seal(contents, self.session()?)?;
        let request = UploadRequest {
            envelope: WireEnvelope::encode(&envelope),
            filename: filename.to_string(),
        };

        let response = self
            .http
            .post(self.endpoint(paths::UPLOAD, None)?)
            .json(&request)
            .send()
            .await?;
        let body: MessageResponse = check(response).await?.json().await?;

        debug!(filename = %filename, bytes = contents.len(), "uploaded");
        Ok(body.message)
    }

    /// Fetch `filename` and open it with the session key.
    pub async fn download(&self, filename: &str) -> ClientResult<Vec<u8>> {
        let key = self.session()?;

        let url = self.endpoint(paths::DOWNLOAD, Some(filename))?;

        let response = self.http.get(url).send().await?;
        let body: DownloadResponse = check(response).await?.json().await?;

        let plaintext = open(&body.envelope.decode()?, key)?;
        debug!(filename = %filename, bytes = plaintext.len(), "downloaded");
        Ok(plaintext)
    }

    /// Names currently registered on the storage tier.
    pub async fn list(&self) -> ClientResult<Vec<String>> {
        let response = self.http.get(self.endpoint(paths::FILES, None)?).send().await?;
        Ok(check(response).await?.json().await?)
    }

    fn session(&self) -> ClientResult<&SharedKey> {
        self.session.as_ref().ok_or(ClientError::NoSession)
    }

    /// `path` appended below the base URL's own path, plus `name` as one
    /// percent-encoded segment.
    fn endpoint(&self, path: &str, name: Option<&str>) -> ClientResult<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ClientError::Failed(format!("{} cannot carry a path", self.base))
            })?;
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()));
            if let Some(name) = name {
                segments.push(name);
            }
        }
        Ok(url)
    }
}

/// Pass 2xx responses through, turn anything else into a `ClientError`.
async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => String::new(),
    };
    Err(ClientError::from_status(status.as_u16(), &detail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = Client::new("http://gw.internal/relay").unwrap();
        assert_eq!(
            client.endpoint(paths::FILES, None).unwrap().as_str(),
            "http://gw.internal/relay/api/files"
        );

        let client = Client::new("http://gw.internal/relay/").unwrap();
        assert_eq!(
            client
                .endpoint(paths::DOWNLOAD, Some("q3 report#1.pdf"))
                .unwrap()
                .as_str(),
            "http://gw.internal/relay/api/download/q3%20report%231.pdf"
        );
    }

    #[test]
    fn test_endpoint_at_root() {
        let client = Client::new("http://127.0.0.1:3001").unwrap();
        assert_eq!(
            client.endpoint(paths::UPLOAD, None).unwrap().as_str(),
            "http://127.0.0.1:3001/api/upload"
        );
    }

    #[test]
    fn test_endpoint_rejects_opaque_base() {
        let client = Client::new("mailto:ops@example.com").unwrap();
        assert!(matches!(
            client.endpoint(paths::FILES, None),
            Err(ClientError::Failed(_))
        ));
    }
}
