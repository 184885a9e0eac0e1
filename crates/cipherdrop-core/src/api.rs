//! HTTP wire contract shared by both tiers and the client.
//!
//! All binary values travel as standard (padded) base64 strings inside JSON.
//! Field names are camelCase on the wire (`publicKey`, `authTag`).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use cipherdrop_crypto::{CryptoError, CryptoResult, Envelope};
use serde::{Deserialize, Serialize};

/// Request and response bodies are capped at 50 MiB on every hop.
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

pub mod paths {
    pub const EXCHANGE_KEYS: &str = "/api/exchange-keys";
    pub const UPLOAD: &str = "/api/upload";
    /// Followed by `/{fileName}`
    pub const DOWNLOAD: &str = "/api/download";
    pub const FILES: &str = "/api/files";
    pub const HEALTHZ: &str = "/healthz";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeKeysRequest {
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeKeysResponse {
    pub public_key: String,
}

/// The three envelope fields, base64-encoded and kept separate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEnvelope {
    pub data: String,
    pub iv: String,
    pub auth_tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    #[serde(flatten)]
    pub envelope: WireEnvelope,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadResponse {
    #[serde(flatten)]
    pub envelope: WireEnvelope,
    /// Set by the relay once it has mirrored the envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl WireEnvelope {
    pub fn encode(envelope: &Envelope) -> Self {
        Self {
            data: STANDARD.encode(&envelope.ciphertext),
            iv: STANDARD.encode(envelope.nonce),
            auth_tag: STANDARD.encode(envelope.tag),
        }
    }

    /// Undecodable base64 is indistinguishable from a bad tag to the caller.
    pub fn decode(&self) -> CryptoResult<Envelope> {
        let ciphertext = STANDARD
            .decode(&self.data)
            .map_err(|_| CryptoError::Decryption)?;
        let nonce = STANDARD
            .decode(&self.iv)
            .map_err(|_| CryptoError::Decryption)?;
        let tag = STANDARD
            .decode(&self.auth_tag)
            .map_err(|_| CryptoError::Decryption)?;
        Envelope::from_parts(&nonce, ciphertext, &tag)
    }
}

pub fn encode_public_key(point: &[u8]) -> String {
    STANDARD.encode(point)
}

pub fn decode_public_key(encoded: &str) -> CryptoResult<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|_| CryptoError::InvalidPublicKey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipherdrop_crypto::{seal, SharedKey};

    #[test]
    fn test_upload_request_field_names() {
        let req = UploadRequest {
            envelope: WireEnvelope {
                data: "ZGF0YQ==".into(),
                iv: "aXY=".into(),
                auth_tag: "dGFn".into(),
            },
            filename: "a.txt".into(),
        };
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["data"], "ZGF0YQ==");
        assert_eq!(json["iv"], "aXY=");
        assert_eq!(json["authTag"], "dGFn");
        assert_eq!(json["filename"], "a.txt");
    }

    #[test]
    fn test_parse_browser_upload_body() {
        let body = r#"{"data":"AAE=","iv":"AAAAAAAAAAAAAAAAAAAAAA==","authTag":"AAAAAAAAAAAAAAAAAAAAAA==","filename":"report.pdf"}"#;
        let req: UploadRequest = serde_json::from_str(body).unwrap();

        assert_eq!(req.filename, "report.pdf");
        let envelope = req.envelope.decode().unwrap();
        assert_eq!(envelope.ciphertext, vec![0x00, 0x01]);
    }

    #[test]
    fn test_exchange_keys_camel_case() {
        let json = serde_json::to_string(&ExchangeKeysRequest {
            public_key: "BAE=".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"publicKey":"BAE="}"#);
    }

    #[test]
    fn test_download_response_message_optional() {
        let envelope = WireEnvelope {
            data: String::new(),
            iv: String::new(),
            auth_tag: String::new(),
        };
        let backend = serde_json::to_value(DownloadResponse {
            envelope: envelope.clone(),
            message: None,
        })
        .unwrap();
        assert!(backend.get("message").is_none());

        let parsed: DownloadResponse =
            serde_json::from_str(r#"{"data":"","iv":"","authTag":"","message":"stored"}"#).unwrap();
        assert_eq!(parsed.message.as_deref(), Some("stored"));
        assert_eq!(parsed.envelope, envelope);
    }

    #[test]
    fn test_wire_envelope_preserves_sealed_bytes() {
        let key = SharedKey::generate();
        let envelope = seal(b"payload", &key).unwrap();

        let wire = WireEnvelope::encode(&envelope);
        assert_eq!(wire.decode().unwrap(), envelope);
    }

    #[test]
    fn test_malformed_base64_is_decryption_error() {
        let wire = WireEnvelope {
            data: "not base64!".into(),
            iv: "AAAAAAAAAAAAAAAAAAAAAA==".into(),
            auth_tag: "AAAAAAAAAAAAAAAAAAAAAA==".into(),
        };
        assert_eq!(wire.decode(), Err(CryptoError::Decryption));
    }

    #[test]
    fn test_bad_public_key_encoding() {
        assert_eq!(
            decode_public_key("%%%"),
            Err(CryptoError::InvalidPublicKey)
        );
        assert_eq!(decode_public_key("BAE=").unwrap(), vec![0x04, 0x01]);
    }
}
