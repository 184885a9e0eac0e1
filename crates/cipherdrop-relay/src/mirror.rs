//! Relay-local copies of the envelopes that pass through.
//!
//! Only the encrypted JSON envelope is ever written here. The relay holds no
//! key, so a mirror is useless without the client that sealed it.

use cipherdrop_core::{api::WireEnvelope, validate_file_name};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Mirror {
    dir: PathBuf,
}

impl Mirror {
    pub fn open(dir: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `envelope` as `<dir>/<name>`, replacing an older copy.
    pub async fn store(&self, name: &str, envelope: &WireEnvelope) -> io::Result<()> {
        let name = validate_file_name(name)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let json = serde_json::to_vec(envelope)?;

        let dest = self.dir.join(name);
        let tmp = self.dir.join(format!(".{}.partial", Uuid::new_v4()));
        tokio::fs::write(&tmp, &json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &dest).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }

        debug!(path = %dest.display(), bytes = json.len(), "envelope mirrored");
        Ok(())
    }

    /// Mirror failures never fail the forward that produced the envelope.
    pub async fn store_or_warn(&self, name: &str, envelope: &WireEnvelope) {
        if let Err(e) = self.store(name, envelope).await {
            warn!(dir = %self.dir.display(), name = %name, "mirror write failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope() -> WireEnvelope {
        WireEnvelope {
            data: "c2VjcmV0".into(),
            iv: "AAAAAAAAAAAAAAAAAAAAAA==".into(),
            auth_tag: "EREREREREREREREREREREQ==".into(),
        }
    }

    #[tokio::test]
    async fn test_store_writes_json_envelope() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mirror = Mirror::open(&tmp.path().join("uploads")).unwrap();

        mirror.store("report.pdf", &envelope()).await.unwrap();

        let raw = std::fs::read(mirror.dir().join("report.pdf")).unwrap();
        let stored: WireEnvelope = serde_json::from_slice(&raw).unwrap();
        assert_eq!(stored, envelope());
        assert_eq!(std::fs::read_dir(mirror.dir()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_store_longest_valid_name() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mirror = Mirror::open(&tmp.path().join("downloads")).unwrap();
        let name = "x".repeat(255);

        mirror.store(&name, &envelope()).await.unwrap();

        assert!(mirror.dir().join(&name).is_file());
        assert_eq!(std::fs::read_dir(mirror.dir()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_store_refuses_escaping_names() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mirror = Mirror::open(&tmp.path().join("uploads")).unwrap();

        let err = mirror.store("../outside", &envelope()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(!tmp.path().join("outside").exists());
    }

    #[tokio::test]
    async fn test_store_or_warn_swallows_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mirror = Mirror::open(&tmp.path().join("uploads")).unwrap();
        std::fs::remove_dir_all(mirror.dir()).unwrap();

        // Directory gone: logged, not propagated
        mirror.store_or_warn("a.txt", &envelope()).await;
        assert!(!mirror.dir().exists());
    }
}
