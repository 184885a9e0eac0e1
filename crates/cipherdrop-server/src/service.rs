//! TransferService: the storage tier's operations, independent of HTTP.

use cipherdrop_core::{config::ServerConfig, validate_file_name};
use cipherdrop_crypto::{open, respond, seal, Envelope, SharedKey};
use cipherdrop_storage::{Catalog, FileStore, Registry};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{TransferError, TransferResult};
use crate::key_store::{new_shared, SharedKeyStore};

pub struct TransferService {
    key: SharedKeyStore,
    store: FileStore,
    catalog: Arc<Catalog>,
}

impl TransferService {
    /// Open the file store and registry under `config.data_dir` and bring the
    /// registry in line with what is on disk. Must finish before serving.
    pub fn start(config: &ServerConfig) -> TransferResult<Self> {
        let store = FileStore::open(&config.uploads_dir(), &config.staging_dir())?;
        let registry = Registry::open(&config.registry_path())?;
        let catalog = Arc::new(Catalog::new(registry));
        catalog.reconcile_with(&store)?;

        info!(
            data_dir = %config.data_dir.display(),
            files = catalog.len(),
            "transfer service ready"
        );

        Ok(Self {
            key: new_shared(),
            store,
            catalog,
        })
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Answer a client handshake and install the resulting key, replacing any
    /// previous one. Returns our public point.
    pub async fn exchange_keys(&self, remote_public: &[u8]) -> TransferResult<Vec<u8>> {
        let (local_public, key) = respond(remote_public)?;
        let replaced = self.key.write().await.replace(key).is_some();
        info!(replaced, "shared key established");
        Ok(local_public)
    }

    /// Open `envelope` and store its plaintext under `filename`.
    pub async fn upload(&self, filename: &str, envelope: &Envelope) -> TransferResult<()> {
        validate_file_name(filename)?;
        let key = self.current_key().await?;
        let plaintext = open(envelope, &key)?;

        let claim = self.catalog.claim(filename)?;
        self.store.write(claim.name(), &plaintext).await?;
        tokio::task::spawn_blocking(move || claim.commit()).await??;

        info!(filename = %filename, bytes = plaintext.len(), "file uploaded");
        Ok(())
    }

    /// Seal the stored file under a fresh nonce.
    ///
    /// Reads the store directly; a name missing from the registry but present
    /// on disk is still served.
    pub async fn download(&self, filename: &str) -> TransferResult<Envelope> {
        validate_file_name(filename)?;
        let plaintext = self.store.read(filename).await?;
        let key = self.current_key().await?;
        let envelope = seal(&plaintext, &key)?;

        debug!(filename = %filename, bytes = plaintext.len(), "file sealed for download");
        Ok(envelope)
    }

    pub fn list_files(&self) -> Vec<String> {
        self.catalog.list_all()
    }

    /// Snapshot of the key at the start of a transfer.
    async fn current_key(&self) -> TransferResult<SharedKey> {
        self.key
            .read()
            .await
            .clone()
            .ok_or(TransferError::NoSharedKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipherdrop_crypto::Handshake;
    use tempfile::TempDir;

    fn config(tmp: &TempDir) -> ServerConfig {
        ServerConfig {
            data_dir: tmp.path().to_path_buf(),
            ..ServerConfig::default()
        }
    }

    async fn service_with_key(tmp: &TempDir) -> (TransferService, SharedKey) {
        let service = TransferService::start(&config(tmp)).unwrap();
        let client = Handshake::begin();
        let server_public = service.exchange_keys(client.public_key()).await.unwrap();
        let key = client.complete(&server_public).unwrap();
        (service, key)
    }

    #[tokio::test]
    async fn test_upload_download_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let (service, key) = service_with_key(&tmp).await;
        let contents = b"%PDF-1.7 quarterly numbers".to_vec();

        service
            .upload("report.pdf", &seal(&contents, &key).unwrap())
            .await
            .unwrap();

        assert_eq!(service.list_files(), vec!["report.pdf".to_string()]);
        assert_eq!(
            std::fs::read(tmp.path().join("uploads/report.pdf")).unwrap(),
            contents
        );

        let envelope = service.download("report.pdf").await.unwrap();
        assert_eq!(open(&envelope, &key).unwrap(), contents);
    }

    #[tokio::test]
    async fn test_download_uses_fresh_nonce() {
        let tmp = TempDir::new().unwrap();
        let (service, key) = service_with_key(&tmp).await;
        service
            .upload("a.txt", &seal(b"same", &key).unwrap())
            .await
            .unwrap();

        let first = service.download("a.txt").await.unwrap();
        let second = service.download("a.txt").await.unwrap();
        assert_ne!(first.nonce, second.nonce);
    }

    #[tokio::test]
    async fn test_duplicate_upload_rejected_and_file_kept() {
        let tmp = TempDir::new().unwrap();
        let (service, key) = service_with_key(&tmp).await;

        service
            .upload("a.txt", &seal(b"first", &key).unwrap())
            .await
            .unwrap();
        let err = service
            .upload("a.txt", &seal(b"second", &key).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::DuplicateName(_)));
        assert_eq!(std::fs::read(tmp.path().join("uploads/a.txt")).unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_wrong_key_upload_leaves_no_trace() {
        let tmp = TempDir::new().unwrap();
        let (service, _key) = service_with_key(&tmp).await;

        let err = service
            .upload("a.txt", &seal(b"x", &SharedKey::generate()).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::Decryption));
        assert!(service.list_files().is_empty());
        assert!(!tmp.path().join("uploads/a.txt").exists());
    }

    #[tokio::test]
    async fn test_upload_without_handshake() {
        let tmp = TempDir::new().unwrap();
        let service = TransferService::start(&config(&tmp)).unwrap();

        let err = service
            .upload("a.txt", &seal(b"x", &SharedKey::generate()).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::NoSharedKey));
    }

    #[tokio::test]
    async fn test_invalid_names_rejected() {
        let tmp = TempDir::new().unwrap();
        let (service, key) = service_with_key(&tmp).await;

        for name in ["", "..", "../etc/passwd", "dir/file"] {
            let err = service
                .upload(name, &seal(b"x", &key).unwrap())
                .await
                .unwrap_err();
            assert!(matches!(err, TransferError::InvalidName(_)), "{name:?}");
        }
        assert!(matches!(
            service.download("../registry.json").await,
            Err(TransferError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn test_download_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let (service, _key) = service_with_key(&tmp).await;

        assert!(matches!(
            service.download("ghost.bin").await,
            Err(TransferError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rehandshake_replaces_key() {
        let tmp = TempDir::new().unwrap();
        let (service, old_key) = service_with_key(&tmp).await;

        let client = Handshake::begin();
        let server_public = service.exchange_keys(client.public_key()).await.unwrap();
        let new_key = client.complete(&server_public).unwrap();

        assert!(matches!(
            service
                .upload("old.txt", &seal(b"x", &old_key).unwrap())
                .await,
            Err(TransferError::Decryption)
        ));
        service
            .upload("new.txt", &seal(b"x", &new_key).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_remote_point_keeps_old_key() {
        let tmp = TempDir::new().unwrap();
        let (service, key) = service_with_key(&tmp).await;

        assert!(matches!(
            service.exchange_keys(&[0x04; 10]).await,
            Err(TransferError::Handshake(_))
        ));
        service
            .upload("still-works.txt", &seal(b"x", &key).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_start_reconciles_with_disk() {
        let tmp = TempDir::new().unwrap();
        {
            let (service, key) = service_with_key(&tmp).await;
            for name in ["x.bin", "z.bin"] {
                service
                    .upload(name, &seal(name.as_bytes(), &key).unwrap())
                    .await
                    .unwrap();
            }
        }
        std::fs::remove_file(tmp.path().join("uploads/z.bin")).unwrap();
        std::fs::write(tmp.path().join("uploads/y.bin"), b"dropped in").unwrap();

        let service = TransferService::start(&config(&tmp)).unwrap();
        assert_eq!(
            service.list_files(),
            vec!["x.bin".to_string(), "y.bin".to_string()]
        );
    }

    #[tokio::test]
    async fn test_concurrent_same_name_single_winner() {
        let tmp = TempDir::new().unwrap();
        let (service, key) = service_with_key(&tmp).await;
        let service = Arc::new(service);

        let mut tasks = Vec::new();
        for i in 0..8u8 {
            let service = service.clone();
            let envelope = seal(&[i; 64], &key).unwrap();
            tasks.push(tokio::spawn(async move {
                service.upload("race.bin", &envelope).await
            }));
        }

        let mut ok = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(()) => ok += 1,
                Err(TransferError::DuplicateName(_)) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(service.list_files(), vec!["race.bin".to_string()]);
    }
}
