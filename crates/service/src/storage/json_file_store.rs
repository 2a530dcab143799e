use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use configs::{StoreConfig, WriteMode};
use models::UserStore;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, error, warn};

use super::{decode, encode, DocumentStore};
use crate::errors::ServiceError;

/// JSON file-backed user store.
///
/// Every `load` reads the whole file and every `save` rewrites it. With
/// [`WriteMode::Atomic`] the new document goes to `<file>.tmp` first and is
/// renamed over the target, so readers see either the old or the new
/// document and never a torn one.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    file_path: PathBuf,
    create_if_missing: bool,
    write_mode: WriteMode,
}

impl JsonFileStore {
    /// A store at `path` that treats a missing file as empty and writes atomically.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), create_if_missing: true, write_mode: WriteMode::Atomic }
    }

    pub fn from_config(cfg: &StoreConfig) -> Self {
        Self::new(cfg.path.clone())
            .with_create_if_missing(cfg.create_if_missing)
            .with_write_mode(cfg.write_mode)
    }

    pub fn with_create_if_missing(mut self, create_if_missing: bool) -> Self {
        self.create_if_missing = create_if_missing;
        self
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.file_path.file_name().map(OsString::from).unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }

    async fn ensure_parent(&self) -> Result<(), ServiceError> {
        match self.file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).await.map_err(|e| ServiceError::io(parent, e))
            }
            _ => Ok(()),
        }
    }

    async fn write_atomic(&self, data: &[u8]) -> Result<(), ServiceError> {
        let temp_path = self.temp_path();
        let replaced: Result<(), ServiceError> = async {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| ServiceError::io(&temp_path, e))?;
            file.write_all(data).await.map_err(|e| ServiceError::io(&temp_path, e))?;
            file.sync_all().await.map_err(|e| ServiceError::io(&temp_path, e))?;
            drop(file);
            fs::rename(&temp_path, &self.file_path).await.map_err(|e| ServiceError::io(&self.file_path, e))
        }
        .await;
        if let Err(e) = replaced {
            if let Err(rm) = fs::remove_file(&temp_path).await {
                if rm.kind() != ErrorKind::NotFound {
                    warn!(path = %temp_path.display(), error = %rm, "could not remove temp file");
                }
            }
            return Err(e);
        }
        self.sync_parent().await
    }

    /// Flush the directory entry so the rename itself survives a crash.
    #[cfg(unix)]
    async fn sync_parent(&self) -> Result<(), ServiceError> {
        let dir = match self.file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let handle = fs::File::open(&dir).await.map_err(|e| ServiceError::io(&dir, e))?;
        handle.sync_all().await.map_err(|e| ServiceError::io(&dir, e))
    }

    #[cfg(not(unix))]
    async fn sync_parent(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn write_truncate(&self, data: &[u8]) -> Result<(), ServiceError> {
        fs::write(&self.file_path, data).await.map_err(|e| ServiceError::io(&self.file_path, e))
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load(&self) -> Result<UserStore, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound && self.create_if_missing => {
                debug!(path = %self.file_path.display(), "store file missing; starting empty");
                return Ok(UserStore::default());
            }
            Err(e) => {
                error!(path = %self.file_path.display(), error = %e, "store read failed");
                return Err(ServiceError::io(&self.file_path, e));
            }
        };
        decode(&bytes).inspect_err(|e| {
            error!(path = %self.file_path.display(), error = %e, "store decode failed");
        })
    }

    async fn save(&self, store: &UserStore) -> Result<(), ServiceError> {
        let data = encode(store)?;
        self.ensure_parent().await?;
        let written = match self.write_mode {
            WriteMode::Atomic => self.write_atomic(&data).await,
            WriteMode::Truncate => self.write_truncate(&data).await,
        };
        match &written {
            Ok(()) => debug!(
                path = %self.file_path.display(),
                bytes = data.len(),
                users = store.len(),
                increment = store.increment,
                "store saved"
            ),
            Err(e) => error!(path = %self.file_path.display(), error = %e, "store write failed"),
        }
        written
    }
}
