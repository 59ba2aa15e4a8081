//! 会话快照存储

use crate::errors::AppError;
use crate::models::AdminSession;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 会话快照存储接口（单个键，无版本）
#[async_trait]
pub trait SessionSnapshotStore: Send + Sync {
    async fn load(&self) -> Result<Option<AdminSession>, AppError>;
    async fn save(&self, session: &AdminSession) -> Result<(), AppError>;
    async fn clear(&self) -> Result<(), AppError>;
}

/// 基于本地文件的会话快照存储
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionSnapshotStore for FileSessionStore {
    async fn load(&self) -> Result<Option<AdminSession>, AppError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::StorageError(e)),
        }
    }

    async fn save(&self, session: &AdminSession) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec(session)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::StorageError(e)),
        }
    }
}
