//! 统一错误类型定义

use std::sync::PoisonError;

/// 应用错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // 认证错误
    #[error("认证失败: {0}")]
    Unauthorized(String),

    // 资源不存在
    #[error("资源不存在: {0}")]
    NotFound(String),

    // 参数验证错误
    #[error("参数无效: {0}")]
    ValidationError(String),

    // 冲突错误
    #[error("资源冲突: {0}")]
    Conflict(String),

    // 本地存储读写错误
    #[error("存储错误")]
    StorageError(#[from] std::io::Error),

    // 序列化错误
    #[error("序列化错误")]
    SerializationError(#[from] serde_json::Error),

    // 审计日志导出失败（对调用方只暴露通用信息）
    #[error("审计日志导出失败")]
    ExportFailed,

    // 内部错误
    #[error("内部错误: {0}")]
    InternalError(String),

    // 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),
}

impl AppError {
    /// 是否为调用方可处理的业务错误（而非内部故障）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Unauthorized(_)
                | AppError::NotFound(_)
                | AppError::ValidationError(_)
                | AppError::Conflict(_)
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl<T> From<PoisonError<T>> for AppError {
    fn from(_: PoisonError<T>) -> Self {
        AppError::InternalError("内部状态锁已损坏".to_string())
    }
}
