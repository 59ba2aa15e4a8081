//! 应用配置加载和管理

use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use validator::{Validate, ValidationError};

use crate::errors::AppError;

/// 应用配置结构
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct Settings {
    #[serde(default)]
    #[validate]
    pub logging: LoggingSettings,
    #[serde(default)]
    #[validate]
    pub audit: AuditSettings,
    #[serde(default)]
    #[validate]
    pub session: SessionSettings,
    #[serde(default)]
    #[validate]
    pub pricing: PricingSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` 或 `json`
    #[serde(default = "default_log_format")]
    #[validate(custom = "validate_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "pretty".to_string() }

fn validate_log_format(format: &str) -> Result<(), ValidationError> {
    match format {
        "pretty" | "json" => Ok(()),
        _ => Err(ValidationError::new("unsupported_log_format")),
    }
}

/// 审计日志配置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AuditSettings {
    /// 日志保留天数
    #[serde(default = "default_retention_days")]
    #[validate(range(min = 1, max = 3650, message = "保留天数应在 1-3650 之间"))]
    pub retention_days: u32,
    /// 默认分页大小
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 1000, message = "分页大小应在 1-1000 之间"))]
    pub default_page_size: usize,
    /// 最多保留的安全预警数量
    #[serde(default = "default_max_alerts")]
    #[validate(range(min = 1, max = 10000))]
    pub max_alerts: usize,
    /// 审计日志落盘文件（JSON Lines），不配置则只保存在内存
    #[serde(default)]
    pub sink_path: Option<PathBuf>,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            default_page_size: default_page_size(),
            max_alerts: default_max_alerts(),
            sink_path: None,
        }
    }
}

fn default_retention_days() -> u32 { 90 }
fn default_page_size() -> usize { 50 }
fn default_max_alerts() -> usize { 100 }

/// 管理员会话配置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SessionSettings {
    /// 无操作超时（分钟）
    #[serde(default = "default_session_timeout")]
    #[validate(range(min = 1, max = 1440, message = "会话超时应在 1-1440 分钟之间"))]
    pub session_timeout_minutes: i64,
    /// 超时前多久提示（分钟）
    #[serde(default = "default_session_warning")]
    #[validate(range(min = 0, max = 1440))]
    pub session_warning_minutes: i64,
    /// 敏感操作是否要求近期认证
    #[serde(default = "default_true")]
    pub require_reauth_for_sensitive_actions: bool,
    /// 敏感操作允许的最长无操作时间（分钟）
    #[serde(default = "default_reauth_window")]
    #[validate(range(min = 1, max = 1440))]
    pub reauth_window_minutes: i64,
    /// 会话存活检查间隔（秒）
    #[serde(default = "default_liveness_check")]
    #[validate(range(min = 1, max = 3600))]
    pub liveness_check_seconds: u64,
    /// 最大并发会话数（当前实现只跟踪单个会话）
    #[serde(default = "default_max_sessions")]
    #[validate(range(min = 1, max = 100))]
    pub max_concurrent_sessions: u32,
    /// 会话快照保存路径
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            session_timeout_minutes: default_session_timeout(),
            session_warning_minutes: default_session_warning(),
            require_reauth_for_sensitive_actions: true,
            reauth_window_minutes: default_reauth_window(),
            liveness_check_seconds: default_liveness_check(),
            max_concurrent_sessions: default_max_sessions(),
            snapshot_path: default_snapshot_path(),
        }
    }
}

fn default_session_timeout() -> i64 { 30 }
fn default_session_warning() -> i64 { 5 }
fn default_reauth_window() -> i64 { 5 }
fn default_liveness_check() -> u64 { 60 }
fn default_max_sessions() -> u32 { 1 }
fn default_snapshot_path() -> PathBuf { PathBuf::from("data/admin_session.json") }
fn default_true() -> bool { true }

/// 订单计价配置（金额单位：分）
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PricingSettings {
    /// 增值税率（基点，500 = 5%）
    #[serde(default = "default_vat_rate")]
    #[validate(range(min = 0, max = 10000))]
    pub vat_rate_bps: u32,
    /// 配送费
    #[serde(default = "default_delivery_charge")]
    #[validate(range(min = 0))]
    pub delivery_charge: i64,
    /// 免配送费门槛（折后小计）
    #[serde(default = "default_free_delivery_threshold")]
    #[validate(range(min = 0))]
    pub free_delivery_threshold: i64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            vat_rate_bps: default_vat_rate(),
            delivery_charge: default_delivery_charge(),
            free_delivery_threshold: default_free_delivery_threshold(),
        }
    }
}

fn default_vat_rate() -> u32 { 500 }
fn default_delivery_charge() -> i64 { 6000 }
fn default_free_delivery_threshold() -> i64 { 100_000 }

impl Settings {
    /// 从配置文件和环境变量加载配置
    pub fn load() -> Result<Self, AppError> {
        let run_mode = env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let settings: Settings = Config::builder()
            .add_source(File::with_name("config/development").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // 环境变量覆盖，前缀 PANTRY，分隔符 __
            .add_source(
                Environment::with_prefix("PANTRY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;

        if settings.session.max_concurrent_sessions > 1 {
            tracing::warn!(
                max_concurrent_sessions = settings.session.max_concurrent_sessions,
                "仅支持单管理员会话，max_concurrent_sessions 不生效"
            );
        }

        Ok(settings)
    }
}
