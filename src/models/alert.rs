//! 安全预警模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Details;

/// 预警类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityAlertType {
    FailedLoginAttempts,
    SuspiciousActivity,
    UnauthorizedAccess,
    BulkChanges,
}

/// 预警级别（由规则决定，不会动态升级）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// 安全预警
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAlert {
    #[serde(rename = "type")]
    pub alert_type: SecurityAlertType,
    pub severity: AlertSeverity,
    pub admin_id: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: Details,
}
