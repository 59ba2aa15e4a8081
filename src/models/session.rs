//! 管理员会话模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{AuditAction, AuditResult, NewAuditEntry};

/// 设备信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}

/// 会话来源元数据（由调用方提供，不做校验）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionOrigin {
    pub ip_address: String,
    pub user_agent: String,
    pub device_info: Option<DeviceInfo>,
}

/// 管理员会话（本地持久化为 JSON 快照）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub session_id: String,
    pub admin_id: String,
    pub admin_email: String,
    pub start_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: String,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
}

impl AdminSession {
    /// 以当前会话身份构造审计日志
    pub fn audit_entry(
        &self,
        action: AuditAction,
        resource: &str,
        result: AuditResult,
    ) -> NewAuditEntry {
        NewAuditEntry::new(&self.admin_id, &self.admin_email, action, resource, result)
            .with_origin(&self.ip_address, &self.user_agent)
            .with_session(Some(self.session_id.clone()))
    }
}

/// 会话结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEndReason {
    Logout,
    Timeout,
    Forced,
}

impl fmt::Display for SessionEndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEndReason::Logout => write!(f, "LOGOUT"),
            SessionEndReason::Timeout => write!(f, "TIMEOUT"),
            SessionEndReason::Forced => write!(f, "FORCED"),
        }
    }
}

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoSession,
    Active,
    Expired,
}
