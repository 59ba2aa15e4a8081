//! 审计日志模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 审计详情（任意键值）
pub type Details = serde_json::Map<String, serde_json::Value>;

/// 审计操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    // 认证
    Login,
    Logout,
    LoginFailed,
    PasswordChange,
    SessionExtend,
    // 用户管理
    UserCreate,
    UserUpdate,
    UserDelete,
    UserRoleChange,
    UserSuspend,
    // 商品管理
    ProductCreate,
    ProductUpdate,
    ProductDelete,
    BulkUpdate,
    CategoryCreate,
    CategoryUpdate,
    CategoryDelete,
    // 订单管理
    OrderUpdate,
    OrderStatusChange,
    OrderCancel,
    OrderRefund,
    // 系统
    SettingsUpdate,
    DataExport,
    PromotionUpdate,
}

impl AuditAction {
    /// 需要近期认证才能执行的敏感操作
    pub const SENSITIVE: [AuditAction; 8] = [
        AuditAction::UserDelete,
        AuditAction::UserRoleChange,
        AuditAction::ProductDelete,
        AuditAction::BulkUpdate,
        AuditAction::CategoryDelete,
        AuditAction::OrderRefund,
        AuditAction::SettingsUpdate,
        AuditAction::DataExport,
    ];

    pub fn is_sensitive(&self) -> bool {
        Self::SENSITIVE.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "LOGIN",
            AuditAction::Logout => "LOGOUT",
            AuditAction::LoginFailed => "LOGIN_FAILED",
            AuditAction::PasswordChange => "PASSWORD_CHANGE",
            AuditAction::SessionExtend => "SESSION_EXTEND",
            AuditAction::UserCreate => "USER_CREATE",
            AuditAction::UserUpdate => "USER_UPDATE",
            AuditAction::UserDelete => "USER_DELETE",
            AuditAction::UserRoleChange => "USER_ROLE_CHANGE",
            AuditAction::UserSuspend => "USER_SUSPEND",
            AuditAction::ProductCreate => "PRODUCT_CREATE",
            AuditAction::ProductUpdate => "PRODUCT_UPDATE",
            AuditAction::ProductDelete => "PRODUCT_DELETE",
            AuditAction::BulkUpdate => "BULK_UPDATE",
            AuditAction::CategoryCreate => "CATEGORY_CREATE",
            AuditAction::CategoryUpdate => "CATEGORY_UPDATE",
            AuditAction::CategoryDelete => "CATEGORY_DELETE",
            AuditAction::OrderUpdate => "ORDER_UPDATE",
            AuditAction::OrderStatusChange => "ORDER_STATUS_CHANGE",
            AuditAction::OrderCancel => "ORDER_CANCEL",
            AuditAction::OrderRefund => "ORDER_REFUND",
            AuditAction::SettingsUpdate => "SETTINGS_UPDATE",
            AuditAction::DataExport => "DATA_EXPORT",
            AuditAction::PromotionUpdate => "PROMOTION_UPDATE",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 操作结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditResult {
    Success,
    Failure,
}

impl fmt::Display for AuditResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditResult::Success => write!(f, "SUCCESS"),
            AuditResult::Failure => write!(f, "FAILURE"),
        }
    }
}

/// 审计日志条目（写入后不可变）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub timestamp: DateTime<Utc>,
    pub admin_id: String,
    pub admin_email: String,
    pub action: AuditAction,
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub ip_address: String,
    pub user_agent: String,
    pub result: AuditResult,
    #[serde(default)]
    pub details: Details,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// 待写入的审计日志（时间戳由存储分配）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuditEntry {
    pub admin_id: String,
    pub admin_email: String,
    pub action: AuditAction,
    pub resource: String,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub user_agent: String,
    pub result: AuditResult,
    #[serde(default)]
    pub details: Details,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl NewAuditEntry {
    pub fn new(
        admin_id: impl Into<String>,
        admin_email: impl Into<String>,
        action: AuditAction,
        resource: impl Into<String>,
        result: AuditResult,
    ) -> Self {
        Self {
            admin_id: admin_id.into(),
            admin_email: admin_email.into(),
            action,
            resource: resource.into(),
            resource_id: None,
            ip_address: String::new(),
            user_agent: String::new(),
            result,
            details: Details::new(),
            session_id: None,
        }
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn with_origin(mut self, ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        self.ip_address = ip_address.into();
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_session(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// 打上时间戳，生成最终条目
    pub fn stamp(self, timestamp: DateTime<Utc>) -> AuditLogEntry {
        AuditLogEntry {
            timestamp,
            admin_id: self.admin_id,
            admin_email: self.admin_email,
            action: self.action,
            resource: self.resource,
            resource_id: self.resource_id,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            result: self.result,
            details: self.details,
            session_id: self.session_id,
        }
    }
}

/// 审计日志查询条件（未提供的条件不参与过滤）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogFilter {
    pub admin_id: Option<String>,
    pub action: Option<AuditAction>,
    pub resource: Option<String>,
    pub resource_id: Option<String>,
    pub session_id: Option<String>,
    pub result: Option<AuditResult>,
    /// 起始时间（含）
    pub start_date: Option<DateTime<Utc>>,
    /// 结束时间（含）
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub offset: usize,
    /// 不提供时使用配置的默认分页大小
    pub limit: Option<usize>,
}

impl AuditLogFilter {
    /// 判断条目是否满足全部条件
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        self.admin_id.as_ref().map_or(true, |id| &entry.admin_id == id)
            && self.action.map_or(true, |action| entry.action == action)
            && self.resource.as_ref().map_or(true, |r| &entry.resource == r)
            && self
                .resource_id
                .as_ref()
                .map_or(true, |id| entry.resource_id.as_ref() == Some(id))
            && self
                .session_id
                .as_ref()
                .map_or(true, |id| entry.session_id.as_ref() == Some(id))
            && self.result.map_or(true, |result| entry.result == result)
            && self.start_date.map_or(true, |start| entry.timestamp >= start)
            && self.end_date.map_or(true, |end| entry.timestamp <= end)
    }

    pub fn admin(mut self, admin_id: impl Into<String>) -> Self {
        self.admin_id = Some(admin_id.into());
        self
    }

    pub fn action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn result(mut self, result: AuditResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }
}

/// 统计时间范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsRange {
    Day,
    Week,
    Month,
}

impl StatsRange {
    pub fn days(&self) -> i64 {
        match self {
            StatsRange::Day => 1,
            StatsRange::Week => 7,
            StatsRange::Month => 30,
        }
    }
}

/// 操作次数统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCount {
    pub action: AuditAction,
    pub count: usize,
}

/// 审计统计结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStatistics {
    pub total_actions: usize,
    pub successful_actions: usize,
    pub failed_actions: usize,
    pub unique_admins: usize,
    pub top_actions: Vec<ActionCount>,
    pub security_alerts: usize,
}
