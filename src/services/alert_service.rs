//! 安全预警规则
//!
//! 每写入一条审计日志后执行一次，三条规则相互独立，可同时触发。
//! 阈值和时间窗口为固定常量，不做去重或冷却。

use crate::models::{
    AlertSeverity, AuditAction, AuditLogEntry, Details, SecurityAlert, SecurityAlertType,
};
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::collections::VecDeque;

/// 登录失败统计窗口（分钟）
pub const FAILED_LOGIN_WINDOW_MINUTES: i64 = 15;
/// 窗口内登录失败次数阈值（达到即触发）
pub const FAILED_LOGIN_THRESHOLD: usize = 3;
/// 批量修改条数阈值（超过即触发）
pub const BULK_CHANGE_THRESHOLD: u64 = 100;
/// 操作量统计窗口（分钟）
pub const ACTIVITY_WINDOW_MINUTES: i64 = 60;
/// 窗口内操作次数阈值（超过即触发）
pub const ACTIVITY_THRESHOLD: usize = 100;

/// 安全预警生成器
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityAlertGenerator;

impl SecurityAlertGenerator {
    pub fn new() -> Self {
        Self
    }

    /// 对新写入的条目执行全部规则
    ///
    /// `log` 为最新在前的完整日志，已包含 `entry`。
    pub fn evaluate(
        &self,
        entry: &AuditLogEntry,
        log: &VecDeque<AuditLogEntry>,
        now: DateTime<Utc>,
    ) -> Vec<SecurityAlert> {
        [
            self.check_failed_logins(entry, log, now),
            self.check_bulk_changes(entry, now),
            self.check_activity_volume(entry, log, now),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn check_failed_logins(
        &self,
        entry: &AuditLogEntry,
        log: &VecDeque<AuditLogEntry>,
        now: DateTime<Utc>,
    ) -> Option<SecurityAlert> {
        if entry.action != AuditAction::LoginFailed {
            return None;
        }

        let since = now - Duration::minutes(FAILED_LOGIN_WINDOW_MINUTES);
        let attempts = log
            .iter()
            .filter(|e| {
                e.admin_id == entry.admin_id
                    && e.action == AuditAction::LoginFailed
                    && e.timestamp >= since
            })
            .count();

        if attempts < FAILED_LOGIN_THRESHOLD {
            return None;
        }

        tracing::warn!(
            admin_id = %entry.admin_id,
            attempts = attempts,
            ip = %entry.ip_address,
            "检测到多次登录失败"
        );

        Some(SecurityAlert {
            alert_type: SecurityAlertType::FailedLoginAttempts,
            severity: AlertSeverity::High,
            admin_id: entry.admin_id.clone(),
            description: format!(
                "{} 分钟内登录失败 {} 次",
                FAILED_LOGIN_WINDOW_MINUTES, attempts
            ),
            timestamp: now,
            details: details(json!({
                "attemptCount": attempts,
                "ipAddress": entry.ip_address,
            })),
        })
    }

    fn check_bulk_changes(&self, entry: &AuditLogEntry, now: DateTime<Utc>) -> Option<SecurityAlert> {
        if entry.action != AuditAction::BulkUpdate {
            return None;
        }

        let raw = entry.details.get("itemCount")?;
        let item_count = raw.as_f64()?;
        if item_count <= BULK_CHANGE_THRESHOLD as f64 {
            return None;
        }
        let item_count = raw.clone();

        tracing::warn!(
            admin_id = %entry.admin_id,
            item_count = %item_count,
            resource = %entry.resource,
            "检测到大批量修改"
        );

        Some(SecurityAlert {
            alert_type: SecurityAlertType::BulkChanges,
            severity: AlertSeverity::Medium,
            admin_id: entry.admin_id.clone(),
            description: format!("批量修改 {} 条记录", item_count),
            timestamp: now,
            details: details(json!({
                "itemCount": item_count,
                "resource": entry.resource,
            })),
        })
    }

    fn check_activity_volume(
        &self,
        entry: &AuditLogEntry,
        log: &VecDeque<AuditLogEntry>,
        now: DateTime<Utc>,
    ) -> Option<SecurityAlert> {
        let since = now - Duration::minutes(ACTIVITY_WINDOW_MINUTES);
        let recent: Vec<&AuditLogEntry> = log
            .iter()
            .filter(|e| e.admin_id == entry.admin_id && e.timestamp >= since)
            .collect();

        if recent.len() <= ACTIVITY_THRESHOLD {
            return None;
        }

        let most_frequent = most_frequent_action(recent.iter().map(|e| e.action));

        tracing::warn!(
            admin_id = %entry.admin_id,
            action_count = recent.len(),
            "检测到异常高频操作"
        );

        Some(SecurityAlert {
            alert_type: SecurityAlertType::SuspiciousActivity,
            severity: AlertSeverity::Medium,
            admin_id: entry.admin_id.clone(),
            description: format!(
                "{} 分钟内执行 {} 次操作",
                ACTIVITY_WINDOW_MINUTES,
                recent.len()
            ),
            timestamp: now,
            details: details(json!({
                "actionCount": recent.len(),
                "mostFrequentAction": most_frequent.map(|a| a.as_str()),
            })),
        })
    }
}

/// 按出现次数降序统计操作，次数相同时按首次出现顺序
pub fn rank_actions(actions: impl Iterator<Item = AuditAction>) -> Vec<(AuditAction, usize)> {
    let mut counts: Vec<(AuditAction, usize)> = Vec::new();
    for action in actions {
        match counts.iter_mut().find(|(a, _)| *a == action) {
            Some((_, count)) => *count += 1,
            None => counts.push((action, 1)),
        }
    }
    // 稳定排序保留首次出现顺序
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn most_frequent_action(actions: impl Iterator<Item = AuditAction>) -> Option<AuditAction> {
    rank_actions(actions).first().map(|(action, _)| *action)
}

fn details(value: serde_json::Value) -> Details {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Details::new(),
    }
}
