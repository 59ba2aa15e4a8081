//! 审计日志服务
//!
//! 内存中按写入顺序保存（最新在前），写入后同步执行安全预警规则。
//! 审计记录不能阻塞触发它的业务操作：写入路径上的错误只记录日志，
//! 通过 [`AuditReceipt::degraded`] 告知调用方。

use crate::config::AuditSettings;
use crate::errors::AppError;
use crate::models::{
    ActionCount, AuditLogEntry, AuditLogFilter, AuditResult, AuditStatistics, NewAuditEntry,
    SecurityAlert, StatsRange,
};
use crate::repositories::AuditSink;
use crate::services::alert_service::{rank_actions, SecurityAlertGenerator};
use crate::utils::{days_before, render_audit_csv, Clock};
use chrono::{DateTime, Utc};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// 统计结果中保留的高频操作数量
const TOP_ACTIONS: usize = 5;

/// 单次写入结果
#[derive(Debug, Clone)]
pub struct AuditReceipt {
    pub timestamp: DateTime<Utc>,
    /// 本次写入触发的预警
    pub alerts_raised: Vec<SecurityAlert>,
    /// 写入过程出现错误（落盘失败等），条目可能未完整保存
    pub degraded: bool,
}

#[derive(Default)]
struct AuditState {
    logs: VecDeque<AuditLogEntry>,
    alerts: VecDeque<SecurityAlert>,
}

/// 审计日志存储
pub struct AuditLogStore {
    state: Mutex<AuditState>,
    generator: SecurityAlertGenerator,
    sink: Option<Arc<dyn AuditSink>>,
    clock: Arc<dyn Clock>,
    max_alerts: usize,
    default_page_size: usize,
    retention_days: u32,
}

impl AuditLogStore {
    pub fn new(settings: &AuditSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(AuditState::default()),
            generator: SecurityAlertGenerator::new(),
            sink: None,
            clock,
            max_alerts: settings.max_alerts,
            default_page_size: settings.default_page_size,
            retention_days: settings.retention_days,
        }
    }

    /// 设置落盘目标
    pub fn with_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 从已落盘的条目恢复（输入按写入顺序，旧的在前），不重新生成预警
    pub fn restore(&self, entries: Vec<AuditLogEntry>) -> Result<usize, AppError> {
        let mut state = self.state.lock()?;
        let count = entries.len();
        for entry in entries {
            state.logs.push_front(entry);
        }
        tracing::info!(count = count, "审计日志已恢复");
        Ok(count)
    }

    /// 记录一次管理操作
    pub fn log_action(&self, entry: NewAuditEntry) -> AuditReceipt {
        let now = self.clock.now();
        let entry = entry.stamp(now);
        let mut degraded = false;

        if let Some(sink) = &self.sink {
            if let Err(e) = sink.append(&entry) {
                tracing::error!(
                    error = %e,
                    admin_id = %entry.admin_id,
                    action = %entry.action,
                    "审计日志落盘失败"
                );
                degraded = true;
            }
        }

        tracing::debug!(
            admin_id = %entry.admin_id,
            action = %entry.action,
            resource = %entry.resource,
            result = %entry.result,
            "记录审计日志"
        );

        let alerts_raised = match self.record(entry, now) {
            Ok(alerts) => alerts,
            Err(e) => {
                tracing::error!(error = %e, "审计日志写入失败");
                degraded = true;
                Vec::new()
            }
        };

        AuditReceipt {
            timestamp: now,
            alerts_raised,
            degraded,
        }
    }

    fn record(&self, entry: AuditLogEntry, now: DateTime<Utc>) -> Result<Vec<SecurityAlert>, AppError> {
        let mut state = self.state.lock()?;
        state.logs.push_front(entry);

        let alerts = self.generator.evaluate(&state.logs[0], &state.logs, now);
        for alert in &alerts {
            tracing::warn!(
                alert_type = ?alert.alert_type,
                severity = ?alert.severity,
                admin_id = %alert.admin_id,
                "触发安全预警: {}",
                alert.description
            );
            state.alerts.push_front(alert.clone());
        }
        state.alerts.truncate(self.max_alerts);

        Ok(alerts)
    }

    /// 按条件查询（最新在前），分页在过滤之后
    pub fn get_audit_logs(&self, filter: &AuditLogFilter) -> Vec<AuditLogEntry> {
        let limit = filter.limit.unwrap_or(self.default_page_size);
        match self.select(filter, Some(limit)) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(error = %e, "查询审计日志失败");
                Vec::new()
            }
        }
    }

    fn select(&self, filter: &AuditLogFilter, limit: Option<usize>) -> Result<Vec<AuditLogEntry>, AppError> {
        let state = self.state.lock()?;
        let matching = state
            .logs
            .iter()
            .filter(|entry| filter.matches(entry))
            .skip(filter.offset);

        Ok(match limit {
            Some(limit) => matching.take(limit).cloned().collect(),
            None => matching.cloned().collect(),
        })
    }

    /// 当前预警列表的副本（最新在前）
    pub fn get_security_alerts(&self) -> Vec<SecurityAlert> {
        match self.state.lock() {
            Ok(state) => state.alerts.iter().cloned().collect(),
            Err(e) => {
                tracing::error!(error = %e, "读取安全预警失败");
                Vec::new()
            }
        }
    }

    /// 统计最近一段时间的操作
    pub fn get_audit_statistics(&self, range: StatsRange) -> AuditStatistics {
        let since = days_before(self.clock.now(), range.days());
        match self.compute_statistics(since) {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(error = %e, range = ?range, "计算审计统计失败");
                AuditStatistics::default()
            }
        }
    }

    fn compute_statistics(&self, since: DateTime<Utc>) -> Result<AuditStatistics, AppError> {
        let state = self.state.lock()?;
        let recent: Vec<&AuditLogEntry> = state
            .logs
            .iter()
            .filter(|entry| entry.timestamp >= since)
            .collect();

        let successful_actions = recent
            .iter()
            .filter(|entry| entry.result == AuditResult::Success)
            .count();
        let unique_admins = recent
            .iter()
            .map(|entry| entry.admin_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        let top_actions = rank_actions(recent.iter().map(|entry| entry.action))
            .into_iter()
            .take(TOP_ACTIONS)
            .map(|(action, count)| ActionCount { action, count })
            .collect();
        let security_alerts = state
            .alerts
            .iter()
            .filter(|alert| alert.timestamp >= since)
            .count();

        Ok(AuditStatistics {
            total_actions: recent.len(),
            successful_actions,
            failed_actions: recent.len() - successful_actions,
            unique_admins,
            top_actions,
            security_alerts,
        })
    }

    /// 导出为 CSV
    ///
    /// 未指定 `limit` 时导出全部匹配条目。
    pub fn export_audit_logs(&self, filter: &AuditLogFilter) -> Result<String, AppError> {
        let entries = self.select(filter, filter.limit).map_err(|e| {
            tracing::error!(error = %e, "导出审计日志失败");
            AppError::ExportFailed
        })?;

        let csv = render_audit_csv(&entries).map_err(|e| {
            tracing::error!(error = %e, "导出审计日志失败");
            AppError::ExportFailed
        })?;

        tracing::info!(rows = entries.len(), "审计日志已导出");
        Ok(csv)
    }

    /// 清理早于 `days_to_keep` 天的日志和预警，返回删除的日志条数
    pub fn clear_old_logs(&self, days_to_keep: u32) -> usize {
        let cutoff = days_before(self.clock.now(), i64::from(days_to_keep));
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(error = %e, "清理审计日志失败");
                return 0;
            }
        };

        let before = state.logs.len();
        state.logs.retain(|entry| entry.timestamp >= cutoff);
        state.alerts.retain(|alert| alert.timestamp >= cutoff);
        let removed = before - state.logs.len();
        let remaining = state.logs.len();
        drop(state);

        if let Some(sink) = &self.sink {
            if let Err(e) = sink.retain(cutoff) {
                tracing::error!(error = %e, "裁剪审计日志落盘文件失败");
            }
        }

        tracing::info!(
            days_to_keep = days_to_keep,
            removed = removed,
            remaining = remaining,
            "已清理过期审计日志"
        );

        removed
    }

    /// 按配置的保留天数清理
    pub fn sweep_retention(&self) -> usize {
        self.clear_old_logs(self.retention_days)
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.logs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn alert_count(&self) -> usize {
        self.state.lock().map(|s| s.alerts.len()).unwrap_or(0)
    }
}
