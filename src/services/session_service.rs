//! 管理员会话服务
//!
//! 单设备只跟踪一个管理员会话：
//! - 无操作超时自动结束（滑动窗口）
//! - 敏感操作要求近期有操作（二次认证门槛）
//! - 定时存活检查
//! - 会话快照持久化，进程重启后可恢复

use crate::config::SessionSettings;
use crate::errors::AppError;
use crate::models::{
    AdminSession, AuditAction, AuditResult, SessionEndReason, SessionOrigin, SessionState,
};
use crate::repositories::SessionSnapshotStore;
use crate::services::AuditLogStore;
use crate::utils::{generate_session_id, Clock};
use chrono::Duration;
use std::sync::{Arc, Mutex, Weak};
use tokio::task::JoinHandle;

/// 近期认证失败原因
pub const RECENT_AUTH_REQUIRED: &str = "RECENT_AUTH_REQUIRED";

/// 管理员会话跟踪器
pub struct SessionTracker {
    me: Weak<SessionTracker>,
    settings: SessionSettings,
    audit: Arc<AuditLogStore>,
    store: Arc<dyn SessionSnapshotStore>,
    clock: Arc<dyn Clock>,
    current: Mutex<Option<AdminSession>>,
    /// 快照写入与清除串行执行，保证快照与内存会话一致
    persist: tokio::sync::Mutex<()>,
    liveness: Mutex<Option<JoinHandle<()>>>,
}

impl SessionTracker {
    pub fn new(
        settings: SessionSettings,
        audit: Arc<AuditLogStore>,
        store: Arc<dyn SessionSnapshotStore>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            settings,
            audit,
            store,
            clock,
            current: Mutex::new(None),
            persist: tokio::sync::Mutex::new(()),
            liveness: Mutex::new(None),
        })
    }

    fn timeout(&self) -> Duration {
        Duration::minutes(self.settings.session_timeout_minutes)
    }

    fn is_expired(&self, session: &AdminSession) -> bool {
        self.clock.now() - session.last_activity > self.timeout()
    }

    /// 当前会话副本
    pub fn current_session(&self) -> Option<AdminSession> {
        match self.current.lock() {
            Ok(current) => current.clone(),
            Err(e) => {
                tracing::error!(error = %e, "读取当前会话失败");
                None
            }
        }
    }

    fn set_current(&self, session: Option<AdminSession>) -> Result<Option<AdminSession>, AppError> {
        let mut current = self.current.lock()?;
        Ok(std::mem::replace(&mut *current, session))
    }

    /// 开始新会话
    ///
    /// 已有会话时先以 `FORCED` 结束旧会话。快照保存失败会返回错误。
    pub async fn start_session(
        &self,
        admin_id: &str,
        admin_email: &str,
        origin: SessionOrigin,
    ) -> Result<AdminSession, AppError> {
        if let Some(previous) = self.current_session() {
            tracing::warn!(
                previous_session = %previous.session_id,
                admin_id = %previous.admin_id,
                "已有活动会话，将被新会话替换"
            );
            self.end_session(SessionEndReason::Forced).await;
        }

        let now = self.clock.now();
        let session = AdminSession {
            session_id: generate_session_id(now),
            admin_id: admin_id.to_string(),
            admin_email: admin_email.to_string(),
            start_time: now,
            last_activity: now,
            ip_address: origin.ip_address,
            user_agent: origin.user_agent,
            is_active: true,
            device_info: origin.device_info,
        };

        {
            let _persist = self.persist.lock().await;
            self.store.save(&session).await?;
            self.set_current(Some(session.clone()))?;
        }
        self.start_liveness_check();

        self.audit.log_action(
            session
                .audit_entry(AuditAction::Login, "AUTH", AuditResult::Success)
                .with_detail("sessionId", session.session_id.clone()),
        );

        tracing::info!(
            session_id = %session.session_id,
            admin_id = %session.admin_id,
            "管理员会话已开始"
        );

        Ok(session)
    }

    /// 记录用户操作，推进最后活动时间
    pub async fn update_activity(&self) {
        let _persist = self.persist.lock().await;
        let now = self.clock.now();
        let snapshot = {
            let mut current = match self.current.lock() {
                Ok(current) => current,
                Err(e) => {
                    tracing::error!(error = %e, "更新会话活动时间失败");
                    return;
                }
            };
            match current.as_mut() {
                Some(session) => {
                    session.last_activity = now;
                    session.clone()
                }
                None => return,
            }
        };

        if let Err(e) = self.store.save(&snapshot).await {
            tracing::error!(error = %e, session_id = %snapshot.session_id, "会话快照保存失败");
        }
    }

    /// 延长会话
    ///
    /// 没有活动会话或会话已过期时返回 `Unauthorized`，快照保存失败同样返回错误。
    pub async fn extend_session(&self) -> Result<AdminSession, AppError> {
        let mut session = self
            .current_session()
            .ok_or_else(|| AppError::Unauthorized("没有活动会话".to_string()))?;

        if self.is_expired(&session) {
            self.end_session(SessionEndReason::Timeout).await;
            return Err(AppError::Unauthorized("会话已过期".to_string()));
        }

        let persist = self.persist.lock().await;
        match self.current_session() {
            Some(current) if current.session_id == session.session_id => {}
            _ => return Err(AppError::Unauthorized("会话已结束".to_string())),
        }

        session.last_activity = self.clock.now();
        self.store.save(&session).await?;
        self.set_current(Some(session.clone()))?;
        drop(persist);

        self.audit.log_action(session.audit_entry(
            AuditAction::SessionExtend,
            "AUTH",
            AuditResult::Success,
        ));

        tracing::info!(session_id = %session.session_id, "会话已延长");
        Ok(session)
    }

    /// 从快照恢复会话
    async fn rehydrate(&self) -> Option<AdminSession> {
        let snapshot = match self.store.load().await {
            Ok(snapshot) => snapshot?,
            Err(e) => {
                tracing::error!(error = %e, "读取会话快照失败");
                return None;
            }
        };

        if !snapshot.is_active {
            return None;
        }

        if let Err(e) = self.set_current(Some(snapshot.clone())) {
            tracing::error!(error = %e, "恢复会话失败");
            return None;
        }

        tracing::info!(session_id = %snapshot.session_id, "已从快照恢复会话");
        Some(snapshot)
    }

    /// 会话是否有效，超时则结束会话
    pub async fn is_session_valid(&self) -> bool {
        let session = match self.current_session() {
            Some(session) => session,
            None => match self.rehydrate().await {
                Some(session) => {
                    if !self.is_expired(&session) {
                        self.start_liveness_check();
                    }
                    session
                }
                None => return false,
            },
        };

        if self.is_expired(&session) {
            tracing::info!(session_id = %session.session_id, "会话无操作超时");
            self.end_session(SessionEndReason::Timeout).await;
            return false;
        }

        true
    }

    /// 敏感操作校验
    ///
    /// 返回 `false` 时调用方应要求重新认证。
    pub async fn validate_for_sensitive_action(&self, action: AuditAction) -> bool {
        if !self.is_session_valid().await {
            return false;
        }

        if !self.settings.require_reauth_for_sensitive_actions || !action.is_sensitive() {
            return true;
        }

        let session = match self.current_session() {
            Some(session) => session,
            None => return false,
        };

        let idle = self.clock.now() - session.last_activity;
        if idle <= Duration::minutes(self.settings.reauth_window_minutes) {
            return true;
        }

        tracing::warn!(
            session_id = %session.session_id,
            action = %action,
            idle_seconds = idle.num_seconds(),
            "敏感操作需要重新认证"
        );

        self.audit.log_action(
            session
                .audit_entry(AuditAction::LoginFailed, "SECURITY", AuditResult::Failure)
                .with_detail("reason", RECENT_AUTH_REQUIRED)
                .with_detail("requestedAction", action.as_str()),
        );

        false
    }

    /// 距离超时的剩余时间（可能为负）
    pub fn time_until_expiry(&self) -> Option<Duration> {
        let session = self.current_session()?;
        Some(self.timeout() - (self.clock.now() - session.last_activity))
    }

    /// 是否应提示会话即将超时
    pub fn should_show_session_warning(&self) -> bool {
        let warning = Duration::minutes(self.settings.session_warning_minutes);
        self.time_until_expiry()
            .map_or(false, |remaining| remaining > Duration::zero() && remaining <= warning)
    }

    pub fn state(&self) -> SessionState {
        match self.current_session() {
            None => SessionState::NoSession,
            Some(session) if self.is_expired(&session) => SessionState::Expired,
            Some(_) => SessionState::Active,
        }
    }

    /// 结束会话：记录登出、清除内存和快照、停止存活检查
    pub async fn end_session(&self, reason: SessionEndReason) {
        let persist = self.persist.lock().await;
        let ended = match self.set_current(None) {
            Ok(ended) => ended,
            Err(e) => {
                tracing::error!(error = %e, "结束会话失败");
                None
            }
        };

        if let Some(session) = &ended {
            let duration = self.clock.now() - session.start_time;
            self.audit.log_action(
                session
                    .audit_entry(AuditAction::Logout, "AUTH", AuditResult::Success)
                    .with_detail("reason", reason.to_string())
                    .with_detail("durationSeconds", duration.num_seconds()),
            );

            tracing::info!(
                session_id = %session.session_id,
                reason = %reason,
                duration_seconds = duration.num_seconds(),
                "管理员会话已结束"
            );
        }

        if let Err(e) = self.store.clear().await {
            tracing::error!(error = %e, "清除会话快照失败");
        }
        drop(persist);

        self.stop_liveness_check();
    }

    /// 强制结束会话
    pub async fn force_terminate(&self) {
        self.end_session(SessionEndReason::Forced).await;
    }

    /// 存活检查，返回会话是否仍然有效
    pub async fn check_liveness(&self) -> bool {
        if self.current_session().is_none() {
            return false;
        }
        self.is_session_valid().await
    }

    fn start_liveness_check(&self) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!("不在异步运行时中，跳过会话存活检查");
                return;
            }
        };

        let weak = self.me.clone();
        let period = std::time::Duration::from_secs(self.settings.liveness_check_seconds);
        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let Some(tracker) = weak.upgrade() else {
                    break;
                };
                if !tracker.check_liveness().await {
                    break;
                }
            }
        });

        match self.liveness.lock() {
            Ok(mut slot) => {
                if let Some(previous) = slot.replace(task) {
                    previous.abort();
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "记录存活检查任务失败");
                task.abort();
            }
        }
    }

    fn stop_liveness_check(&self) {
        let task = match self.liveness.lock() {
            Ok(mut slot) => slot.take(),
            Err(e) => {
                tracing::error!(error = %e, "停止存活检查失败");
                None
            }
        };
        if let Some(task) = task {
            task.abort();
        }
    }

    /// 存活检查任务是否在运行
    pub fn is_liveness_check_running(&self) -> bool {
        self.liveness
            .lock()
            .map(|slot| slot.as_ref().map_or(false, |task| !task.is_finished()))
            .unwrap_or(false)
    }
}

impl Drop for SessionTracker {
    fn drop(&mut self) {
        if let Ok(slot) = self.liveness.get_mut() {
            if let Some(task) = slot.take() {
                task.abort();
            }
        }
    }
}
