//! 测试辅助工具
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use pantry_audit::config::{AuditSettings, SessionSettings};
use pantry_audit::models::{AuditAction, AuditResult, NewAuditEntry, SessionOrigin};
use pantry_audit::services::{AuditLogStore, SessionTracker};
use pantry_audit::utils::ManualClock;
use std::sync::Arc;
use uuid::Uuid;

use crate::mocks::MemorySessionStore;

/// 固定起始时间（用于可重复测试）
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn manual_clock() -> ManualClock {
    ManualClock::new(fixed_now())
}

/// 使用默认配置和手动时钟的审计日志存储
pub fn audit_store(clock: &ManualClock) -> Arc<AuditLogStore> {
    Arc::new(AuditLogStore::new(&AuditSettings::default(), Arc::new(clock.clone())))
}

/// 会话跟踪器及其依赖
pub struct SessionFixture {
    pub clock: ManualClock,
    pub audit: Arc<AuditLogStore>,
    pub store: Arc<MemorySessionStore>,
    pub tracker: Arc<SessionTracker>,
}

pub fn session_fixture() -> SessionFixture {
    session_fixture_with(SessionSettings::default())
}

pub fn session_fixture_with(settings: SessionSettings) -> SessionFixture {
    let clock = manual_clock();
    let audit = audit_store(&clock);
    let store = Arc::new(MemorySessionStore::new());
    let tracker = SessionTracker::new(settings, audit.clone(), store.clone(), Arc::new(clock.clone()));
    SessionFixture {
        clock,
        audit,
        store,
        tracker,
    }
}

/// 生成测试用审计操作
pub fn entry(admin_id: &str, action: AuditAction, result: AuditResult) -> NewAuditEntry {
    NewAuditEntry::new(admin_id, test_email(admin_id), action, "AUTH", result)
        .with_origin("192.168.1.10", "pantry-admin/1.0")
}

pub fn test_email(admin_id: &str) -> String {
    format!("{}@pantry.test", admin_id)
}

/// 生成测试管理员 ID
pub fn test_admin_id() -> String {
    format!("admin-{}", &Uuid::new_v4().to_string()[..8])
}

pub fn origin() -> SessionOrigin {
    SessionOrigin {
        ip_address: "192.168.1.10".to_string(),
        user_agent: "pantry-admin/1.0".to_string(),
        device_info: None,
    }
}

/// 断言结果是成功的
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// 断言结果是错误的
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(val) => panic!("Expected Err, got Ok: {:?}", val),
            Err(e) => e,
        }
    };
}
