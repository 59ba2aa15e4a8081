//! 应用上下文：显式持有全部服务，由调用方注入到需要的地方

use crate::config::Settings;
use crate::errors::AppError;
use crate::repositories::{
    CatalogStore, FileSessionStore, JsonlAuditSink, SessionSnapshotStore,
};
use crate::services::{AuditLogStore, CategoryService, PricingService, SessionTracker};
use crate::utils::{Clock, SystemClock};
use std::sync::Arc;

pub struct AdminContext {
    pub settings: Settings,
    pub clock: Arc<dyn Clock>,
    pub audit: Arc<AuditLogStore>,
    pub sessions: Arc<SessionTracker>,
    pub pricing: PricingService,
}

impl AdminContext {
    /// 使用系统时钟和配置中的文件路径构建
    pub fn from_settings(settings: Settings) -> Result<Self, AppError> {
        let store = Arc::new(FileSessionStore::new(&settings.session.snapshot_path));
        Self::build(settings, Arc::new(SystemClock), store)
    }

    /// 使用指定时钟和快照存储构建（测试可注入）
    pub fn build(
        settings: Settings,
        clock: Arc<dyn Clock>,
        snapshot_store: Arc<dyn SessionSnapshotStore>,
    ) -> Result<Self, AppError> {
        let mut audit = AuditLogStore::new(&settings.audit, clock.clone());
        let mut restored = Vec::new();

        if let Some(path) = &settings.audit.sink_path {
            let sink = JsonlAuditSink::open(path)?;
            restored = sink.replay()?;
            audit = audit.with_sink(Arc::new(sink));
        }

        let audit = Arc::new(audit);
        if !restored.is_empty() {
            audit.restore(restored)?;
        }

        let sessions = SessionTracker::new(
            settings.session.clone(),
            audit.clone(),
            snapshot_store,
            clock.clone(),
        );
        let pricing = PricingService::new(settings.pricing.clone());

        tracing::info!("管理后台服务初始化完成");

        Ok(Self {
            settings,
            clock,
            audit,
            sessions,
            pricing,
        })
    }

    /// 分类删除服务（依赖外部商品目录）
    pub fn category_service(&self, catalog: Arc<dyn CatalogStore>) -> CategoryService {
        CategoryService::new(catalog, self.audit.clone())
    }
}
