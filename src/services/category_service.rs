//! 商品分类删除服务
//!
//! 删除分三级：软删除（无商品引用时停用）→ 强制删除（解除引用后停用）
//! → 彻底删除（已停用且无引用时移除）。每一级都需要调用方先确认。

use crate::errors::AppError;
use crate::models::{AdminSession, AuditAction, AuditResult, DeletionMode, DeletionOutcome};
use crate::repositories::CatalogStore;
use crate::services::AuditLogStore;
use std::sync::Arc;
use uuid::Uuid;

const RESOURCE: &str = "CATEGORIES";

/// 商品分类删除服务
pub struct CategoryService {
    catalog: Arc<dyn CatalogStore>,
    audit: Arc<AuditLogStore>,
}

impl CategoryService {
    pub fn new(catalog: Arc<dyn CatalogStore>, audit: Arc<AuditLogStore>) -> Self {
        Self { catalog, audit }
    }

    /// 删除分类
    ///
    /// `confirmed` 为 `false` 时只返回受影响的商品数，不做修改。
    pub async fn delete_category(
        &self,
        actor: &AdminSession,
        category_id: Uuid,
        mode: DeletionMode,
        confirmed: bool,
    ) -> Result<DeletionOutcome, AppError> {
        let category = self
            .catalog
            .get_category(category_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("分类不存在: {}", category_id)))?;

        let product_count = self.catalog.count_products_in_category(category_id).await?;

        if !confirmed {
            return Ok(DeletionOutcome::NeedsConfirmation { product_count });
        }

        match mode {
            DeletionMode::Soft => {
                if product_count > 0 {
                    tracing::info!(
                        category_id = %category_id,
                        product_count = product_count,
                        "分类仍被商品引用，需要强制删除"
                    );
                    self.record(actor, category_id, mode, AuditResult::Failure, product_count, 0);
                    return Ok(DeletionOutcome::Blocked { product_count });
                }

                self.catalog.deactivate_category(category_id).await?;
                self.record(actor, category_id, mode, AuditResult::Success, product_count, 0);
                tracing::info!(category_id = %category_id, name = %category.name, "分类已停用");
                Ok(DeletionOutcome::Deactivated { detached_products: 0 })
            }
            DeletionMode::Force => {
                let detached = if product_count > 0 {
                    self.catalog.detach_products(category_id).await?
                } else {
                    0
                };
                self.catalog.deactivate_category(category_id).await?;
                self.record(actor, category_id, mode, AuditResult::Success, product_count, detached);
                tracing::info!(
                    category_id = %category_id,
                    detached_products = detached,
                    "分类已强制停用"
                );
                Ok(DeletionOutcome::Deactivated { detached_products: detached })
            }
            DeletionMode::Hard => {
                if category.is_active || product_count > 0 {
                    self.record(actor, category_id, mode, AuditResult::Failure, product_count, 0);
                    return Err(AppError::Conflict(format!(
                        "分类 {} 需先停用且不再被商品引用",
                        category_id
                    )));
                }

                self.catalog.delete_category(category_id).await?;
                self.record(actor, category_id, mode, AuditResult::Success, 0, 0);
                tracing::info!(category_id = %category_id, name = %category.name, "分类已彻底删除");
                Ok(DeletionOutcome::Removed)
            }
        }
    }

    fn record(
        &self,
        actor: &AdminSession,
        category_id: Uuid,
        mode: DeletionMode,
        result: AuditResult,
        product_count: u64,
        detached: u64,
    ) {
        self.audit.log_action(
            actor
                .audit_entry(AuditAction::CategoryDelete, RESOURCE, result)
                .with_resource_id(category_id.to_string())
                .with_detail("mode", mode.as_str())
                .with_detail("productCount", product_count)
                .with_detail("detachedProducts", detached),
        );
    }
}
