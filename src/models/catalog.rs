//! 商品分类模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 商品分类
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

/// 删除方式（逐级升级：软删除 → 强制删除 → 彻底删除）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionMode {
    /// 仅在没有商品引用时停用
    Soft,
    /// 解除商品关联后停用
    Force,
    /// 从数据库移除（必须已停用且无引用）
    Hard,
}

impl DeletionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionMode::Soft => "soft",
            DeletionMode::Force => "force",
            DeletionMode::Hard => "hard",
        }
    }
}

/// 删除结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeletionOutcome {
    /// 等待用户确认，未做任何修改
    NeedsConfirmation { product_count: u64 },
    /// 仍有商品引用，需要强制删除
    Blocked { product_count: u64 },
    /// 已停用
    Deactivated { detached_products: u64 },
    /// 已彻底删除
    Removed,
}
