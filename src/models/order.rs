//! 订单计价模型（金额单位：分）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 订单明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: Uuid,
    pub unit_price: i64,
    pub quantity: u32,
}

/// 优惠方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscountKind {
    /// 百分比折扣（基点，1000 = 10%）
    Percentage { bps: u32 },
    /// 固定金额立减
    Fixed { amount: i64 },
}

/// 促销活动
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub code: String,
    pub discount: DiscountKind,
    #[serde(default)]
    pub min_order_amount: i64,
    #[serde(default)]
    pub max_discount: Option<i64>,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// 计价结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub subtotal: i64,
    pub discount: i64,
    pub vat: i64,
    pub delivery_charge: i64,
    pub total: i64,
}
