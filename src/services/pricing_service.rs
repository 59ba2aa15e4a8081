//! 订单计价服务
//!
//! 金额统一使用最小货币单位（分），比例使用基点，避免浮点误差。

use crate::config::PricingSettings;
use crate::errors::AppError;
use crate::models::{DiscountKind, OrderLine, PriceBreakdown, Promotion};
use chrono::{DateTime, Utc};

const BPS_DENOMINATOR: i64 = 10_000;

/// 订单计价服务
#[derive(Debug, Clone)]
pub struct PricingService {
    settings: PricingSettings,
}

impl PricingService {
    pub fn new(settings: PricingSettings) -> Self {
        Self { settings }
    }

    /// 计算订单金额：小计、折扣、增值税、配送费、合计
    pub fn calculate(
        &self,
        lines: &[OrderLine],
        promotion: Option<&Promotion>,
        now: DateTime<Utc>,
    ) -> Result<PriceBreakdown, AppError> {
        let subtotal = subtotal(lines)?;

        let discount = match promotion {
            Some(promotion) => discount_for(promotion, subtotal, now)?,
            None => 0,
        };

        let taxable = subtotal - discount;
        let vat = apply_bps(taxable, i64::from(self.settings.vat_rate_bps))?;
        let delivery_charge = if taxable >= self.settings.free_delivery_threshold {
            0
        } else {
            self.settings.delivery_charge
        };

        let total = taxable
            .checked_add(vat)
            .and_then(|amount| amount.checked_add(delivery_charge))
            .ok_or_else(out_of_range)?;

        let breakdown = PriceBreakdown {
            subtotal,
            discount,
            vat,
            delivery_charge,
            total,
        };

        tracing::debug!(
            subtotal = breakdown.subtotal,
            discount = breakdown.discount,
            vat = breakdown.vat,
            delivery_charge = breakdown.delivery_charge,
            total = breakdown.total,
            "订单计价完成"
        );

        Ok(breakdown)
    }
}

fn subtotal(lines: &[OrderLine]) -> Result<i64, AppError> {
    if lines.is_empty() {
        return Err(AppError::ValidationError("订单不能为空".to_string()));
    }

    lines.iter().try_fold(0i64, |acc, line| {
        if line.quantity == 0 {
            return Err(AppError::ValidationError(format!(
                "商品 {} 数量必须大于 0",
                line.product_id
            )));
        }
        if line.unit_price < 0 {
            return Err(AppError::ValidationError(format!(
                "商品 {} 单价无效",
                line.product_id
            )));
        }
        line.unit_price
            .checked_mul(i64::from(line.quantity))
            .and_then(|amount| acc.checked_add(amount))
            .ok_or_else(out_of_range)
    })
}

fn discount_for(promotion: &Promotion, subtotal: i64, now: DateTime<Utc>) -> Result<i64, AppError> {
    if !promotion.is_active {
        return Err(AppError::ValidationError(format!("优惠码 {} 已停用", promotion.code)));
    }
    if promotion.valid_from.map_or(false, |from| now < from)
        || promotion.valid_until.map_or(false, |until| now > until)
    {
        return Err(AppError::ValidationError(format!("优惠码 {} 不在有效期内", promotion.code)));
    }
    if subtotal < promotion.min_order_amount {
        return Err(AppError::ValidationError(format!(
            "订单金额未达到优惠码 {} 的最低消费",
            promotion.code
        )));
    }

    let raw = match promotion.discount {
        DiscountKind::Percentage { bps } => apply_bps(subtotal, i64::from(bps.min(10_000)))?,
        DiscountKind::Fixed { amount } => amount.max(0),
    };

    let capped = promotion.max_discount.map_or(raw, |max| raw.min(max.max(0)));
    Ok(capped.min(subtotal))
}

fn out_of_range() -> AppError {
    AppError::ValidationError("订单金额超出范围".to_string())
}

/// 按基点计算，四舍五入
fn apply_bps(amount: i64, bps: i64) -> Result<i64, AppError> {
    amount
        .checked_mul(bps)
        .and_then(|scaled| scaled.checked_add(BPS_DENOMINATOR / 2))
        .map(|scaled| scaled / BPS_DENOMINATOR)
        .ok_or_else(out_of_range)
}
