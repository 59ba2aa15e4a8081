//! 业务逻辑层（Service）

mod alert_service;
mod audit_service;
mod category_service;
mod pricing_service;
mod session_service;

pub use alert_service::{
    SecurityAlertGenerator, ACTIVITY_THRESHOLD, ACTIVITY_WINDOW_MINUTES, BULK_CHANGE_THRESHOLD,
    FAILED_LOGIN_THRESHOLD, FAILED_LOGIN_WINDOW_MINUTES,
};
pub use audit_service::{AuditLogStore, AuditReceipt};
pub use category_service::CategoryService;
pub use pricing_service::PricingService;
pub use session_service::{SessionTracker, RECENT_AUTH_REQUIRED};
