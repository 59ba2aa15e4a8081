//! Pantry - 生鲜配送后台管理核心
//!
//! 管理后台的审计与安全部分，支持：
//! - 审计日志记录、查询、统计与 CSV 导出
//! - 基于规则的安全预警
//! - 管理员会话超时与敏感操作二次认证
//! - 订单计价与商品分类删除保护

pub mod config;
pub mod context;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

pub use context::AdminContext;
pub use errors::AppError;
