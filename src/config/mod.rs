//! 配置管理模块

mod settings;

pub use settings::{
	Settings,
	LoggingSettings,
	AuditSettings,
	SessionSettings,
	PricingSettings,
};
