//! 数据模型模块

mod alert;
mod audit;
mod catalog;
mod order;
mod session;

pub use alert::*;
pub use audit::*;
pub use catalog::*;
pub use order::*;
pub use session::*;
