//! 工具函数模块

mod csv;
mod id;
mod time;

pub use csv::*;
pub use id::*;
pub use time::*;
