//! 单元测试

#[macro_use]
#[path = "../helpers/mod.rs"]
mod helpers;
#[path = "../mocks/mod.rs"]
mod mocks;

mod alert_tests;
mod category_tests;
