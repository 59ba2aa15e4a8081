//! 数据访问层（Repository）

mod audit_repo;
mod catalog_repo;
mod session_repo;

pub use audit_repo::{AuditSink, JsonlAuditSink};
pub use catalog_repo::CatalogStore;
pub use session_repo::{FileSessionStore, SessionSnapshotStore};
