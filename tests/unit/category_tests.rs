//! 分类删除测试

use pantry_audit::errors::AppError;
use pantry_audit::models::{
    AdminSession, AuditAction, AuditLogFilter, AuditResult, DeletionMode, DeletionOutcome,
};
use pantry_audit::services::{AuditLogStore, CategoryService};
use std::sync::Arc;
use uuid::Uuid;

use crate::helpers::{audit_store, fixed_now, manual_clock};
use crate::mocks::InMemoryCatalog;

struct Fixture {
    catalog: Arc<InMemoryCatalog>,
    audit: Arc<AuditLogStore>,
    service: CategoryService,
    actor: AdminSession,
}

fn fixture() -> Fixture {
    let clock = manual_clock();
    let audit = audit_store(&clock);
    let catalog = Arc::new(InMemoryCatalog::new());
    let service = CategoryService::new(catalog.clone(), audit.clone());
    let actor = AdminSession {
        session_id: "session_1717243200000_categorya".to_string(),
        admin_id: "admin-1".to_string(),
        admin_email: "admin-1@pantry.test".to_string(),
        start_time: fixed_now(),
        last_activity: fixed_now(),
        ip_address: "192.168.1.10".to_string(),
        user_agent: "pantry-admin/1.0".to_string(),
        is_active: true,
        device_info: None,
    };
    Fixture {
        catalog,
        audit,
        service,
        actor,
    }
}

fn deletions(fixture: &Fixture) -> Vec<pantry_audit::models::AuditLogEntry> {
    fixture
        .audit
        .get_audit_logs(&AuditLogFilter::default().action(AuditAction::CategoryDelete))
}

#[tokio::test]
async fn test_unconfirmed_delete_changes_nothing() {
    let f = fixture();
    let category = f.catalog.add_category("Dairy", true);
    f.catalog.add_product(category);
    f.catalog.add_product(category);

    let outcome = assert_ok!(
        f.service
            .delete_category(&f.actor, category, DeletionMode::Force, false)
            .await
    );

    assert_eq!(outcome, DeletionOutcome::NeedsConfirmation { product_count: 2 });
    assert!(f.catalog.categories.get(&category).unwrap().is_active);
    assert!(deletions(&f).is_empty());
}

#[tokio::test]
async fn test_soft_delete_blocked_by_products() {
    let f = fixture();
    let category = f.catalog.add_category("Bakery", true);
    f.catalog.add_product(category);

    let outcome = assert_ok!(
        f.service
            .delete_category(&f.actor, category, DeletionMode::Soft, true)
            .await
    );

    assert_eq!(outcome, DeletionOutcome::Blocked { product_count: 1 });
    assert!(f.catalog.categories.get(&category).unwrap().is_active);

    let logs = deletions(&f);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].result, AuditResult::Failure);
    assert_eq!(logs[0].resource, "CATEGORIES");
    assert_eq!(logs[0].resource_id.as_deref(), Some(category.to_string().as_str()));
    assert_eq!(logs[0].details["mode"], "soft");
    assert_eq!(logs[0].details["productCount"], 1);
}

#[tokio::test]
async fn test_soft_delete_deactivates_empty_category() {
    let f = fixture();
    let category = f.catalog.add_category("Spices", true);

    let outcome = assert_ok!(
        f.service
            .delete_category(&f.actor, category, DeletionMode::Soft, true)
            .await
    );

    assert_eq!(outcome, DeletionOutcome::Deactivated { detached_products: 0 });
    assert!(!f.catalog.categories.get(&category).unwrap().is_active);
    assert_eq!(deletions(&f)[0].result, AuditResult::Success);
}

#[tokio::test]
async fn test_force_delete_detaches_products() {
    let f = fixture();
    let category = f.catalog.add_category("Frozen", true);
    let other = f.catalog.add_category("Drinks", true);
    f.catalog.add_product(category);
    f.catalog.add_product(category);
    f.catalog.add_product(category);
    let untouched = f.catalog.add_product(other);

    let outcome = assert_ok!(
        f.service
            .delete_category(&f.actor, category, DeletionMode::Force, true)
            .await
    );

    assert_eq!(outcome, DeletionOutcome::Deactivated { detached_products: 3 });
    assert!(!f.catalog.categories.get(&category).unwrap().is_active);
    assert_eq!(f.catalog.products.get(&untouched), Some(Some(other)));

    let logs = deletions(&f);
    assert_eq!(logs[0].details["mode"], "force");
    assert_eq!(logs[0].details["detachedProducts"], 3);
    assert_eq!(logs[0].session_id.as_deref(), Some(f.actor.session_id.as_str()));
}

#[tokio::test]
async fn test_hard_delete_requires_inactive_category() {
    let f = fixture();
    let category = f.catalog.add_category("Snacks", true);

    let err = assert_err!(
        f.service
            .delete_category(&f.actor, category, DeletionMode::Hard, true)
            .await
    );

    assert!(matches!(err, AppError::Conflict(_)));
    assert!(f.catalog.categories.get(&category).is_some());
    assert_eq!(deletions(&f)[0].result, AuditResult::Failure);
}

#[tokio::test]
async fn test_escalation_to_hard_delete() {
    let f = fixture();
    let category = f.catalog.add_category("Seasonal", true);
    f.catalog.add_product(category);

    let soft = assert_ok!(
        f.service
            .delete_category(&f.actor, category, DeletionMode::Soft, true)
            .await
    );
    assert_eq!(soft, DeletionOutcome::Blocked { product_count: 1 });

    assert_ok!(
        f.service
            .delete_category(&f.actor, category, DeletionMode::Force, true)
            .await
    );

    let hard = assert_ok!(
        f.service
            .delete_category(&f.actor, category, DeletionMode::Hard, true)
            .await
    );

    assert_eq!(hard, DeletionOutcome::Removed);
    assert!(f.catalog.categories.get(&category).is_none());
    assert_eq!(deletions(&f).len(), 3);
}

#[tokio::test]
async fn test_unknown_category() {
    let f = fixture();

    let err = assert_err!(
        f.service
            .delete_category(&f.actor, Uuid::new_v4(), DeletionMode::Soft, true)
            .await
    );

    assert!(matches!(err, AppError::NotFound(_)));
    assert!(f.audit.is_empty());
}
