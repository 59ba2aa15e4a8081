//! 安全预警规则测试

use chrono::Duration;
use pantry_audit::models::{AlertSeverity, AuditAction, AuditResult, SecurityAlertType};

use crate::helpers::{audit_store, entry, manual_clock};

mod failed_logins {
    use super::*;

    #[test]
    fn test_third_failure_raises_high_alert() {
        let clock = manual_clock();
        let store = audit_store(&clock);

        for _ in 0..2 {
            let receipt = store.log_action(entry("admin-1", AuditAction::LoginFailed, AuditResult::Failure));
            assert!(receipt.alerts_raised.is_empty());
            clock.advance(Duration::minutes(2));
        }

        let receipt = store.log_action(entry("admin-1", AuditAction::LoginFailed, AuditResult::Failure));
        assert_eq!(receipt.alerts_raised.len(), 1);

        let alerts = store.get_security_alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, SecurityAlertType::FailedLoginAttempts);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
        assert_eq!(alerts[0].admin_id, "admin-1");
        assert_eq!(alerts[0].details["attemptCount"], 3);
        assert_eq!(alerts[0].details["ipAddress"], "192.168.1.10");
    }

    #[test]
    fn test_fourth_failure_raises_another_alert() {
        let clock = manual_clock();
        let store = audit_store(&clock);

        for _ in 0..4 {
            store.log_action(entry("admin-1", AuditAction::LoginFailed, AuditResult::Failure));
            clock.advance(Duration::minutes(1));
        }

        let alerts = store.get_security_alerts();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].details["attemptCount"], 4);
        assert_eq!(alerts[1].details["attemptCount"], 3);
    }

    #[test]
    fn test_failures_spread_beyond_window_do_not_alert() {
        let clock = manual_clock();
        let store = audit_store(&clock);

        for _ in 0..3 {
            store.log_action(entry("admin-1", AuditAction::LoginFailed, AuditResult::Failure));
            clock.advance(Duration::minutes(8));
        }

        assert!(store.get_security_alerts().is_empty());
    }

    #[test]
    fn test_failures_counted_per_admin() {
        let clock = manual_clock();
        let store = audit_store(&clock);

        store.log_action(entry("admin-1", AuditAction::LoginFailed, AuditResult::Failure));
        store.log_action(entry("admin-2", AuditAction::LoginFailed, AuditResult::Failure));
        store.log_action(entry("admin-1", AuditAction::LoginFailed, AuditResult::Failure));
        store.log_action(entry("admin-2", AuditAction::LoginFailed, AuditResult::Failure));

        assert!(store.get_security_alerts().is_empty());
    }
}

mod bulk_changes {
    use super::*;

    #[test]
    fn test_over_threshold_raises_medium_alert() {
        let clock = manual_clock();
        let store = audit_store(&clock);

        store.log_action(
            entry("admin-1", AuditAction::BulkUpdate, AuditResult::Success).with_detail("itemCount", 101),
        );

        let alerts = store.get_security_alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, SecurityAlertType::BulkChanges);
        assert_eq!(alerts[0].severity, AlertSeverity::Medium);
        assert_eq!(alerts[0].details["itemCount"], 101);
    }

    #[test]
    fn test_at_threshold_raises_nothing() {
        let clock = manual_clock();
        let store = audit_store(&clock);

        store.log_action(
            entry("admin-1", AuditAction::BulkUpdate, AuditResult::Success).with_detail("itemCount", 100),
        );

        assert!(store.get_security_alerts().is_empty());
    }

    #[test]
    fn test_fractional_item_count_is_compared_numerically() {
        let clock = manual_clock();
        let store = audit_store(&clock);

        store.log_action(
            entry("admin-1", AuditAction::BulkUpdate, AuditResult::Success).with_detail("itemCount", 101.0),
        );
        store.log_action(
            entry("admin-2", AuditAction::BulkUpdate, AuditResult::Success).with_detail("itemCount", 100.0),
        );

        let alerts = store.get_security_alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].admin_id, "admin-1");
        assert_eq!(alerts[0].details["itemCount"], 101.0);
    }

    #[test]
    fn test_item_count_on_other_action_is_ignored() {
        let clock = manual_clock();
        let store = audit_store(&clock);

        store.log_action(
            entry("admin-1", AuditAction::ProductUpdate, AuditResult::Success).with_detail("itemCount", 500),
        );

        assert!(store.get_security_alerts().is_empty());
    }
}

mod activity_volume {
    use super::*;

    #[test]
    fn test_more_than_hundred_actions_in_hour() {
        let clock = manual_clock();
        let store = audit_store(&clock);

        for i in 0..100 {
            let action = if i % 3 == 0 { AuditAction::OrderUpdate } else { AuditAction::ProductUpdate };
            store.log_action(entry("admin-1", action, AuditResult::Success));
            clock.advance(Duration::seconds(20));
        }
        assert!(store.get_security_alerts().is_empty());

        let receipt = store.log_action(entry("admin-1", AuditAction::ProductUpdate, AuditResult::Success));

        assert_eq!(receipt.alerts_raised.len(), 1);
        let alert = &receipt.alerts_raised[0];
        assert_eq!(alert.alert_type, SecurityAlertType::SuspiciousActivity);
        assert_eq!(alert.severity, AlertSeverity::Medium);
        assert_eq!(alert.details["actionCount"], 101);
        assert_eq!(alert.details["mostFrequentAction"], "PRODUCT_UPDATE");
    }

    #[test]
    fn test_old_actions_fall_out_of_window() {
        let clock = manual_clock();
        let store = audit_store(&clock);

        for _ in 0..150 {
            store.log_action(entry("admin-1", AuditAction::ProductUpdate, AuditResult::Success));
            clock.advance(Duration::seconds(40));
        }

        // 40 秒一次，60 分钟内最多 91 条
        assert!(store.get_security_alerts().is_empty());
    }

    #[test]
    fn test_rules_can_fire_together() {
        let clock = manual_clock();
        let store = audit_store(&clock);

        for _ in 0..99 {
            store.log_action(entry("admin-1", AuditAction::LoginFailed, AuditResult::Failure));
        }
        let before = store.alert_count();

        let receipt = store.log_action(
            entry("admin-1", AuditAction::BulkUpdate, AuditResult::Success).with_detail("itemCount", 250),
        );
        assert_eq!(receipt.alerts_raised.len(), 1);

        let receipt = store.log_action(entry("admin-1", AuditAction::LoginFailed, AuditResult::Failure));
        let kinds: Vec<SecurityAlertType> = receipt.alerts_raised.iter().map(|a| a.alert_type).collect();
        assert_eq!(
            kinds,
            vec![SecurityAlertType::FailedLoginAttempts, SecurityAlertType::SuspiciousActivity]
        );
        assert!(store.alert_count() > before);
    }
}

mod alert_list {
    use super::*;

    #[test]
    fn test_alert_list_bounded_to_hundred() {
        let clock = manual_clock();
        let store = audit_store(&clock);

        for i in 0..150u64 {
            store.log_action(
                entry(&format!("admin-{}", i), AuditAction::BulkUpdate, AuditResult::Success)
                    .with_detail("itemCount", 101 + i),
            );
        }

        let alerts = store.get_security_alerts();
        assert_eq!(alerts.len(), 100);
        assert_eq!(alerts[0].admin_id, "admin-149");
        assert_eq!(alerts[99].admin_id, "admin-50");
    }

    #[test]
    fn test_alerts_returned_as_copy() {
        let clock = manual_clock();
        let store = audit_store(&clock);
        store.log_action(
            entry("admin-1", AuditAction::BulkUpdate, AuditResult::Success).with_detail("itemCount", 101),
        );

        let mut copy = store.get_security_alerts();
        copy.clear();

        assert_eq!(store.get_security_alerts().len(), 1);
    }
}
