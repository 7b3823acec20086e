//! Unit tests for account status

use chrono::{Duration, Utc};

use crate::domain::entities::account_status::{AccountStatus, InvalidLoginWindow, StatusKind};

#[test]
fn test_status_kind_round_trip_through_str() {
    for kind in [
        StatusKind::Pending,
        StatusKind::Active,
        StatusKind::Locked,
        StatusKind::Suspended,
        StatusKind::Archived,
    ] {
        assert_eq!(kind.as_str().parse::<StatusKind>(), Ok(kind));
    }
    assert_eq!("LOCKED".parse::<StatusKind>(), Ok(StatusKind::Locked));
    assert!("deleted".parse::<StatusKind>().is_err());
}

#[test]
fn test_only_active_status_carries_window() {
    let now = Utc::now();
    let active = AccountStatus::Active {
        invalid_logins: Some(InvalidLoginWindow { started_at: now, count: 2 }),
    };

    assert_eq!(active.invalid_login_count(), 2);
    assert_eq!(AccountStatus::Suspended.invalid_login_count(), 0);
    assert!(AccountStatus::Pending.invalid_login_window().is_none());
}

#[test]
fn test_locked_at_only_for_locked() {
    let now = Utc::now();

    assert_eq!(AccountStatus::Locked { locked_at: now }.locked_at(), Some(now));
    assert_eq!(AccountStatus::active().locked_at(), None);
}

#[test]
fn test_window_expiry() {
    let start = Utc::now();
    let window = InvalidLoginWindow::open(start);

    assert_eq!(window.count, 1);
    assert_eq!(window.ends_at(Duration::minutes(30)), start + Duration::minutes(30));
    assert!(window.is_active(start + Duration::minutes(30), Duration::minutes(30)));
    assert!(!window.is_active(start + Duration::minutes(31), Duration::minutes(30)));
}

#[test]
fn test_status_json_is_tagged() {
    let json = serde_json::to_value(AccountStatus::Archived {
        username: "jane".to_string(),
        email: "jane@example.com".to_string(),
    })
    .unwrap();

    assert_eq!(json["status"], "archived");
    assert_eq!(json["archived_username"], "jane");
    assert_eq!(json["archived_email"], "jane@example.com");
    assert_eq!(AccountStatus::default(), AccountStatus::Pending);
}
