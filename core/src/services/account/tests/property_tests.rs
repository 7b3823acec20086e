//! Property tests for the account state machine

use chrono::{Duration, Utc};
use proptest::prelude::*;

use crate::domain::entities::{
    AccountStatus, InvalidLoginOutcome, InvalidLoginPolicy, InvalidLoginWindow, User,
    VerificationCode,
};
use crate::domain::value_objects::HashedPassword;
use crate::services::account::RequestContext;

use super::mocks::{fixed_now, harness_with, test_config};

fn active_user() -> User {
    User::new("jane", "jane@example.com").with_status(AccountStatus::active())
}

fn status_strategy() -> impl Strategy<Value = AccountStatus> {
    let now = fixed_now();
    prop_oneof![
        Just(AccountStatus::Pending),
        (0u32..10, 0i64..7200).prop_map(move |(count, age)| AccountStatus::Active {
            invalid_logins: if count == 0 {
                None
            } else {
                Some(InvalidLoginWindow {
                    started_at: now - Duration::seconds(age),
                    count,
                })
            },
        }),
        (0i64..7200).prop_map(move |age| AccountStatus::Locked {
            locked_at: now - Duration::seconds(age),
        }),
        Just(AccountStatus::Suspended),
    ]
}

proptest! {
    /// Property: max consecutive failures inside one window always lock, the
    /// first failure of a window never does
    #[test]
    fn prop_failures_within_window_lock(
        max in 1u32..8,
        gaps in prop::collection::vec(0i64..600, 8),
    ) {
        let window = Duration::hours(1);
        let policy = InvalidLoginPolicy { max_invalid_logins: max, window };
        let mut user = active_user();
        let mut now = Utc::now();
        let mut elapsed = 0;
        let attempts = max.max(2);

        for (attempt, gap) in gaps.iter().take(attempts as usize).enumerate() {
            if attempt > 0 {
                // keep every failure inside the first window
                let step = (*gap).min((3600 - elapsed) / attempts as i64);
                elapsed += step;
                now = now + Duration::seconds(step);
            }
            let outcome = user.record_invalid_login(now, None, &policy).unwrap();
            if (attempt as u32) + 1 < attempts {
                prop_assert_eq!(outcome, InvalidLoginOutcome::Counted { count: attempt as u32 + 1 });
            } else {
                prop_assert_eq!(outcome, InvalidLoginOutcome::Locked);
            }
        }

        prop_assert!(user.is_locked());
        prop_assert_eq!(user.status().invalid_login_count(), 0);
    }

    /// Property: failures further apart than the window never lock
    #[test]
    fn prop_spread_out_failures_never_lock(
        max in 1u32..8,
        attempts in 1usize..20,
        extra_gap in 1i64..10_000,
    ) {
        let window = Duration::hours(1);
        let policy = InvalidLoginPolicy { max_invalid_logins: max, window };
        let mut user = active_user();
        let mut now = Utc::now();

        for _ in 0..attempts {
            let outcome = user.record_invalid_login(now, None, &policy).unwrap();
            prop_assert_eq!(outcome, InvalidLoginOutcome::Counted { count: 1 });
            now = now + window + Duration::seconds(extra_gap);
        }

        prop_assert!(user.is_active());
    }

    /// Property: a successful login always clears the throttle and the code
    #[test]
    fn prop_successful_login_resets(status in status_strategy()) {
        let now = fixed_now();
        let mut user = active_user()
            .with_status(status)
            .with_verification(Some(VerificationCode::issue(now)));

        user.record_successful_login(now, None, None).unwrap();

        prop_assert_eq!(user.status().invalid_login_count(), 0);
        prop_assert!(user.status().invalid_login_window().is_none());
        prop_assert!(user.verification().is_none());
    }

    /// Property: setting a password always yields a clean active account
    #[test]
    fn prop_set_password_clears_state(status in status_strategy(), reset in any::<bool>()) {
        let now = fixed_now();
        let mut user = active_user()
            .with_status(status)
            .with_verification(Some(VerificationCode::issue(now)));
        user.password_reset_required = reset;

        user.set_password(HashedPassword::new("hash", "mock"), now).unwrap();

        prop_assert_eq!(user.status(), &AccountStatus::active());
        prop_assert!(user.verification().is_none());
        prop_assert!(!user.password_reset_required);
        prop_assert_eq!(user.last_password_change_at, Some(now));
    }

    /// Property: deletion always moves the identity into the archive
    #[test]
    fn prop_archive_shadows_identity(
        status in status_strategy(),
        username in "[a-z]{1,12}",
        email in "[a-z]{1,8}@[a-z]{1,8}\\.com",
    ) {
        let mut user = User::new(username.clone(), email.clone()).with_status(status);

        user.archive(fixed_now()).unwrap();

        prop_assert!(user.username.is_empty());
        prop_assert!(user.email.is_empty());
        prop_assert_eq!(
            user.status().archived_identity(),
            Some((username.as_str(), email.as_str()))
        );
    }

    /// Property: code freshness has an exclusive lower boundary
    #[test]
    fn prop_code_freshness_boundary(validity in 1i64..100_000, offset in -1000i64..1000) {
        let now = fixed_now();
        let validity = Duration::seconds(validity);
        let code = VerificationCode::new("code", now - validity + Duration::seconds(offset));

        prop_assert_eq!(code.is_fresh(now, validity), offset > 0);
    }

    /// Property: reading a locked user unlocks exactly when the cooldown has elapsed
    #[test]
    fn prop_lockout_expires_on_read(cooldown in 1u64..10_000, age in 0i64..20_000) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let h = harness_with(test_config().with_cooldown_seconds(Some(cooldown)), false);
        let user = active_user().with_status(AccountStatus::Locked {
            locked_at: fixed_now() - Duration::seconds(age),
        });

        let loaded = runtime.block_on(async {
            h.repository.insert(user.clone()).await;
            h.service.get_user_by_id(user.id).await.unwrap().unwrap()
        });
        let stored = runtime.block_on(h.repository.get(user.id)).unwrap();

        if age >= cooldown as i64 {
            prop_assert_eq!(loaded.status(), &AccountStatus::active());
            prop_assert_eq!(stored.status(), &AccountStatus::active());
        } else {
            prop_assert!(loaded.is_locked());
            prop_assert!(stored.is_locked());
        }
    }
}

#[tokio::test]
async fn test_request_context_does_not_affect_throttle_count() {
    let h = harness_with(test_config(), false);
    let mut user = active_user();
    h.repository.insert(user.clone()).await;

    for ip in ["10.0.0.1", "10.0.0.2"] {
        h.service
            .handle_invalid_login(&mut user, &RequestContext::anonymous(ip))
            .await
            .unwrap();
    }

    assert_eq!(user.status().invalid_login_count(), 2);
    assert_eq!(user.last_login_attempt_ip.as_deref(), Some("10.0.0.2"));
}
