use chrono::{DateTime, Utc};
use common::{
    enums::SubscriptionStatus,
    error::{AppError, Res},
};

/// Message returned by every write rejected because of the subscription.
pub const READ_ONLY_MESSAGE: &str =
    "Tu suscripción ha vencido o no está activa. Renueva tu plan para seguir realizando cambios.";

/// The subscription fields that decide whether a tenant may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionSnapshot {
    pub status: SubscriptionStatus,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub current_period_end: DateTime<Utc>,
}

/// A tenant is read-only when it has no subscription, its period ended,
/// its trial ended, or its status blocks writes.
pub fn is_read_only(subscription: Option<&SubscriptionSnapshot>, now: DateTime<Utc>) -> bool {
    let Some(sub) = subscription else {
        return true;
    };

    let period_over = sub.current_period_end < now;
    let trial_over = sub.status == SubscriptionStatus::Trial
        && sub.trial_ends_at.is_some_and(|ends| ends < now);
    let blocked = matches!(
        sub.status,
        SubscriptionStatus::PastDue | SubscriptionStatus::Cancelled | SubscriptionStatus::Suspended
    );

    period_over || trial_over || blocked
}

pub fn ensure_writable(subscription: Option<&SubscriptionSnapshot>, now: DateTime<Utc>) -> Res<()> {
    if is_read_only(subscription, now) {
        Err(AppError::Forbidden(READ_ONLY_MESSAGE.to_string()))
    } else {
        Ok(())
    }
}

/// Remaining trial days, rounded down, never negative. `None` outside a trial.
pub fn trial_days_left(subscription: &SubscriptionSnapshot, now: DateTime<Utc>) -> Option<i64> {
    if subscription.status != SubscriptionStatus::Trial {
        return None;
    }
    subscription
        .trial_ends_at
        .map(|ends| ends.signed_duration_since(now).num_days().max(0))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn snapshot(
        status: SubscriptionStatus,
        trial_ends_at: Option<DateTime<Utc>>,
        current_period_end: DateTime<Utc>,
    ) -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            status,
            trial_ends_at,
            current_period_end,
        }
    }

    #[test]
    fn missing_subscription_is_read_only() {
        assert!(is_read_only(None, now()));
    }

    #[test]
    fn active_subscription_in_period_is_writable() {
        let sub = snapshot(SubscriptionStatus::Active, None, now() + Duration::days(10));
        assert!(!is_read_only(Some(&sub), now()));
        assert!(ensure_writable(Some(&sub), now()).is_ok());
    }

    #[test]
    fn active_subscription_past_period_end_is_read_only() {
        let sub = snapshot(SubscriptionStatus::Active, None, now() - Duration::days(1));
        assert!(is_read_only(Some(&sub), now()));
    }

    #[test]
    fn expired_trial_is_read_only_even_with_future_period() {
        let sub = snapshot(
            SubscriptionStatus::Trial,
            Some(now() - Duration::days(1)),
            now() + Duration::days(30),
        );
        assert!(is_read_only(Some(&sub), now()));
    }

    #[test]
    fn running_trial_is_writable() {
        let sub = snapshot(
            SubscriptionStatus::Trial,
            Some(now() + Duration::days(3)),
            now() + Duration::days(3),
        );
        assert!(!is_read_only(Some(&sub), now()));
    }

    #[test]
    fn trial_without_end_date_follows_period() {
        let sub = snapshot(SubscriptionStatus::Trial, None, now() + Duration::days(3));
        assert!(!is_read_only(Some(&sub), now()));
    }

    #[test]
    fn trial_end_only_matters_while_in_trial() {
        let sub = snapshot(
            SubscriptionStatus::Active,
            Some(now() - Duration::days(40)),
            now() + Duration::days(3),
        );
        assert!(!is_read_only(Some(&sub), now()));
    }

    #[test]
    fn blocking_statuses_are_read_only() {
        for status in [
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Cancelled,
            SubscriptionStatus::Suspended,
        ] {
            let sub = snapshot(status, None, now() + Duration::days(30));
            assert!(is_read_only(Some(&sub), now()), "{:?}", status);
        }
    }

    #[test]
    fn period_ending_exactly_now_is_still_writable() {
        let sub = snapshot(SubscriptionStatus::Active, None, now());
        assert!(!is_read_only(Some(&sub), now()));
    }

    #[test]
    fn rejection_carries_fixed_message() {
        match ensure_writable(None, now()) {
            Err(AppError::Forbidden(msg)) => assert_eq!(msg, READ_ONLY_MESSAGE),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn trial_days_left_is_clamped() {
        let sub = snapshot(
            SubscriptionStatus::Trial,
            Some(now() + Duration::days(5) + Duration::hours(2)),
            now() + Duration::days(5),
        );
        assert_eq!(trial_days_left(&sub, now()), Some(5));

        let over = snapshot(SubscriptionStatus::Trial, Some(now() - Duration::days(2)), now());
        assert_eq!(trial_days_left(&over, now()), Some(0));

        let active = snapshot(SubscriptionStatus::Active, None, now());
        assert_eq!(trial_days_left(&active, now()), None);
    }
}
