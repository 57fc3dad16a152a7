use chrono::{Duration, TimeZone, Utc};
use common::{
    enums::{OrderStatus, SubscriptionStatus, VisitResult},
    error::AppError,
};
use policy::{
    lifecycle::{self, CHECKOUT_ORDER_STATUS},
    limits::{self, LimitedResource},
    subscription::{self, READ_ONLY_MESSAGE, SubscriptionSnapshot},
    temperature::{self, Temperature},
};

#[test]
fn first_visit_with_order_warms_customer_and_opens_review() {
    let now = Utc.with_ymd_and_hms(2025, 8, 4, 10, 30, 0).unwrap();

    // customer never visited before
    let mut last_visit_at = None;
    assert_eq!(temperature::classify(last_visit_at, now), Temperature::Frozen);

    // checkout with an order
    let amount = lifecycle::checkout_order_amount(VisitResult::OrderTaken, Some(97_000)).unwrap();
    last_visit_at = Some(now);

    assert_eq!(temperature::classify(last_visit_at, now), Temperature::Hot);
    assert_eq!(amount, Some(97_000));
    assert_eq!(CHECKOUT_ORDER_STATUS, OrderStatus::PendingReview);

    // the order then walks its lifecycle up to delivery and stays there
    let mut status = CHECKOUT_ORDER_STATUS;
    for next in [OrderStatus::Pending, OrderStatus::InDelivery, OrderStatus::Delivered] {
        lifecycle::ensure_transition(status, next).unwrap();
        status = next;
    }
    assert!(lifecycle::ensure_transition(status, OrderStatus::Cancelled).is_err());
}

#[test]
fn lapsed_period_blocks_writes_but_not_reads() {
    let now = Utc.with_ymd_and_hms(2025, 8, 4, 10, 30, 0).unwrap();
    let sub = SubscriptionSnapshot {
        status: SubscriptionStatus::Active,
        trial_ends_at: None,
        current_period_end: now - Duration::hours(1),
    };

    match subscription::ensure_writable(Some(&sub), now) {
        Err(AppError::Forbidden(msg)) => assert_eq!(msg, READ_ONLY_MESSAGE),
        other => panic!("expected forbidden, got {:?}", other),
    }

    // reads only classify, they never consult the guard
    assert_eq!(
        temperature::classify(Some(now - Duration::days(9)), now),
        Temperature::Cold
    );
}

#[test]
fn plan_caps_the_customer_book() {
    assert!(limits::ensure_within_limit(LimitedResource::Customers, 200, 199).is_ok());
    assert!(matches!(
        limits::ensure_within_limit(LimitedResource::Customers, 200, 200),
        Err(AppError::Forbidden(_))
    ));
    assert!(limits::ensure_within_limit(LimitedResource::Customers, limits::UNLIMITED, 5_000).is_ok());
}
