use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last day (inclusive) a customer stays HOT.
pub const HOT_DAYS: i64 = 3;
/// Last day (inclusive) a customer stays WARM.
pub const WARM_DAYS: i64 = 7;
/// Last day (inclusive) a customer stays COLD; beyond it the customer is FROZEN.
pub const FROZEN_DAYS: i64 = 14;
/// Vendor dashboards flag a customer once this many days have passed.
/// Kept apart from `FROZEN_DAYS` on purpose: the two thresholds differ by one day.
pub const VENDOR_ALERT_DAYS: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Temperature {
    Hot,
    Warm,
    Cold,
    Frozen,
}

impl Temperature {
    pub fn from_days(days: i64) -> Self {
        if days <= HOT_DAYS {
            Temperature::Hot
        } else if days <= WARM_DAYS {
            Temperature::Warm
        } else if days <= FROZEN_DAYS {
            Temperature::Cold
        } else {
            Temperature::Frozen
        }
    }
}

/// Whole days elapsed since the last visit, truncated.
pub fn days_since(last_visit_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    last_visit_at.map(|last| now.signed_duration_since(last).num_days())
}

/// Recency bucket of a customer. Never visited counts as FROZEN.
pub fn classify(last_visit_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Temperature {
    match days_since(last_visit_at, now) {
        Some(days) => Temperature::from_days(days),
        None => Temperature::Frozen,
    }
}

/// Whether a vendor should be alerted about this customer.
pub fn needs_attention(last_visit_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match days_since(last_visit_at, now) {
        Some(days) => days > VENDOR_ALERT_DAYS,
        None => true,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TemperatureCounts {
    pub hot: i64,
    pub warm: i64,
    pub cold: i64,
    pub frozen: i64,
}

impl TemperatureCounts {
    pub fn tally<I>(last_visits: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = Option<DateTime<Utc>>>,
    {
        let mut counts = TemperatureCounts::default();
        for last in last_visits {
            counts.add(classify(last, now));
        }
        counts
    }

    pub fn add(&mut self, temperature: Temperature) {
        match temperature {
            Temperature::Hot => self.hot += 1,
            Temperature::Warm => self.warm += 1,
            Temperature::Cold => self.cold += 1,
            Temperature::Frozen => self.frozen += 1,
        }
    }

    pub fn total(&self) -> i64 {
        self.hot + self.warm + self.cold + self.frozen
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> Option<DateTime<Utc>> {
        Some(now() - Duration::days(days))
    }

    #[test]
    fn boundary_table() {
        let cases = [
            (0, Temperature::Hot),
            (1, Temperature::Hot),
            (3, Temperature::Hot),
            (4, Temperature::Warm),
            (7, Temperature::Warm),
            (8, Temperature::Cold),
            (14, Temperature::Cold),
            (15, Temperature::Frozen),
            (400, Temperature::Frozen),
        ];
        for (days, expected) in cases {
            assert_eq!(classify(days_ago(days), now()), expected, "{} days", days);
        }
    }

    #[test]
    fn never_visited_is_frozen() {
        assert_eq!(classify(None, now()), Temperature::Frozen);
        assert_eq!(days_since(None, now()), None);
    }

    #[test]
    fn partial_days_are_truncated() {
        let last = Some(now() - Duration::days(3) - Duration::hours(23));
        assert_eq!(days_since(last, now()), Some(3));
        assert_eq!(classify(last, now()), Temperature::Hot);
    }

    #[test]
    fn visit_in_the_future_is_hot() {
        let last = Some(now() + Duration::hours(5));
        assert_eq!(classify(last, now()), Temperature::Hot);
    }

    #[test]
    fn classification_is_monotonic_in_elapsed_days() {
        let mut previous = Temperature::Hot;
        for days in 0..60 {
            let current = classify(days_ago(days), now());
            assert!(current >= previous, "regressed at {} days", days);
            previous = current;
        }
    }

    #[test]
    fn vendor_alert_threshold_is_distinct_from_frozen() {
        assert_eq!(classify(days_ago(15), now()), Temperature::Frozen);
        assert!(!needs_attention(days_ago(15), now()));
        assert!(needs_attention(days_ago(16), now()));
        assert!(needs_attention(None, now()));
        assert!(!needs_attention(days_ago(2), now()));
    }

    #[test]
    fn tally_counts_every_bucket() {
        let counts = TemperatureCounts::tally(
            vec![days_ago(0), days_ago(5), days_ago(10), days_ago(30), None],
            now(),
        );
        assert_eq!(
            counts,
            TemperatureCounts {
                hot: 1,
                warm: 1,
                cold: 1,
                frozen: 2
            }
        );
        assert_eq!(counts.total(), 5);
    }

    #[test]
    fn serializes_as_upper_case_label() {
        assert_eq!(serde_json::to_string(&Temperature::Frozen).unwrap(), "\"FROZEN\"");
    }
}
