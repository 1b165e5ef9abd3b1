use std::collections::HashSet;

use serde_json::json;
use uuid::Uuid;

use super::{Class, Customer};
use crate::notify::Notification;
use crate::schedule::TimelineEntry;
use crate::storage::TimeRange;

/// Template of the reminder sent to inactive students.
pub const INACTIVITY_TEMPLATE: &str = "mail/reminder_for_inactive_students.html";

/// Days without a subscription class after which a student counts as inactive.
pub const DEFAULT_INACTIVITY_WINDOW_DAYS: u32 = 7;

/// Whether a class counts as recent subscription activity.
///
/// The class must be paid by a subscription and scheduled on an entry that
/// ended within `window`.
pub fn is_recent_subscription_class(
    class: &Class,
    entry: Option<&TimelineEntry>,
    window: &TimeRange,
) -> bool {
    class.subscription_id.is_some()
        && entry.is_some_and(|entry| {
            class.timeline_entry_id == Some(entry.id) && window.contains_inclusive(entry.end)
        })
}

/// Subscribed customers with no recent subscription activity.
pub fn find_inactive_customers(
    subscribed: Vec<Customer>,
    recently_active: &HashSet<Uuid>,
) -> Vec<Customer> {
    subscribed
        .into_iter()
        .filter(|customer| !recently_active.contains(&customer.id))
        .collect()
}

/// Builds the inactivity reminder for a customer.
pub fn inactivity_notification(customer: &Customer) -> Notification {
    Notification {
        template: INACTIVITY_TEMPLATE.to_string(),
        to: vec![customer.email.clone()],
        timezone: customer.timezone,
        context: json!({
            "c": {
                "id": customer.id,
                "name": customer.name,
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn entry_ending(end: DateTime<Utc>) -> TimelineEntry {
        TimelineEntry::new(Uuid::new_v4(), end - Duration::minutes(30), end)
    }

    fn window() -> TimeRange {
        TimeRange::trailing_days(now(), DEFAULT_INACTIVITY_WINDOW_DAYS)
    }

    #[test]
    fn test_recent_subscription_class() {
        let entry = entry_ending(now() - Duration::days(2));
        let class = Class::new(Uuid::new_v4())
            .with_subscription(Uuid::new_v4())
            .scheduled_on(entry.id);

        assert!(is_recent_subscription_class(&class, Some(&entry), &window()));
    }

    #[test]
    fn test_class_without_subscription_is_not_activity() {
        let entry = entry_ending(now() - Duration::days(2));
        let class = Class::new(Uuid::new_v4()).scheduled_on(entry.id);

        assert!(!is_recent_subscription_class(&class, Some(&entry), &window()));
    }

    #[test]
    fn test_class_ended_before_window_is_not_activity() {
        let entry = entry_ending(now() - Duration::days(8));
        let class = Class::new(Uuid::new_v4())
            .with_subscription(Uuid::new_v4())
            .scheduled_on(entry.id);

        assert!(!is_recent_subscription_class(&class, Some(&entry), &window()));
    }

    #[test]
    fn test_unscheduled_class_is_not_activity() {
        let class = Class::new(Uuid::new_v4()).with_subscription(Uuid::new_v4());

        assert!(!is_recent_subscription_class(&class, None, &window()));
    }

    #[test]
    fn test_find_inactive_customers() {
        let idle = Customer::new("Idle", "idle@example.com", chrono_tz::UTC);
        let busy = Customer::new("Busy", "busy@example.com", chrono_tz::UTC);
        let recently_active = HashSet::from([busy.id]);

        let inactive = find_inactive_customers(vec![idle.clone(), busy], &recently_active);

        assert_eq!(inactive, vec![idle]);
    }

    #[test]
    fn test_inactivity_notification() {
        let customer = Customer::new("Ann", "ann@example.com", chrono_tz::Europe::Berlin);

        let notification = inactivity_notification(&customer);

        assert_eq!(notification.template, INACTIVITY_TEMPLATE);
        assert_eq!(notification.to, vec!["ann@example.com".to_string()]);
        assert_eq!(notification.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(notification.context["c"]["name"], "Ann");
    }
}
