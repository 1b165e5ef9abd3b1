//! Periodic reminder for subscribed students who stopped taking classes.

use std::collections::HashSet;
use std::sync::Arc;

use lessonbook_core::clock::Clock;
use lessonbook_core::market::{find_inactive_customers, inactivity_notification};
use lessonbook_core::notify::Notifier;
use lessonbook_core::storage::{Result, SubscriptionRepository, TimeRange};

/// Outcome of one inactivity sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InactivityReport {
    /// Customers holding a subscription that is not fully used.
    pub subscribed: usize,
    pub notified: usize,
    pub failed: usize,
}

/// Finds inactive students and sends them a reminder.
pub struct InactivityCheck {
    clock: Arc<dyn Clock>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    notifier: Arc<dyn Notifier>,
    window_days: u32,
}

impl InactivityCheck {
    pub fn new(
        clock: Arc<dyn Clock>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        notifier: Arc<dyn Notifier>,
        window_days: u32,
    ) -> Self {
        Self {
            clock,
            subscriptions,
            notifier,
            window_days,
        }
    }

    /// Runs one sweep.
    ///
    /// A failed send is logged and counted; the sweep moves on to the next
    /// customer. Only storage errors abort the sweep.
    pub async fn run(&self) -> Result<InactivityReport> {
        let window = TimeRange::trailing_days(self.clock.now(), self.window_days);

        let subscribed = self.subscriptions.get_customers_with_open_subscription().await?;
        let recently_active: HashSet<_> = self
            .subscriptions
            .get_customers_with_class_ended_within(window)
            .await?
            .into_iter()
            .collect();

        let mut report = InactivityReport {
            subscribed: subscribed.len(),
            ..Default::default()
        };

        for customer in find_inactive_customers(subscribed, &recently_active) {
            let notification = inactivity_notification(&customer);
            match self.notifier.send(&notification).await {
                Ok(()) => {
                    tracing::debug!(customer_id = %customer.id, "Inactivity reminder sent");
                    report.notified += 1;
                }
                Err(e) => {
                    tracing::error!(
                        customer_id = %customer.id,
                        error = %e,
                        "Failed to send inactivity reminder"
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            window_start = %window.start,
            window_end = %window.end,
            subscribed = report.subscribed,
            notified = report.notified,
            failed = report.failed,
            "Inactivity check finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use lessonbook_core::clock::FixedClock;
    use lessonbook_core::market::{Class, Customer, Subscription, INACTIVITY_TEMPLATE};
    use lessonbook_core::notify::{Notification, NotifyError};
    use lessonbook_core::schedule::TimelineEntry;
    use lessonbook_core::storage::{CustomerRepository, EntryRepository};
    use tokio::sync::Mutex;
    use uuid::Uuid;

    use crate::storage::InMemoryRepository;

    /// Records every notification; fails for the addresses in `failing`.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<Notification>>,
        failing: HashSet<String>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, notification: &Notification) -> std::result::Result<(), NotifyError> {
            if notification.to.iter().any(|to| self.failing.contains(to)) {
                return Err(NotifyError::Delivery("mailbox unavailable".to_string()));
            }
            self.sent.lock().await.push(notification.clone());
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    async fn subscribed_customer(repo: &InMemoryRepository, name: &str) -> (Customer, Subscription) {
        let customer = Customer::new(
            name,
            format!("{}@example.com", name.to_lowercase()),
            chrono_tz::Europe::Moscow,
        );
        repo.create_customer(&customer).await.unwrap();
        let subscription = Subscription::new(customer.id);
        repo.create_subscription(&subscription).await.unwrap();
        (customer, subscription)
    }

    async fn class_ending(
        repo: &InMemoryRepository,
        customer: &Customer,
        subscription: Option<&Subscription>,
        end: DateTime<Utc>,
    ) {
        let entry = TimelineEntry::new(Uuid::new_v4(), end - Duration::hours(1), end);
        repo.save_entry(&entry).await.unwrap();
        let mut class = Class::new(customer.id).scheduled_on(entry.id);
        if let Some(subscription) = subscription {
            class = class.with_subscription(subscription.id);
        }
        repo.create_class(&class).await.unwrap();
    }

    fn check(repo: Arc<InMemoryRepository>, notifier: Arc<RecordingNotifier>) -> InactivityCheck {
        InactivityCheck::new(Arc::new(FixedClock(now())), repo, notifier, 7)
    }

    #[tokio::test]
    async fn test_notifies_only_inactive_subscribers() {
        let repo = Arc::new(InMemoryRepository::new());
        let (active, active_sub) = subscribed_customer(&repo, "Active").await;
        let (idle, _) = subscribed_customer(&repo, "Idle").await;
        let (stale, stale_sub) = subscribed_customer(&repo, "Stale").await;
        let unsubscribed = Customer::new("Walkin", "walkin@example.com", chrono_tz::UTC);
        repo.create_customer(&unsubscribed).await.unwrap();

        class_ending(&repo, &active, Some(&active_sub), now() - Duration::days(2)).await;
        class_ending(&repo, &idle, None, now() - Duration::days(1)).await;
        class_ending(&repo, &stale, Some(&stale_sub), now() - Duration::days(8)).await;

        let notifier = Arc::new(RecordingNotifier::default());
        let report = check(repo, notifier.clone()).run().await.unwrap();

        assert_eq!(
            report,
            InactivityReport {
                subscribed: 3,
                notified: 2,
                failed: 0
            }
        );
        let sent = notifier.sent.lock().await;
        let mut recipients: Vec<_> = sent.iter().flat_map(|n| n.to.clone()).collect();
        recipients.sort();
        assert_eq!(recipients, vec!["idle@example.com", "stale@example.com"]);
        assert!(sent.iter().all(|n| n.template == INACTIVITY_TEMPLATE));
        assert!(sent.iter().all(|n| n.timezone == chrono_tz::Europe::Moscow));
    }

    #[tokio::test]
    async fn test_class_ending_at_window_start_counts() {
        let repo = Arc::new(InMemoryRepository::new());
        let (customer, subscription) = subscribed_customer(&repo, "Edge").await;
        class_ending(&repo, &customer, Some(&subscription), now() - Duration::days(7)).await;

        let notifier = Arc::new(RecordingNotifier::default());
        let report = check(repo, notifier).run().await.unwrap();

        assert_eq!(report.notified, 0);
    }

    #[tokio::test]
    async fn test_fully_used_subscription_is_ignored() {
        let repo = Arc::new(InMemoryRepository::new());
        let (_, mut subscription) = subscribed_customer(&repo, "Done").await;
        subscription.is_fully_used = true;
        repo.update_subscription(&subscription).await.unwrap();

        let notifier = Arc::new(RecordingNotifier::default());
        let report = check(repo, notifier).run().await.unwrap();

        assert_eq!(report, InactivityReport::default());
    }

    #[tokio::test]
    async fn test_failed_send_does_not_stop_sweep() {
        let repo = Arc::new(InMemoryRepository::new());
        subscribed_customer(&repo, "Broken").await;
        subscribed_customer(&repo, "Fine").await;

        let notifier = Arc::new(RecordingNotifier {
            failing: HashSet::from(["broken@example.com".to_string()]),
            ..Default::default()
        });
        let report = check(repo, notifier.clone()).run().await.unwrap();

        assert_eq!(report.notified, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(notifier.sent.lock().await[0].to, vec!["fine@example.com"]);
    }
}
