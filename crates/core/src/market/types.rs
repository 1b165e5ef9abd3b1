use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A student who books lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub timezone: Tz,
}

impl Customer {
    pub fn new(name: impl Into<String>, email: impl Into<String>, timezone: Tz) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            timezone,
        }
    }
}

/// A prepaid bundle of classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub is_fully_used: bool,
}

impl Subscription {
    pub fn new(customer_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            is_fully_used: false,
        }
    }
}

/// A customer's single use of a lesson, optionally paid by a subscription
/// and optionally scheduled on a timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub subscription_id: Option<Uuid>,
    pub timeline_entry_id: Option<Uuid>,
}

impl Class {
    pub fn new(customer_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            subscription_id: None,
            timeline_entry_id: None,
        }
    }

    pub fn with_subscription(mut self, subscription_id: Uuid) -> Self {
        self.subscription_id = Some(subscription_id);
        self
    }

    pub fn scheduled_on(mut self, timeline_entry_id: Uuid) -> Self {
        self.timeline_entry_id = Some(timeline_entry_id);
        self
    }
}
