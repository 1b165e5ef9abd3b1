use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Slots;

/// What the scheduler needs to know about anything that can be booked.
///
/// Validation only ever goes through this trait, never through a concrete
/// lesson variant.
pub trait Bookable {
    fn name(&self) -> &str;

    fn duration(&self) -> Duration;

    fn slots(&self) -> Slots;

    /// The teacher the event is bound to, if any.
    fn host(&self) -> Option<Uuid>;
}

/// A lesson without a fixed host or capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonInfo {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "crate::serde::duration_seconds")]
    pub duration: Duration,
}

/// A group event run by one specific teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedEvent {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "crate::serde::duration_seconds")]
    pub duration: Duration,
    pub host: Uuid,
    pub slots: u32,
}

/// The bookable lesson variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Lesson {
    /// One-on-one lesson with any teacher.
    Ordinary(LessonInfo),
    /// Lesson for two customers.
    Paired(LessonInfo),
    MasterClass(HostedEvent),
    HappyHour(HostedEvent),
}

impl Lesson {
    pub fn ordinary(name: impl Into<String>, duration: Duration) -> Self {
        Lesson::Ordinary(LessonInfo::new(name, duration))
    }

    pub fn paired(name: impl Into<String>, duration: Duration) -> Self {
        Lesson::Paired(LessonInfo::new(name, duration))
    }

    pub fn master_class(name: impl Into<String>, duration: Duration, host: Uuid, slots: u32) -> Self {
        Lesson::MasterClass(HostedEvent::new(name, duration, host, slots))
    }

    pub fn happy_hour(name: impl Into<String>, duration: Duration, host: Uuid, slots: u32) -> Self {
        Lesson::HappyHour(HostedEvent::new(name, duration, host, slots))
    }

    pub fn id(&self) -> Uuid {
        match self {
            Lesson::Ordinary(info) | Lesson::Paired(info) => info.id,
            Lesson::MasterClass(event) | Lesson::HappyHour(event) => event.id,
        }
    }

    /// Short variant name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Lesson::Ordinary(_) => "ordinary_lesson",
            Lesson::Paired(_) => "paired_lesson",
            Lesson::MasterClass(_) => "master_class",
            Lesson::HappyHour(_) => "happy_hour",
        }
    }
}

impl Bookable for Lesson {
    fn name(&self) -> &str {
        match self {
            Lesson::Ordinary(info) | Lesson::Paired(info) => &info.name,
            Lesson::MasterClass(event) | Lesson::HappyHour(event) => &event.name,
        }
    }

    fn duration(&self) -> Duration {
        match self {
            Lesson::Ordinary(info) | Lesson::Paired(info) => info.duration,
            Lesson::MasterClass(event) | Lesson::HappyHour(event) => event.duration,
        }
    }

    fn slots(&self) -> Slots {
        match self {
            Lesson::Ordinary(_) => Slots::Unlimited,
            Lesson::Paired(_) => Slots::Limited(2),
            Lesson::MasterClass(event) | Lesson::HappyHour(event) => Slots::Limited(event.slots),
        }
    }

    fn host(&self) -> Option<Uuid> {
        match self {
            Lesson::Ordinary(_) | Lesson::Paired(_) => None,
            Lesson::MasterClass(event) | Lesson::HappyHour(event) => Some(event.host),
        }
    }
}

impl LessonInfo {
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            duration,
        }
    }
}

impl HostedEvent {
    pub fn new(name: impl Into<String>, duration: Duration, host: Uuid, slots: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            duration,
            host,
            slots,
        }
    }
}
