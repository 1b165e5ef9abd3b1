//! Shared application state.
//!
//! Holds the services built over one storage backend. Cloning is cheap; all
//! clones share the same repositories and per-teacher locks.

use std::sync::Arc;

use lessonbook_core::clock::Clock;
use lessonbook_core::notify::Notifier;
use lessonbook_core::storage::{
    CustomerRepository, EntryRepository, SubscriptionRepository, TeacherRepository,
    WorkingHoursRepository,
};

use crate::booking::BookingService;
use crate::config::Config;
use crate::inactivity::InactivityCheck;

#[derive(Clone)]
pub struct AppState {
    pub booking: Arc<BookingService>,
    pub inactivity: Arc<InactivityCheck>,
}

impl AppState {
    /// Builds every service over a single repository implementing all storage traits.
    pub fn new<R>(
        repo: Arc<R>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        config: &Config,
    ) -> Self
    where
        R: TeacherRepository
            + WorkingHoursRepository
            + EntryRepository
            + CustomerRepository
            + SubscriptionRepository
            + 'static,
    {
        let booking = BookingService::new(repo.clone(), repo.clone(), repo.clone(), repo.clone());
        let inactivity =
            InactivityCheck::new(clock, repo, notifier, config.inactivity_window_days);

        Self {
            booking: Arc::new(booking),
            inactivity: Arc::new(inactivity),
        }
    }
}
