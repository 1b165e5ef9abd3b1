//! Scheduling core for the lessonbook tutoring backend.
//!
//! Pure domain logic: where a lesson may be placed on a teacher's timeline,
//! how many customers it can hold, and who should be reminded to book again.
//! Persistence, time and notification delivery are reached through the
//! traits in [`storage`], [`clock`] and [`notify`].

pub mod clock;
pub mod market;
pub mod notify;
pub mod schedule;
pub mod serde;
pub mod storage;
