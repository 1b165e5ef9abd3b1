//! Booking service: the imperative shell around the scheduling validator.
//!
//! Every mutation of a teacher's timeline goes through [`BookingService`],
//! which fetches a snapshot of the teacher's calendar, validates the candidate
//! entry against it and persists only on success. Mutations for one teacher
//! are serialized by [`TeacherLocks`].

mod locks;
mod service;

pub use locks::TeacherLocks;
pub use service::BookingService;
