//! Lessonbook: timeline scheduling backend for a tutoring platform.
//!
//! The pure scheduling rules live in `lessonbook_core`. This crate wires them
//! to storage backends, the booking service and the periodic inactivity check.

pub mod booking;
pub mod config;
pub mod error;
pub mod inactivity;
pub mod notify;
pub mod state;
pub mod storage;
