//! Domain model for the attendance tracker.
//!
//! # Responsibility
//! - Define the student, attendance and activity records kept by the store.
//! - Validate user-submitted input before any store call is made.
//!
//! # Invariants
//! - Every record is identified by a stable UUID assigned at creation.
//! - At most one attendance record exists per `(student_id, date)`.

pub mod activity;
pub mod attendance;
pub mod student;
pub mod validation;
