//! Use-case services.
//!
//! # Responsibility
//! - Validate input, call repositories and keep the query cache coherent.
//! - Keep presentation layers away from SQL and row mapping.

pub mod activity_service;
pub mod attendance_service;
pub mod stats;
pub mod student_service;
