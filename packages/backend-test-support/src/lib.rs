//! Backend test support utilities
//!
//! This crate provides utilities specifically for backend testing: scratch
//! databases carrying the users/profiles schema, response envelope
//! assertions, unique test data and unified logging initialization.

pub mod envelope;
pub mod logging;
pub mod scratch_db;
pub mod unique_helpers;
