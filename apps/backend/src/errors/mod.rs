//! Error handling for the social media backend.

pub mod domain;

pub use domain::DomainError;
