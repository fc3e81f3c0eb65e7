//! # Inkpost Core
//!
//! The domain layer of the Inkpost blog.
//! Posts, users and the ports the infrastructure must implement; no database or HTTP code.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::DomainError;
