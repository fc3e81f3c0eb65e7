//! # Inkpost Shared
//!
//! Form payloads and error shapes shared by the server and its tests.

pub mod dto;
pub mod response;

pub use dto::{LoginForm, PostForm};
pub use response::ErrorResponse;
