//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: caller contract violations
//! - [`error_kind::ErrorKind`]: user-facing failure categories and their help texts

pub mod error;
pub mod error_kind;
