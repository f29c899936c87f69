//! # EduNexus Core
//!
//! Core types, errors, and utilities for the EduNexus API.
//!
//! This crate provides foundational types used throughout the application:
//!
//! - [`errors`]: Application error type with HTTP response conversion and
//!   aggregated per-field validation errors
//! - [`forms`]: Form payload normalization (key canonicalization, trimming,
//!   typed accessors for multipart string values)
//! - [`validation`]: Declarative field rule tables and aggregated validation
//! - [`identifiers`]: Candidate generation for enrollment numbers, centre
//!   codes and login ids, plus the bounded reserve-or-fail retry loop
//! - [`file_storage`]: Upload storage backends
//! - [`pagination`]: Pagination utilities for API responses
//! - [`password`]: Secure password hashing and verification
//! - [`serde`]: Custom serde serialization/deserialization helpers
//!
//! # Example
//!
//! ```ignore
//! use edunexus_core::errors::AppError;
//! use edunexus_core::forms::FormData;
//! use edunexus_core::validation::{validate_rules, Check, FieldRule};
//!
//! const RULES: &[FieldRule] = &[
//!     FieldRule::required("mobile", "Mobile").with(&[Check::MinDigits(10)]),
//! ];
//!
//! let form = FormData::from_pairs([("mobile", "12345")]);
//! let errors = validate_rules(&form, RULES, today);
//! errors.into_result()?;
//! ```

pub mod errors;
pub mod file_storage;
pub mod forms;
pub mod identifiers;
pub mod pagination;
pub mod password;
pub mod serde;
pub mod validation;

// Re-export commonly used types at crate root
pub use errors::{AppError, FieldErrors, duplicate_message};
pub use forms::FormData;
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
pub use validation::{Check, FieldRule, non_blank, validate_rules};
