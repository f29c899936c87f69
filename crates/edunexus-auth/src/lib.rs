//! # EduNexus Auth
//!
//! Authentication types and JWT utilities.
//!
//! - [`roles`]: The four principals that can hold a token
//! - [`claims`]: Access token claims
//! - [`jwt`]: Token creation and verification
//!
//! Staff accounts (`admin`, `staff`) sign in with email and password, centres
//! with their login id and password, and students with enrollment number and
//! date of birth. All four receive the same kind of bearer token.
//!
//! ```ignore
//! use edunexus_auth::{create_access_token, verify_token, Role};
//!
//! let token = create_access_token(centre_id, Role::Center, "CTR1234", Some("CEN-001"), &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.role, Role::Center);
//! ```

pub mod claims;
pub mod jwt;
pub mod roles;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
pub use roles::Role;
