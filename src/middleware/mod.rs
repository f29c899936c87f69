//! Middleware and extractors for authentication and authorization.
//!
//! - [`auth`]: the [`auth::AuthUser`] bearer-token extractor
//! - [`role`]: role allow-list layers (`require_admin`, `require_staff`, ...)
//!
//! # Authentication Flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. A role layer validates the token and checks the role against its list
//! 3. Handlers take `AuthUser` when they need the caller's identity, for
//!    example to scope a centre login to its own students

pub mod auth;
pub mod role;
