//! Training centres.
//!
//! Registration (admin form and public application), document uploads,
//! listing with trash, and the status / renewal lifecycle.

pub mod controller;
pub mod form;
pub mod lifecycle;
pub mod router;
pub mod service;
