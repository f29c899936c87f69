//! Contact enquiries and public feedback.

pub mod controller;
pub mod router;
pub mod service;
