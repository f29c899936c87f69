//! Job applications from the public careers page.

pub mod controller;
pub mod router;
pub mod service;
