//! Students: admin and online registration, centre-scoped listing, trash,
//! admit subjects, marks, issue flags and exam paper uploads.

pub mod controller;
pub mod form;
pub mod router;
pub mod service;
