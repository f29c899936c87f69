//! Course categories and courses. Reads are public; writes need a staff login.

pub mod controller;
pub mod router;
pub mod service;
