//! Fee receipts recorded against students.

pub mod controller;
pub mod router;
pub mod service;
