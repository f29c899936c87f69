//! Study-material consignments sent to centres.

pub mod controller;
pub mod router;
pub mod service;
