//! Centre to head-office messages.

pub mod controller;
pub mod router;
pub mod service;
