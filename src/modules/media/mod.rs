//! Gallery images and home page sliders.

pub mod controller;
pub mod router;
pub mod service;
