//! Library books and downloadable files. Rows own their uploads.

pub mod controller;
pub mod router;
pub mod service;
