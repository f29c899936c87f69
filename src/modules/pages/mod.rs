//! CMS pages and the team shown on the about page.

pub mod controller;
pub mod router;
pub mod service;
