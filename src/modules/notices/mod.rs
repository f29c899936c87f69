//! Notice board. Each notice may own one attachment.

pub mod controller;
pub mod router;
pub mod service;
