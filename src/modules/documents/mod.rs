//! PDF admit cards, certificates and ID cards generated from student records.

pub mod controller;
pub mod grade;
pub mod pdf;
pub mod router;
pub mod service;
