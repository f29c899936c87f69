//! Sign-in for staff users, centres and students, each issuing the same
//! bearer token shape with a different role.

pub mod controller;
pub mod router;
pub mod service;
