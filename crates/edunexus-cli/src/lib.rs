//! # EduNexus CLI
//!
//! Seeding utilities for local development and load testing.
//!
//! Every seeded row carries a `SEED-` code prefix so `clear-seed` can remove
//! exactly what it created and nothing else.
//!
//! ```ignore
//! use edunexus_cli::seeder::{seed_all, SeedConfig};
//!
//! seed_all(&pool, SeedConfig::new(10)).await?;
//! ```

pub mod seeder;
