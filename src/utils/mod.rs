//! Helpers shared by the feature modules.
//!
//! - [`uploads`]: Persisting validated uploads and best-effort file cleanup
//! - [`sql`]: Dynamic filter fragments and unique-violation mapping

pub mod sql;
pub mod uploads;
