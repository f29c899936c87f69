//! Development seed data: categories, courses, centres and students.

mod catalog;
mod centres;
mod models;
mod students;

pub use catalog::{generate_categories, generate_courses, seed_catalog};
pub use centres::{generate_centres, seed_centres};
pub use models::{SEED_PREFIX, SeedConfig};
pub use students::{generate_students, seed_students};

use sqlx::PgPool;
use std::time::Instant;

/// Password shared by every seeded centre login.
pub const SEED_CENTRE_PASSWORD: &str = "centre123";

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    println!("🌱 Starting database seed\n");

    let password_hash = edunexus_core::hash_password(SEED_CENTRE_PASSWORD)
        .map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let course_ids = seed_catalog(db, config.categories, config.courses_per_category).await?;
    let centre_codes = seed_centres(db, config.centres, &password_hash).await?;
    let students = seed_students(db, &centre_codes, &course_ids, config.students_per_centre).await?;

    println!("\n✅ Seed complete in {:?}", started.elapsed());
    println!("   Courses:  {}", course_ids.len());
    println!("   Centres:  {} (password: {SEED_CENTRE_PASSWORD})", centre_codes.len());
    println!("   Students: {students}");
    Ok(())
}

/// Deletes every row carrying the seed prefix. Staff accounts are untouched.
pub async fn clear_all(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    println!("🗑️  Clearing seeded data...");

    let pattern = format!("{SEED_PREFIX}%");
    let mut tx = db.begin().await?;

    for (table, column) in [
        ("students", "enrollment_no"),
        ("centres", "centre_code"),
        ("courses", "code"),
        ("categories", "code"),
    ] {
        let deleted = sqlx::query(&format!("DELETE FROM {table} WHERE {column} LIKE $1"))
            .bind(&pattern)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        println!("   ✓ {table}: {deleted}");
    }

    tx.commit().await?;
    println!("✅ Cleared seeded data in {:?}", started.elapsed());
    Ok(())
}
