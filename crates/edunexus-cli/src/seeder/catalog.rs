//! Categories and courses.

use edunexus_models::courses::CourseSubject;
use edunexus_models::{CategoryId, CourseId};
use fake::Fake;
use fake::faker::lorem::en::Word;
use rand::Rng;
use rayon::prelude::*;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Instant;

use super::models::{CategorySeed, CourseSeed, SEED_PREFIX};

const CATEGORY_NAMES: &[&str] = &[
    "Computer Applications",
    "Vocational Training",
    "Language Studies",
    "Typing & Stenography",
    "Accounting",
    "Hardware & Networking",
];

const DURATIONS: &[&str] = &["3 Months", "6 Months", "1 Year"];

pub fn generate_categories(count: usize) -> Vec<CategorySeed> {
    (0..count)
        .map(|i| {
            let base = CATEGORY_NAMES[i % CATEGORY_NAMES.len()];
            CategorySeed {
                id: CategoryId::new(),
                name: format!("{base} {}", i + 1),
                code: format!("{SEED_PREFIX}CAT{:03}", i + 1),
            }
        })
        .collect()
}

pub fn generate_courses(categories: &[CategorySeed], per_category: usize) -> Vec<CourseSeed> {
    categories
        .par_iter()
        .enumerate()
        .flat_map(|(cat_idx, category)| {
            let mut rng = rand::thread_rng();
            (0..per_category)
                .map(|course_idx| {
                    let topic: String = Word().fake();
                    let n = cat_idx * 100 + course_idx + 1;
                    let subjects = (1..=rng.gen_range(2..=5))
                        .map(|s| CourseSubject {
                            name: format!("{} Paper {s}", capitalize(&topic)),
                            full_marks: 100,
                        })
                        .collect();
                    CourseSeed {
                        id: CourseId::new(),
                        category_id: category.id,
                        name: format!("Diploma in {} {n}", capitalize(&topic)),
                        code: format!("{SEED_PREFIX}CRS{n:04}"),
                        duration: DURATIONS[rng.gen_range(0..DURATIONS.len())],
                        fee: f64::from(rng.gen_range(15..=120u32) * 100),
                        subjects,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub async fn seed_catalog(
    db: &PgPool,
    categories: usize,
    per_category: usize,
) -> Result<Vec<CourseId>, Box<dyn std::error::Error>> {
    let started = Instant::now();
    println!("📚 Seeding {categories} categories with {per_category} courses each...");

    let category_rows = generate_categories(categories);
    let course_rows = generate_courses(&category_rows, per_category);

    let mut tx = db.begin().await?;

    if !category_rows.is_empty() {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO categories (id, name, code, description) ");
        qb.push_values(&category_rows, |mut row, c| {
            row.push_bind(c.id)
                .push_bind(&c.name)
                .push_bind(&c.code)
                .push_bind("Seeded category");
        });
        qb.build().execute(&mut *tx).await?;
    }

    for chunk in course_rows.chunks(500) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO courses (id, category_id, name, code, duration, fee, exam_fee, subjects) ",
        );
        qb.push_values(chunk, |mut row, c| {
            row.push_bind(c.id)
                .push_bind(c.category_id)
                .push_bind(&c.name)
                .push_bind(&c.code)
                .push_bind(c.duration)
                .push_bind(c.fee)
                .push_bind(250.0_f64)
                .push_bind(Json(&c.subjects));
        });
        qb.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} categories and {} courses in {:?}",
        category_rows.len(),
        course_rows.len(),
        started.elapsed()
    );

    Ok(course_rows.into_iter().map(|c| c.id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_carry_seed_prefix() {
        let categories = generate_categories(3);
        let courses = generate_courses(&categories, 2);
        assert_eq!(courses.len(), 6);
        assert!(categories.iter().all(|c| c.code.starts_with(SEED_PREFIX)));
        assert!(courses.iter().all(|c| c.code.starts_with(SEED_PREFIX)));
        assert!(courses.iter().all(|c| !c.subjects.is_empty()));
    }

    #[test]
    fn course_codes_are_unique() {
        let categories = generate_categories(4);
        let courses = generate_courses(&categories, 5);
        let mut codes: Vec<_> = courses.iter().map(|c| c.code.clone()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 20);
    }
}
