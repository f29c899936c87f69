//! Admin-registered students spread over seeded centres and courses.

use chrono::{Datelike, NaiveDate, Utc};
use edunexus_models::{CourseId, RegistrationType, StudentId, StudentStatus};
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use rand::Rng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Instant;

use super::models::{SEED_PREFIX, StudentSeed};

pub fn generate_students(
    centre_codes: &[String],
    course_ids: &[CourseId],
    per_centre: usize,
) -> Vec<StudentSeed> {
    let today = Utc::now().date_naive();

    centre_codes
        .par_iter()
        .enumerate()
        .flat_map(|(centre_idx, centre_code)| {
            let mut rng = rand::thread_rng();
            (0..per_centre)
                .filter_map(|i| {
                    let course_id = *course_ids.choose(&mut rng)?;
                    let serial = centre_idx * 10_000 + i + 1;
                    let last: String = LastName().fake();
                    let first: String = FirstName().fake();
                    let father: String = FirstName().fake();
                    let dob = NaiveDate::from_ymd_opt(
                        today.year() - rng.gen_range(16..=30),
                        rng.gen_range(1..=12),
                        rng.gen_range(1..=28),
                    )?;
                    let admission_date = today - chrono::Duration::days(rng.gen_range(0..365));
                    Some(StudentSeed {
                        enrollment_no: format!("{SEED_PREFIX}EN{serial:07}"),
                        roll_no: format!("{SEED_PREFIX}RN{serial:07}"),
                        student_name: format!("{first} {last}"),
                        father_name: format!("{father} {last}"),
                        dob,
                        gender: if rng.gen_bool(0.5) { "Male" } else { "Female" },
                        mobile: format!("8{:09}", rng.gen_range(0..1_000_000_000u64)),
                        course_id,
                        centre_code: centre_code.clone(),
                        session: format!("{}-{}", admission_date.year(), admission_date.year() + 1),
                        admission_date,
                        duration: "6 Months",
                        total_fee: f64::from(rng.gen_range(20..=90u32) * 100),
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub async fn seed_students(
    db: &PgPool,
    centre_codes: &[String],
    course_ids: &[CourseId],
    per_centre: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    let started = Instant::now();
    println!(
        "🎓 Seeding {} students ({per_centre} per centre)...",
        centre_codes.len() * per_centre
    );

    let students = generate_students(centre_codes, course_ids, per_centre);

    let mut tx = db.begin().await?;
    for chunk in students.chunks(1000) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO students (id, registration_type, enrollment_no, roll_no, student_name, \
             father_name, dob, gender, mobile, course_id, centre_code, session, admission_date, \
             duration, total_fee, student_status) ",
        );
        qb.push_values(chunk, |mut row, s| {
            row.push_bind(StudentId::new())
                .push_bind(RegistrationType::Admin)
                .push_bind(&s.enrollment_no)
                .push_bind(&s.roll_no)
                .push_bind(&s.student_name)
                .push_bind(&s.father_name)
                .push_bind(s.dob)
                .push_bind(s.gender)
                .push_bind(&s.mobile)
                .push_bind(s.course_id)
                .push_bind(&s.centre_code)
                .push_bind(&s.session)
                .push_bind(s.admission_date)
                .push_bind(s.duration)
                .push_bind(s.total_fee)
                .push_bind(StudentStatus::Active);
        });
        qb.build().execute(&mut *tx).await?;
    }
    tx.commit().await?;

    println!("   ✓ Inserted {} students in {:?}", students.len(), started.elapsed());
    Ok(students.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn students_need_a_course() {
        let centres = vec!["SEED-CTR0001".to_string()];
        assert!(generate_students(&centres, &[], 5).is_empty());
    }

    #[test]
    fn generated_students_are_adults_or_teens_with_unique_numbers() {
        let centres = vec!["SEED-CTR0001".to_string(), "SEED-CTR0002".to_string()];
        let courses = vec![CourseId::new()];
        let students = generate_students(&centres, &courses, 10);
        assert_eq!(students.len(), 20);

        let mut enrollments: Vec<_> = students.iter().map(|s| s.enrollment_no.as_str()).collect();
        enrollments.sort_unstable();
        enrollments.dedup();
        assert_eq!(enrollments.len(), 20);

        let today = Utc::now().date_naive();
        assert!(students.iter().all(|s| s.dob < today && s.admission_date <= today));
    }
}
