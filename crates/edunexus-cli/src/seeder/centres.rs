//! Approved admin-sourced centres with a shared development password.

use chrono::{Months, Utc};
use edunexus_models::{CentreId, CentreSource, CentreStatus};
use fake::Fake;
use fake::faker::address::en::{CityName, StateName};
use fake::faker::name::en::Name;
use rand::Rng;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Instant;

use super::models::{CentreSeed, SEED_PREFIX};

pub fn generate_centres(count: usize) -> Vec<CentreSeed> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let mut rng = rand::thread_rng();
            let city: String = CityName().fake();
            let owner: String = Name().fake();
            let mobile = format!("9{:09}", rng.gen_range(0..1_000_000_000u64));
            CentreSeed {
                centre_name: format!("{city} Computer Centre"),
                centre_code: format!("{SEED_PREFIX}CTR{:04}", i + 1),
                login_id: format!("{SEED_PREFIX}CEN{:04}", i + 1),
                email: format!("centre{}@example.com", i + 1),
                owner_name: owner,
                mobile,
                city,
                state: StateName().fake(),
                pincode: format!("{}", rng.gen_range(110_001..=855_999)),
            }
        })
        .collect()
}

/// Inserts centres and returns their codes for student assignment.
pub async fn seed_centres(
    db: &PgPool,
    count: usize,
    password_hash: &str,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let started = Instant::now();
    println!("🏫 Seeding {count} centres...");

    let centres = generate_centres(count);
    let now = Utc::now();
    let renewal_to = now
        .checked_add_months(Months::new(24))
        .ok_or("renewal window out of range")?;

    let mut tx = db.begin().await?;
    for chunk in centres.chunks(500) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO centres (id, centre_name, centre_code, login_id, password, owner_name, \
             mobile, email, centre_city, centre_state, centre_pincode, theory_room, practical_room, \
             internet, offers_computer, source, status, approved, renewal_from, renewal_to) ",
        );
        qb.push_values(chunk, |mut row, c| {
            row.push_bind(CentreId::new())
                .push_bind(&c.centre_name)
                .push_bind(&c.centre_code)
                .push_bind(&c.login_id)
                .push_bind(password_hash)
                .push_bind(&c.owner_name)
                .push_bind(&c.mobile)
                .push_bind(&c.email)
                .push_bind(&c.city)
                .push_bind(&c.state)
                .push_bind(&c.pincode)
                .push_bind(true)
                .push_bind(true)
                .push_bind(true)
                .push_bind(true)
                .push_bind(CentreSource::Admin)
                .push_bind(CentreStatus::Active)
                .push_bind(true)
                .push_bind(now)
                .push_bind(renewal_to);
        });
        qb.build().execute(&mut *tx).await?;
    }
    tx.commit().await?;

    println!("   ✓ Inserted {} centres in {:?}", centres.len(), started.elapsed());

    Ok(centres.into_iter().map(|c| c.centre_code).collect())
}
