//! Fake bootcamps, one per publisher.

use devcamper_models::{BootcampId, CAREERS, Location, UserId, generate_slug};
use fake::faker::address::en::*;
use fake::faker::lorem::en::*;
use fake::faker::phone_number::en::PhoneNumber;
use fake::{Fake, Faker};
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Instant;

use super::models::BootcampSeed;

pub fn generate_bootcamps(owners: &[UserId]) -> Vec<BootcampSeed> {
    owners
        .par_iter()
        .enumerate()
        .map(|(idx, &user_id)| {
            let city: String = CityName().fake();
            let street: String = StreetName().fake();
            let building: String = BuildingNumber().fake();
            let state: String = StateAbbr().fake();
            let zipcode: String = ZipCode().fake();

            let short_city: String = city.chars().take(30).collect();
            let name = format!("{} Code Camp {}", short_city, idx + 1);
            let slug = generate_slug(&name);
            let address = format!("{} {} {} {} {}", building, street, city, state, zipcode);

            let sentence: String = Sentence(8..16).fake();
            let description: String = sentence.chars().take(500).collect();

            let phone: String = PhoneNumber().fake();
            let phone: String = phone.chars().take(20).collect();

            let career_count = (1..=3).fake::<usize>();
            let first = (0..CAREERS.len()).fake::<usize>();
            let careers = (0..career_count)
                .map(|offset| CAREERS[(first + offset) % CAREERS.len()].to_string())
                .collect();

            BootcampSeed {
                user_id,
                website: format!("https://{}.example.com", slug),
                email: format!("enroll@{}.example.com", slug),
                location: Location {
                    longitude: Some((-122.0..-71.0).fake::<f64>()),
                    latitude: Some((26.0..47.0).fake::<f64>()),
                    formatted_address: Some(format!(
                        "{} {}, {}, {} {}",
                        building, street, city, state, zipcode
                    )),
                    street: Some(format!("{} {}", building, street)),
                    city: Some(city),
                    state: Some(state),
                    zipcode: Some(zipcode),
                    country: Some("US".to_string()),
                },
                name,
                slug,
                description,
                phone,
                address,
                careers,
                housing: Faker.fake(),
                job_assistance: Faker.fake(),
                job_guarantee: Faker.fake(),
                accept_gi: Faker.fake(),
            }
        })
        .collect()
}

pub async fn seed_bootcamps(db: &PgPool, owners: &[UserId]) -> anyhow::Result<Vec<BootcampId>> {
    let start_time = Instant::now();
    println!("🏕️  Seeding {} bootcamps...", owners.len());

    let bootcamps = generate_bootcamps(owners);
    let ids = insert_bootcamps(db, &bootcamps).await?;

    println!(
        "   ✓ Inserted {} bootcamps in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

async fn insert_bootcamps(
    db: &PgPool,
    bootcamps: &[BootcampSeed],
) -> anyhow::Result<Vec<BootcampId>> {
    // 21 params per bootcamp
    const BATCH_SIZE: usize = 500;

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(bootcamps.len());

    for chunk in bootcamps.chunks(BATCH_SIZE) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO bootcamps (user_id, name, slug, description, website, phone, email, \
             address, longitude, latitude, formatted_address, street, city, state, zipcode, \
             country, careers, housing, job_assistance, job_guarantee, accept_gi) ",
        );
        qb.push_values(chunk, |mut row, b| {
            row.push_bind(b.user_id)
                .push_bind(&b.name)
                .push_bind(&b.slug)
                .push_bind(&b.description)
                .push_bind(&b.website)
                .push_bind(&b.phone)
                .push_bind(&b.email)
                .push_bind(&b.address)
                .push_bind(b.location.longitude)
                .push_bind(b.location.latitude)
                .push_bind(&b.location.formatted_address)
                .push_bind(&b.location.street)
                .push_bind(&b.location.city)
                .push_bind(&b.location.state)
                .push_bind(&b.location.zipcode)
                .push_bind(&b.location.country)
                .push_bind(&b.careers)
                .push_bind(b.housing)
                .push_bind(b.job_assistance)
                .push_bind(b.job_guarantee)
                .push_bind(b.accept_gi);
        });
        qb.push(" RETURNING id");

        let chunk_ids: Vec<BootcampId> = qb.build_query_scalar().fetch_all(&mut *tx).await?;
        ids.extend(chunk_ids);
    }

    tx.commit().await?;
    Ok(ids)
}
