//! Development data seeding.
//!
//! Generation runs on rayon (bcrypt hashing dominates), insertion uses
//! multi-row `INSERT` statements inside one transaction per table.

pub mod bootcamps;
pub mod courses;
pub mod models;
pub mod reviews;
pub mod users;

use devcamper_db::aggregates;
use devcamper_models::{BootcampId, UserId, UserRole};
use sqlx::PgPool;
use std::time::Instant;

pub use models::SeedConfig;
pub use users::{SEED_EMAIL_DOMAIN, SEED_PASSWORD};

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> anyhow::Result<()> {
    let start_time = Instant::now();
    println!("🌱 Seeding database with {:?}\n", config);

    let publishers = users::seed_users(db, UserRole::Publisher, config.publishers).await?;
    let reviewers = users::seed_users(db, UserRole::User, config.reviewers).await?;

    let bootcamp_ids = bootcamps::seed_bootcamps(db, &publishers).await?;
    let owned: Vec<(BootcampId, UserId)> = bootcamp_ids
        .iter()
        .copied()
        .zip(publishers.iter().copied())
        .collect();

    courses::seed_courses(db, &owned, config.courses_per_bootcamp).await?;
    reviews::seed_reviews(db, &bootcamp_ids, &reviewers, config.reviews_per_bootcamp).await?;

    let refreshed = aggregates::refresh_all(db).await?;
    println!("📊 Refreshed averages on {} bootcamps", refreshed);

    println!(
        "\n✅ Seeding complete in {:?}. Seeded accounts use the password '{}'",
        start_time.elapsed(),
        SEED_PASSWORD
    );
    Ok(())
}

/// Deletes every review, course, bootcamp and user.
pub async fn destroy_all(db: &PgPool) -> anyhow::Result<()> {
    let start_time = Instant::now();
    println!("🗑️  Destroying all data...");

    let mut tx = db.begin().await?;
    for table in ["reviews", "courses", "bootcamps", "users"] {
        let deleted = sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        println!("   ✓ Deleted {} {}", deleted, table);
    }
    tx.commit().await?;

    println!("\n✅ Data destroyed in {:?}", start_time.elapsed());
    Ok(())
}
