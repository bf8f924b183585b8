//! Fake publishers and reviewers.

use anyhow::Context;
use devcamper_core::password::BCRYPT_COST;
use devcamper_models::{UserId, UserRole};
use fake::Fake;
use fake::faker::name::en::*;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Instant;

use super::models::UserSeed;

/// Password shared by every seeded account.
pub const SEED_PASSWORD: &str = "123456";

/// Suffix identifying seeded accounts.
pub const SEED_EMAIL_DOMAIN: &str = "example.com";

/// Generates users and hashes their passwords in parallel.
pub fn generate_users(role: UserRole, count: usize) -> anyhow::Result<Vec<UserSeed>> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();

            let password_hash =
                bcrypt::hash(SEED_PASSWORD, BCRYPT_COST).context("Failed to hash password")?;

            Ok(UserSeed {
                email: format!(
                    "{}.{}+{}{}@{}",
                    first_name.to_lowercase(),
                    last_name.to_lowercase(),
                    role,
                    idx,
                    SEED_EMAIL_DOMAIN
                ),
                name: format!("{} {}", first_name, last_name),
                role,
                password_hash,
            })
        })
        .collect()
}

pub async fn seed_users(db: &PgPool, role: UserRole, count: usize) -> anyhow::Result<Vec<UserId>> {
    let start_time = Instant::now();
    println!("👥 Seeding {} {} accounts...", count, role);

    let users = generate_users(role, count)?;
    let ids = insert_users(db, &users).await?;

    println!(
        "   ✓ Inserted {} {} accounts in {:?}",
        ids.len(),
        role,
        start_time.elapsed()
    );

    Ok(ids)
}

async fn insert_users(db: &PgPool, users: &[UserSeed]) -> anyhow::Result<Vec<UserId>> {
    // 4 params per user
    const BATCH_SIZE: usize = 1000;

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(users.len());

    for chunk in users.chunks(BATCH_SIZE) {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO users (name, email, role, password) ");
        qb.push_values(chunk, |mut row, user| {
            row.push_bind(&user.name)
                .push_bind(&user.email)
                .push_bind(user.role)
                .push_bind(&user.password_hash);
        });
        qb.push(" RETURNING id");

        let chunk_ids: Vec<UserId> = qb.build_query_scalar().fetch_all(&mut *tx).await?;
        ids.extend(chunk_ids);
    }

    tx.commit().await?;
    Ok(ids)
}
