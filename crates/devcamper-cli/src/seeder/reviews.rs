//! Fake reviews. Each reviewer reviews a given bootcamp at most once.

use devcamper_models::{BootcampId, UserId};
use fake::Fake;
use fake::faker::lorem::en::*;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Instant;

use super::models::ReviewSeed;

/// Picks `per_bootcamp` distinct reviewers for each bootcamp, rotating through
/// the reviewer list so load is spread evenly.
pub fn generate_reviews(
    bootcamps: &[BootcampId],
    reviewers: &[UserId],
    per_bootcamp: usize,
) -> Vec<ReviewSeed> {
    if reviewers.is_empty() {
        return Vec::new();
    }
    let per_bootcamp = per_bootcamp.min(reviewers.len());

    bootcamps
        .par_iter()
        .enumerate()
        .flat_map(|(idx, &bootcamp_id)| {
            (0..per_bootcamp)
                .map(|offset| {
                    let user_id = reviewers[(idx + offset) % reviewers.len()];
                    let title: String = Sentence(2..5).fake();

                    ReviewSeed {
                        bootcamp_id,
                        user_id,
                        title: title.chars().take(100).collect(),
                        text: Paragraph(1..3).fake(),
                        rating: (1..=10).fake::<i32>(),
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub async fn seed_reviews(
    db: &PgPool,
    bootcamps: &[BootcampId],
    reviewers: &[UserId],
    per_bootcamp: usize,
) -> anyhow::Result<u64> {
    let start_time = Instant::now();
    let reviews = generate_reviews(bootcamps, reviewers, per_bootcamp);
    println!("⭐ Seeding {} reviews...", reviews.len());

    // 5 params per review
    const BATCH_SIZE: usize = 2000;

    let mut tx = db.begin().await?;
    let mut inserted = 0;

    for chunk in reviews.chunks(BATCH_SIZE) {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO reviews (bootcamp_id, user_id, title, text, rating) ");
        qb.push_values(chunk, |mut row, r| {
            row.push_bind(r.bootcamp_id)
                .push_bind(r.user_id)
                .push_bind(&r.title)
                .push_bind(&r.text)
                .push_bind(r.rating);
        });
        qb.push(" ON CONFLICT ON CONSTRAINT reviews_one_per_user DO NOTHING");
        inserted += qb.build().execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} reviews in {:?}",
        inserted,
        start_time.elapsed()
    );

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_reviewer_is_never_repeated_on_a_bootcamp() {
        let bootcamps: Vec<BootcampId> = (0..6).map(|_| BootcampId::new()).collect();
        let reviewers: Vec<UserId> = (0..4).map(|_| UserId::new()).collect();

        let reviews = generate_reviews(&bootcamps, &reviewers, 10);
        // Capped at the number of reviewers.
        assert_eq!(reviews.len(), 6 * 4);

        let pairs: HashSet<_> = reviews.iter().map(|r| (r.bootcamp_id, r.user_id)).collect();
        assert_eq!(pairs.len(), reviews.len());
        assert!(reviews.iter().all(|r| (1..=10).contains(&r.rating)));
        assert!(reviews.iter().all(|r| r.title.chars().count() <= 100));
    }

    #[test]
    fn test_no_reviewers_means_no_reviews() {
        assert!(generate_reviews(&[BootcampId::new()], &[], 3).is_empty());
    }
}
