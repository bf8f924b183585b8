//! Fake courses for seeded bootcamps.

use devcamper_models::{BootcampId, SkillLevel, UserId};
use fake::faker::lorem::en::*;
use fake::{Fake, Faker};
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Instant;

use super::models::CourseSeed;

const SKILL_LEVELS: [SkillLevel; 3] = [
    SkillLevel::Beginner,
    SkillLevel::Intermediate,
    SkillLevel::Advanced,
];

/// `bootcamps` pairs each bootcamp with its owner, who becomes the course creator.
pub fn generate_courses(
    bootcamps: &[(BootcampId, UserId)],
    per_bootcamp: usize,
) -> Vec<CourseSeed> {
    bootcamps
        .par_iter()
        .flat_map(|&(bootcamp_id, user_id)| {
            (0..per_bootcamp)
                .map(|_| {
                    let words: Vec<String> = Words(2..4).fake();
                    let title = words.join(" ");
                    // Whole hundreds keep the rounded average easy to eyeball.
                    let tuition = ((20..150).fake::<u32>() * 100) as f64;

                    CourseSeed {
                        bootcamp_id,
                        user_id,
                        title,
                        description: Sentence(6..12).fake(),
                        weeks: (4..16).fake::<u32>().to_string(),
                        tuition,
                        minimum_skill: SKILL_LEVELS[(0..SKILL_LEVELS.len()).fake::<usize>()],
                        scholarship_available: Faker.fake(),
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub async fn seed_courses(
    db: &PgPool,
    bootcamps: &[(BootcampId, UserId)],
    per_bootcamp: usize,
) -> anyhow::Result<u64> {
    let start_time = Instant::now();
    println!(
        "📘 Seeding {} courses ({} per bootcamp)...",
        bootcamps.len() * per_bootcamp,
        per_bootcamp
    );

    let courses = generate_courses(bootcamps, per_bootcamp);

    // 8 params per course
    const BATCH_SIZE: usize = 1000;

    let mut tx = db.begin().await?;
    let mut inserted = 0;

    for chunk in courses.chunks(BATCH_SIZE) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO courses (bootcamp_id, user_id, title, description, weeks, tuition, \
             minimum_skill, scholarship_available) ",
        );
        qb.push_values(chunk, |mut row, c| {
            row.push_bind(c.bootcamp_id)
                .push_bind(c.user_id)
                .push_bind(&c.title)
                .push_bind(&c.description)
                .push_bind(&c.weeks)
                .push_bind(c.tuition)
                .push_bind(c.minimum_skill)
                .push_bind(c.scholarship_available);
        });
        inserted += qb.build().execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} courses in {:?}",
        inserted,
        start_time.elapsed()
    );

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_courses_are_generated_per_bootcamp() {
        let bootcamps = vec![
            (BootcampId::new(), UserId::new()),
            (BootcampId::new(), UserId::new()),
        ];
        let courses = generate_courses(&bootcamps, 4);
        assert_eq!(courses.len(), 8);

        for (bootcamp_id, owner) in &bootcamps {
            let mine: Vec<_> = courses
                .iter()
                .filter(|c| c.bootcamp_id == *bootcamp_id)
                .collect();
            assert_eq!(mine.len(), 4);
            assert!(mine.iter().all(|c| c.user_id == *owner));
        }

        assert!(courses.iter().all(|c| c.tuition >= 0.0));
        assert!(courses.iter().all(|c| c.weeks.parse::<u32>().is_ok()));
    }
}
