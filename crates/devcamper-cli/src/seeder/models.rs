//! Rows generated by the seeder before insertion.

use devcamper_models::{BootcampId, Location, SkillLevel, UserId, UserRole};

pub struct UserSeed {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub password_hash: String,
}

pub struct BootcampSeed {
    pub user_id: UserId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub location: Location,
    pub careers: Vec<String>,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
}

pub struct CourseSeed {
    pub bootcamp_id: BootcampId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: f64,
    pub minimum_skill: SkillLevel,
    pub scholarship_available: bool,
}

pub struct ReviewSeed {
    pub bootcamp_id: BootcampId,
    pub user_id: UserId,
    pub title: String,
    pub text: String,
    pub rating: i32,
}

/// How much fake data to generate.
#[derive(Clone, Debug)]
pub struct SeedConfig {
    /// One bootcamp is created per publisher.
    pub publishers: usize,
    pub reviewers: usize,
    pub courses_per_bootcamp: usize,
    /// Capped at `reviewers`, since a user reviews a bootcamp at most once.
    pub reviews_per_bootcamp: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            publishers: 5,
            reviewers: 10,
            courses_per_bootcamp: 4,
            reviews_per_bootcamp: 3,
        }
    }
}

impl SeedConfig {
    pub fn new(publishers: usize) -> Self {
        Self {
            publishers,
            ..Default::default()
        }
    }

    pub fn total_courses(&self) -> usize {
        self.publishers * self.courses_per_bootcamp
    }

    pub fn total_reviews(&self) -> usize {
        self.publishers * self.reviews_per_bootcamp.min(self.reviewers)
    }
}
