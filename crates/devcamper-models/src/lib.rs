//! # DevCamper Models
//!
//! Database entities, request DTOs and their validation rules.
//!
//! - [`ids`]: strongly-typed UUID identifiers
//! - [`users`]: users and roles
//! - [`auth`]: registration, login and password DTOs
//! - [`bootcamps`]: bootcamps, location and careers
//! - [`courses`]: courses and skill levels
//! - [`reviews`]: reviews and ratings

pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod ids;
pub mod reviews;
pub mod users;

pub use ids::{BootcampId, CourseId, ReviewId, UserId};

pub use auth::{
    ForgotPasswordDto, LoginDto, RegisterDto, ResetPasswordDto, UpdateDetailsDto,
    UpdatePasswordDto,
};
pub use bootcamps::{
    Bootcamp, BootcampSummary, BootcampWithCourses, CAREERS, CreateBootcampDto, Location,
    UpdateBootcampDto, generate_slug,
};
pub use courses::{Course, CourseWithBootcamp, CreateCourseDto, SkillLevel, UpdateCourseDto};
pub use reviews::{CreateReviewDto, Review, ReviewWithBootcamp, UpdateReviewDto};
pub use users::{CreateUserDto, UpdateUserDto, User, UserRole};
