//! Bootcamps.

use chrono::{DateTime, Utc};
use devcamper_core::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::courses::Course;
use crate::ids::{BootcampId, UserId};

/// Careers a bootcamp may advertise.
pub const CAREERS: [&str; 6] = [
    "Web Development",
    "Mobile Development",
    "UI/UX",
    "Data Science",
    "Business",
    "Other",
];

/// Geocoded location, stored flat on the bootcamp row and nested in JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Location {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub formatted_address: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

impl Location {
    pub fn point(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct Bootcamp {
    pub id: BootcampId,
    pub user_id: UserId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: String,
    #[sqlx(flatten)]
    pub location: Location,
    pub careers: Vec<String>,
    pub average_rating: Option<f64>,
    pub average_cost: Option<f64>,
    pub photo: String,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column list matching [`Bootcamp`].
pub const BOOTCAMP_COLUMNS: &str = "id, user_id, name, slug, description, website, phone, email, \
     address, longitude, latitude, formatted_address, street, city, state, zipcode, country, \
     careers, average_rating, average_cost, photo, housing, job_assistance, job_guarantee, \
     accept_gi, created_at, updated_at";

/// Bootcamp listing entry with its courses populated.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BootcampWithCourses {
    #[serde(flatten)]
    pub bootcamp: Bootcamp,
    pub courses: Vec<Course>,
}

/// Parent bootcamp embedded in course and review listings.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct BootcampSummary {
    pub id: BootcampId,
    pub name: String,
    pub description: String,
}

/// Lowercases `name` and joins its alphanumeric runs with `-`.
pub fn generate_slug(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn validate_careers(careers: &Vec<String>) -> Result<(), ValidationError> {
    if careers.is_empty() {
        let mut err = ValidationError::new("careers");
        err.message = Some("Please add at least one career".into());
        return Err(err);
    }

    if let Some(unknown) = careers.iter().find(|c| !CAREERS.contains(&c.as_str())) {
        let mut err = ValidationError::new("careers");
        err.message = Some(format!("'{}' is not a supported career", unknown).into());
        return Err(err);
    }

    Ok(())
}

fn validate_http_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(());
    }
    let mut err = ValidationError::new("website");
    err.message = Some("Please use a valid URL with HTTP or HTTPS".into());
    Err(err)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBootcampDto {
    #[validate(length(min = 1, max = 50, message = "Name can not be more than 50 characters"))]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 500,
        message = "Description can not be more than 500 characters"
    ))]
    pub description: String,
    #[validate(
        url(message = "Please use a valid URL with HTTP or HTTPS"),
        custom(function = "validate_http_url")
    )]
    pub website: Option<String>,
    #[validate(length(max = 20, message = "Phone number can not be longer than 20 characters"))]
    pub phone: Option<String>,
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Please add an address"))]
    pub address: String,
    #[validate(custom(function = "validate_careers"))]
    pub careers: Vec<String>,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBootcampDto {
    #[validate(length(min = 1, max = 50, message = "Name can not be more than 50 characters"))]
    pub name: Option<String>,
    #[validate(length(
        min = 1,
        max = 500,
        message = "Description can not be more than 500 characters"
    ))]
    pub description: Option<String>,
    #[validate(
        url(message = "Please use a valid URL with HTTP or HTTPS"),
        custom(function = "validate_http_url")
    )]
    pub website: Option<String>,
    #[validate(length(max = 20, message = "Phone number can not be longer than 20 characters"))]
    pub phone: Option<String>,
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Please add an address"))]
    pub address: Option<String>,
    #[validate(custom(function = "validate_careers"))]
    pub careers: Option<Vec<String>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}
