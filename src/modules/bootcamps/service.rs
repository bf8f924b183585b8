use std::collections::HashMap;
use std::path::Path;

use anyhow::anyhow;
use devcamper_core::file_storage::{FileStorage, StorageError, ensure_image};
use devcamper_core::geo::angular_radius;
use devcamper_core::{AppError, Pagination};
use devcamper_db::{AdvancedQuery, Column, ColumnKind, Resource, map_db_error};
use devcamper_models::bootcamps::BOOTCAMP_COLUMNS;
use devcamper_models::courses::COURSE_COLUMNS;
use devcamper_models::{
    Bootcamp, BootcampId, BootcampSummary, BootcampWithCourses, Course, CreateBootcampDto,
    Location, UpdateBootcampDto, User, UserId, generate_slug,
};
use sqlx::PgPool;
use tracing::instrument;

use crate::middleware::role::ensure_owner_or_admin;
use crate::utils::geocoder::{GeocodeError, Geocoder};

pub static BOOTCAMPS: Resource = Resource {
    table: "bootcamps",
    columns: &[
        Column::new("id", ColumnKind::Uuid),
        Column::new("user_id", ColumnKind::Uuid),
        Column::new("name", ColumnKind::Text),
        Column::new("slug", ColumnKind::Text),
        Column::new("description", ColumnKind::Text),
        Column::new("website", ColumnKind::Text),
        Column::new("phone", ColumnKind::Text),
        Column::new("email", ColumnKind::Text),
        Column::new("address", ColumnKind::Text),
        Column::nested("longitude", ColumnKind::Float, "location"),
        Column::nested("latitude", ColumnKind::Float, "location"),
        Column::nested("formatted_address", ColumnKind::Text, "location"),
        Column::nested("street", ColumnKind::Text, "location"),
        Column::nested("city", ColumnKind::Text, "location"),
        Column::nested("state", ColumnKind::Text, "location"),
        Column::nested("zipcode", ColumnKind::Text, "location"),
        Column::nested("country", ColumnKind::Text, "location"),
        Column::new("careers", ColumnKind::TextArray),
        Column::new("average_rating", ColumnKind::Float),
        Column::new("average_cost", ColumnKind::Float),
        Column::new("photo", ColumnKind::Text),
        Column::new("housing", ColumnKind::Boolean),
        Column::new("job_assistance", ColumnKind::Boolean),
        Column::new("job_guarantee", ColumnKind::Boolean),
        Column::new("accept_gi", ColumnKind::Boolean),
        Column::new("created_at", ColumnKind::Timestamp),
        Column::new("updated_at", ColumnKind::Timestamp),
    ],
};

const DEFAULT_PHOTO: &str = "no-photo.jpg";

fn bootcamp_not_found(id: BootcampId) -> AppError {
    AppError::not_found(anyhow!("Bootcamp not found with id of {}", id))
}

fn geocode_error(e: GeocodeError) -> AppError {
    match e {
        GeocodeError::NotFound(address) => {
            AppError::bad_request(anyhow!("Could not find a location for '{}'", address))
        }
        other => {
            tracing::error!(error = %other, "Geocoding failed");
            AppError::internal_error("Geocoding service unavailable")
        }
    }
}

fn storage_error(e: StorageError) -> AppError {
    match e {
        StorageError::IoError(io) => {
            tracing::error!(error = %io, "Photo could not be stored");
            AppError::internal_error("Problem with file upload")
        }
        other => AppError::bad_request(anyhow!(other.to_string())),
    }
}

/// `.jpg` from `me.jpg`, else derived from the `image/<subtype>` content type.
fn photo_extension(file_name: Option<&str>, content_type: &str) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| match content_type.split_once('/') {
            Some((_, "jpeg")) => ".jpg".to_string(),
            Some((_, subtype)) if subtype.chars().all(|c| c.is_ascii_alphanumeric()) => {
                format!(".{}", subtype)
            }
            _ => String::new(),
        })
}

/// An uploaded photo as read from the multipart body.
pub struct PhotoUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

pub struct BootcampService;

impl BootcampService {
    /// Owner of `id`, or 404.
    #[instrument(skip(db))]
    pub async fn bootcamp_owner(db: &PgPool, id: BootcampId) -> Result<UserId, AppError> {
        sqlx::query_scalar::<_, UserId>("SELECT user_id FROM bootcamps WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| bootcamp_not_found(id))
    }

    /// 404 when the bootcamp is missing, 401 unless `caller` owns it or is an admin.
    pub async fn ensure_can_modify(
        db: &PgPool,
        caller: &User,
        id: BootcampId,
        action: &str,
    ) -> Result<(), AppError> {
        let owner = Self::bootcamp_owner(db, id).await?;
        ensure_owner_or_admin(caller, owner, action, "bootcamp")
    }

    /// `{id, name, description}` of each bootcamp in `ids`, keyed by id.
    pub async fn fetch_summaries(
        db: &PgPool,
        ids: &[BootcampId],
    ) -> Result<HashMap<BootcampId, BootcampSummary>, AppError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let summaries = sqlx::query_as::<_, BootcampSummary>(
            "SELECT id, name, description FROM bootcamps WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(db)
        .await
        .map_err(map_db_error)?;

        Ok(summaries.into_iter().map(|s| (s.id, s)).collect())
    }

    #[instrument(skip(db, query))]
    pub async fn list_bootcamps(
        db: &PgPool,
        query: &AdvancedQuery,
    ) -> Result<(Vec<BootcampWithCourses>, Pagination), AppError> {
        let (bootcamps, pagination) = query.fetch::<Bootcamp>(db, BOOTCAMP_COLUMNS).await?;

        let ids: Vec<BootcampId> = bootcamps.iter().map(|b| b.id).collect();
        let mut courses_by_bootcamp: HashMap<BootcampId, Vec<Course>> = HashMap::new();

        if !ids.is_empty() {
            let courses = sqlx::query_as::<_, Course>(&format!(
                "SELECT {} FROM courses WHERE bootcamp_id = ANY($1) ORDER BY created_at ASC",
                COURSE_COLUMNS
            ))
            .bind(&ids)
            .fetch_all(db)
            .await
            .map_err(map_db_error)?;

            for course in courses {
                courses_by_bootcamp
                    .entry(course.bootcamp_id)
                    .or_default()
                    .push(course);
            }
        }

        let data = bootcamps
            .into_iter()
            .map(|bootcamp| BootcampWithCourses {
                courses: courses_by_bootcamp.remove(&bootcamp.id).unwrap_or_default(),
                bootcamp,
            })
            .collect();

        Ok((data, pagination))
    }

    #[instrument(skip(db))]
    pub async fn get_bootcamp(db: &PgPool, id: BootcampId) -> Result<Bootcamp, AppError> {
        sqlx::query_as::<_, Bootcamp>(&format!(
            "SELECT {} FROM bootcamps WHERE id = $1",
            BOOTCAMP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| bootcamp_not_found(id))
    }

    /// Non-admins may publish a single bootcamp. The check and the insert are
    /// separate statements, so two concurrent creations can both pass.
    #[instrument(skip(db, geocoder, owner, dto), fields(user.id = %owner.id))]
    pub async fn create_bootcamp(
        db: &PgPool,
        geocoder: &dyn Geocoder,
        owner: &User,
        dto: CreateBootcampDto,
    ) -> Result<Bootcamp, AppError> {
        if !owner.role.is_admin() {
            let published: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bootcamps WHERE user_id = $1)")
                    .bind(owner.id)
                    .fetch_one(db)
                    .await
                    .map_err(map_db_error)?;

            if published {
                return Err(AppError::bad_request(anyhow!(
                    "The user with ID {} has already published a bootcamp",
                    owner.id
                )));
            }
        }

        let location = geocoder
            .geocode(&dto.address)
            .await
            .map_err(geocode_error)?;

        let bootcamp = sqlx::query_as::<_, Bootcamp>(&format!(
            "INSERT INTO bootcamps (
                 user_id, name, slug, description, website, phone, email, address,
                 longitude, latitude, formatted_address, street, city, state, zipcode, country,
                 careers, housing, job_assistance, job_guarantee, accept_gi
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                     $17, $18, $19, $20, $21)
             RETURNING {}",
            BOOTCAMP_COLUMNS
        ))
        .bind(owner.id)
        .bind(&dto.name)
        .bind(generate_slug(&dto.name))
        .bind(&dto.description)
        .bind(&dto.website)
        .bind(&dto.phone)
        .bind(&dto.email)
        .bind(&dto.address)
        .bind(location.longitude)
        .bind(location.latitude)
        .bind(&location.formatted_address)
        .bind(&location.street)
        .bind(&location.city)
        .bind(&location.state)
        .bind(&location.zipcode)
        .bind(&location.country)
        .bind(&dto.careers)
        .bind(dto.housing)
        .bind(dto.job_assistance)
        .bind(dto.job_guarantee)
        .bind(dto.accept_gi)
        .fetch_one(db)
        .await
        .map_err(map_db_error)?;

        tracing::info!(bootcamp.id = %bootcamp.id, "Bootcamp created");
        Ok(bootcamp)
    }

    /// Applies the present fields. A new name regenerates the slug and a new
    /// address is geocoded again.
    #[instrument(skip(db, geocoder, caller, dto), fields(user.id = %caller.id))]
    pub async fn update_bootcamp(
        db: &PgPool,
        geocoder: &dyn Geocoder,
        caller: &User,
        id: BootcampId,
        dto: UpdateBootcampDto,
    ) -> Result<Bootcamp, AppError> {
        let mut bootcamp = Self::get_bootcamp(db, id).await?;
        ensure_owner_or_admin(caller, bootcamp.user_id, "update", "bootcamp")?;

        if let Some(name) = dto.name {
            bootcamp.slug = generate_slug(&name);
            bootcamp.name = name;
        }
        if let Some(address) = dto.address.filter(|a| *a != bootcamp.address) {
            bootcamp.location = geocoder.geocode(&address).await.map_err(geocode_error)?;
            bootcamp.address = address;
        }
        if let Some(description) = dto.description {
            bootcamp.description = description;
        }
        if let Some(website) = dto.website {
            bootcamp.website = Some(website);
        }
        if let Some(phone) = dto.phone {
            bootcamp.phone = Some(phone);
        }
        if let Some(email) = dto.email {
            bootcamp.email = Some(email);
        }
        if let Some(careers) = dto.careers {
            bootcamp.careers = careers;
        }
        bootcamp.housing = dto.housing.unwrap_or(bootcamp.housing);
        bootcamp.job_assistance = dto.job_assistance.unwrap_or(bootcamp.job_assistance);
        bootcamp.job_guarantee = dto.job_guarantee.unwrap_or(bootcamp.job_guarantee);
        bootcamp.accept_gi = dto.accept_gi.unwrap_or(bootcamp.accept_gi);

        let Location {
            longitude,
            latitude,
            formatted_address,
            street,
            city,
            state,
            zipcode,
            country,
        } = &bootcamp.location;

        let updated = sqlx::query_as::<_, Bootcamp>(&format!(
            "UPDATE bootcamps
             SET name = $2, slug = $3, description = $4, website = $5, phone = $6, email = $7,
                 address = $8, longitude = $9, latitude = $10, formatted_address = $11,
                 street = $12, city = $13, state = $14, zipcode = $15, country = $16,
                 careers = $17, housing = $18, job_assistance = $19, job_guarantee = $20,
                 accept_gi = $21, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            BOOTCAMP_COLUMNS
        ))
        .bind(id)
        .bind(&bootcamp.name)
        .bind(&bootcamp.slug)
        .bind(&bootcamp.description)
        .bind(&bootcamp.website)
        .bind(&bootcamp.phone)
        .bind(&bootcamp.email)
        .bind(&bootcamp.address)
        .bind(longitude)
        .bind(latitude)
        .bind(formatted_address)
        .bind(street)
        .bind(city)
        .bind(state)
        .bind(zipcode)
        .bind(country)
        .bind(&bootcamp.careers)
        .bind(bootcamp.housing)
        .bind(bootcamp.job_assistance)
        .bind(bootcamp.job_guarantee)
        .bind(bootcamp.accept_gi)
        .fetch_optional(db)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| bootcamp_not_found(id))?;

        tracing::info!(bootcamp.id = %id, "Bootcamp updated");
        Ok(updated)
    }

    /// Deletes the bootcamp with its courses and reviews, then its photo.
    #[instrument(skip(db, storage, caller), fields(user.id = %caller.id))]
    pub async fn delete_bootcamp(
        db: &PgPool,
        storage: &dyn FileStorage,
        caller: &User,
        id: BootcampId,
    ) -> Result<(), AppError> {
        let bootcamp = Self::get_bootcamp(db, id).await?;
        ensure_owner_or_admin(caller, bootcamp.user_id, "delete", "bootcamp")?;

        let mut tx = db.begin().await.map_err(map_db_error)?;

        let reviews = sqlx::query("DELETE FROM reviews WHERE bootcamp_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        let courses = sqlx::query("DELETE FROM courses WHERE bootcamp_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        sqlx::query("DELETE FROM bootcamps WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        tracing::info!(
            bootcamp.id = %id,
            courses = courses.rows_affected(),
            reviews = reviews.rows_affected(),
            "Bootcamp deleted"
        );

        if bootcamp.photo != DEFAULT_PHOTO {
            if let Err(e) = storage.delete(&bootcamp.photo).await {
                tracing::warn!(bootcamp.id = %id, error = %e, "Orphaned bootcamp photo");
            }
        }

        Ok(())
    }

    /// Bootcamps within `distance_km` of the geocoded `zipcode`.
    #[instrument(skip(db, geocoder))]
    pub async fn bootcamps_in_radius(
        db: &PgPool,
        geocoder: &dyn Geocoder,
        zipcode: &str,
        distance_km: f64,
    ) -> Result<Vec<Bootcamp>, AppError> {
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(AppError::bad_request(anyhow!(
                "Distance must be a non-negative number"
            )));
        }

        let centre = geocoder
            .geocode(zipcode)
            .await
            .map_err(geocode_error)?
            .point()
            .ok_or_else(|| {
                AppError::bad_request(anyhow!("Could not find a location for '{}'", zipcode))
            })?;

        let radius = angular_radius(distance_km);
        let (min_lat, max_lat) = centre.latitude_band(radius);

        let candidates = sqlx::query_as::<_, Bootcamp>(&format!(
            "SELECT {} FROM bootcamps
             WHERE latitude BETWEEN $1 AND $2 AND longitude IS NOT NULL
             ORDER BY created_at DESC, id ASC",
            BOOTCAMP_COLUMNS
        ))
        .bind(min_lat)
        .bind(max_lat)
        .fetch_all(db)
        .await
        .map_err(map_db_error)?;

        let bootcamps: Vec<Bootcamp> = candidates
            .into_iter()
            .filter(|b| {
                b.location
                    .point()
                    .is_some_and(|point| point.is_within(&centre, radius))
            })
            .collect();

        tracing::debug!(found = bootcamps.len(), radius, "Radius search");
        Ok(bootcamps)
    }

    /// Stores the photo as `photo_<id><ext>` and records it on the bootcamp.
    #[instrument(skip(db, storage, upload))]
    /// Stores the photo and points the bootcamp at it. The caller must already
    /// have passed [`Self::ensure_can_modify`].
    pub async fn upload_photo(
        db: &PgPool,
        storage: &dyn FileStorage,
        id: BootcampId,
        upload: PhotoUpload,
    ) -> Result<String, AppError> {
        let content_type = upload.content_type.as_deref();
        ensure_image(content_type).map_err(storage_error)?;
        if upload.content.len() > storage.max_file_size() {
            return Err(storage_error(StorageError::InvalidFileSize {
                max_bytes: storage.max_file_size(),
            }));
        }

        let file_name = format!(
            "photo_{}{}",
            id,
            photo_extension(upload.file_name.as_deref(), content_type.unwrap_or_default())
        );

        let key = storage
            .save(&file_name, &upload.content)
            .await
            .map_err(storage_error)?;

        let updated =
            sqlx::query("UPDATE bootcamps SET photo = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(&key)
                .execute(db)
                .await
                .map_err(map_db_error)?;

        if updated.rows_affected() == 0 {
            // Bootcamp deleted between the ownership check and the update.
            if let Err(e) = storage.delete(&key).await {
                tracing::warn!(photo = %key, error = %e, "Failed to remove orphaned photo");
            }
            return Err(bootcamp_not_found(id));
        }

        tracing::info!(
            bootcamp.id = %id,
            photo = %key,
            bytes = upload.content.len(),
            "Photo uploaded"
        );
        Ok(key)
    }
}
