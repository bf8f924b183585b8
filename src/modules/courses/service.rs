use anyhow::anyhow;
use devcamper_core::{AppError, Pagination};
use devcamper_db::aggregates::refresh_average_cost;
use devcamper_db::{AdvancedQuery, Column, ColumnKind, Resource, map_db_error};
use devcamper_models::courses::COURSE_COLUMNS;
use devcamper_models::{
    BootcampId, Course, CourseId, CourseWithBootcamp, CreateCourseDto, UpdateCourseDto, User,
};
use sqlx::PgPool;
use tracing::instrument;

use crate::middleware::role::ensure_owner_or_admin;
use crate::modules::bootcamps::service::BootcampService;

pub static COURSES: Resource = Resource {
    table: "courses",
    columns: &[
        Column::new("id", ColumnKind::Uuid),
        Column::new("bootcamp_id", ColumnKind::Uuid),
        Column::new("user_id", ColumnKind::Uuid),
        Column::new("title", ColumnKind::Text),
        Column::new("description", ColumnKind::Text),
        Column::new("weeks", ColumnKind::Text),
        Column::new("tuition", ColumnKind::Float),
        Column::new("minimum_skill", ColumnKind::Enum),
        Column::new("scholarship_available", ColumnKind::Boolean),
        Column::new("created_at", ColumnKind::Timestamp),
        Column::new("updated_at", ColumnKind::Timestamp),
    ],
};

fn course_not_found(id: CourseId) -> AppError {
    AppError::not_found(anyhow!("Course not found with id of {}", id))
}

/// Pairs each course with its bootcamp summary. Courses whose bootcamp
/// vanished in between are dropped.
async fn with_bootcamps(
    db: &PgPool,
    courses: Vec<Course>,
) -> Result<Vec<CourseWithBootcamp>, AppError> {
    let mut ids: Vec<BootcampId> = courses.iter().map(|c| c.bootcamp_id).collect();
    ids.sort_by_key(|id| id.into_inner());
    ids.dedup();

    let summaries = BootcampService::fetch_summaries(db, &ids).await?;

    Ok(courses
        .into_iter()
        .filter_map(|course| {
            summaries
                .get(&course.bootcamp_id)
                .cloned()
                .map(|bootcamp| CourseWithBootcamp { course, bootcamp })
        })
        .collect())
}

pub struct CourseService;

impl CourseService {
    #[instrument(skip(db, query))]
    pub async fn list_courses(
        db: &PgPool,
        query: &AdvancedQuery,
    ) -> Result<(Vec<CourseWithBootcamp>, Pagination), AppError> {
        let (courses, pagination) = query.fetch::<Course>(db, COURSE_COLUMNS).await?;
        Ok((with_bootcamps(db, courses).await?, pagination))
    }

    /// All courses of one bootcamp, oldest first.
    #[instrument(skip(db))]
    pub async fn courses_for_bootcamp(
        db: &PgPool,
        bootcamp_id: BootcampId,
    ) -> Result<Vec<Course>, AppError> {
        BootcampService::bootcamp_owner(db, bootcamp_id).await?;

        sqlx::query_as::<_, Course>(&format!(
            "SELECT {} FROM courses WHERE bootcamp_id = $1 ORDER BY created_at ASC, id ASC",
            COURSE_COLUMNS
        ))
        .bind(bootcamp_id)
        .fetch_all(db)
        .await
        .map_err(map_db_error)
    }

    async fn find_course(db: &PgPool, id: CourseId) -> Result<Course, AppError> {
        sqlx::query_as::<_, Course>(&format!(
            "SELECT {} FROM courses WHERE id = $1",
            COURSE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| course_not_found(id))
    }

    #[instrument(skip(db))]
    pub async fn get_course(db: &PgPool, id: CourseId) -> Result<CourseWithBootcamp, AppError> {
        let course = Self::find_course(db, id).await?;
        with_bootcamps(db, vec![course])
            .await?
            .pop()
            .ok_or_else(|| course_not_found(id))
    }

    /// Only the bootcamp's owner or an admin may add courses to it.
    #[instrument(skip(db, caller, dto), fields(user.id = %caller.id))]
    pub async fn create_course(
        db: &PgPool,
        caller: &User,
        bootcamp_id: BootcampId,
        dto: CreateCourseDto,
    ) -> Result<Course, AppError> {
        let owner = BootcampService::bootcamp_owner(db, bootcamp_id).await?;
        ensure_owner_or_admin(caller, owner, "add a course to", "bootcamp")?;

        let mut tx = db.begin().await.map_err(map_db_error)?;

        let course = sqlx::query_as::<_, Course>(&format!(
            "INSERT INTO courses (
                 bootcamp_id, user_id, title, description, weeks, tuition, minimum_skill,
                 scholarship_available
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            COURSE_COLUMNS
        ))
        .bind(bootcamp_id)
        .bind(caller.id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.weeks)
        .bind(dto.tuition)
        .bind(dto.minimum_skill)
        .bind(dto.scholarship_available)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        refresh_average_cost(&mut *tx, bootcamp_id.into_inner())
            .await
            .map_err(map_db_error)?;
        tx.commit().await.map_err(map_db_error)?;

        tracing::info!(course.id = %course.id, bootcamp.id = %bootcamp_id, "Course created");
        Ok(course)
    }

    #[instrument(skip(db, caller, dto), fields(user.id = %caller.id))]
    pub async fn update_course(
        db: &PgPool,
        caller: &User,
        id: CourseId,
        dto: UpdateCourseDto,
    ) -> Result<Course, AppError> {
        let existing = Self::find_course(db, id).await?;
        ensure_owner_or_admin(caller, existing.user_id, "update", "course")?;

        let mut tx = db.begin().await.map_err(map_db_error)?;

        let course = sqlx::query_as::<_, Course>(&format!(
            "UPDATE courses
             SET title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 weeks = COALESCE($4, weeks),
                 tuition = COALESCE($5, tuition),
                 minimum_skill = COALESCE($6, minimum_skill),
                 scholarship_available = COALESCE($7, scholarship_available),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            COURSE_COLUMNS
        ))
        .bind(id)
        .bind(dto.title)
        .bind(dto.description)
        .bind(dto.weeks)
        .bind(dto.tuition)
        .bind(dto.minimum_skill)
        .bind(dto.scholarship_available)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| course_not_found(id))?;

        refresh_average_cost(&mut *tx, course.bootcamp_id.into_inner())
            .await
            .map_err(map_db_error)?;
        tx.commit().await.map_err(map_db_error)?;

        tracing::info!(course.id = %id, "Course updated");
        Ok(course)
    }

    #[instrument(skip(db, caller), fields(user.id = %caller.id))]
    pub async fn delete_course(db: &PgPool, caller: &User, id: CourseId) -> Result<(), AppError> {
        let course = Self::find_course(db, id).await?;
        ensure_owner_or_admin(caller, course.user_id, "delete", "course")?;

        let mut tx = db.begin().await.map_err(map_db_error)?;

        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        refresh_average_cost(&mut *tx, course.bootcamp_id.into_inner())
            .await
            .map_err(map_db_error)?;
        tx.commit().await.map_err(map_db_error)?;

        tracing::info!(course.id = %id, bootcamp.id = %course.bootcamp_id, "Course deleted");
        Ok(())
    }
}
