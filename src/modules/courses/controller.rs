use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use devcamper_core::{AppError, ApiResponse};
use devcamper_db::AdvancedQuery;
use devcamper_models::{
    BootcampId, Course, CourseId, CourseWithBootcamp, CreateCourseDto, UpdateCourseDto,
};
use serde_json::{Value, json};
use tracing::instrument;

use super::service::{COURSES, CourseService};
use crate::docs::ErrorResponse;
use crate::middleware::role::RequirePublisher;
use crate::state::AppState;
use crate::validator::{IdPath, ValidatedJson};

/// List courses with their bootcamp
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    params(
        ("select" = Option<String>, Query, description = "Comma separated fields to return"),
        ("sort" = Option<String>, Query, description = "Sort fields, `-` prefix for descending"),
        ("page" = Option<i64>, Query, description = "Page number, from 1"),
        ("limit" = Option<i64>, Query, description = "Page size, 1 to 100"),
    ),
    responses(
        (status = 200, description = "Paginated courses", body = [CourseWithBootcamp]),
        (status = 400, description = "Unknown filter, sort or select field", body = ErrorResponse)
    ),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_courses(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<Value>>>, AppError> {
    let query = AdvancedQuery::parse(&params, &COURSES)?;
    let (courses, pagination) = CourseService::list_courses(&state.db, &query).await?;

    let data = courses
        .into_iter()
        .map(|c| serde_json::to_value(c).map(|v| query.project(v, &["bootcamp"])))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ApiResponse::paginated(data, pagination)))
}

/// List the courses of one bootcamp
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/{id}/courses",
    params(("id" = String, Path, description = "Bootcamp id")),
    responses(
        (status = 200, description = "Courses of the bootcamp", body = [Course]),
        (status = 404, description = "Bootcamp not found", body = ErrorResponse)
    ),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_bootcamp_courses(
    State(state): State<AppState>,
    IdPath(bootcamp_id): IdPath<BootcampId>,
) -> Result<Json<ApiResponse<Vec<Course>>>, AppError> {
    let courses = CourseService::courses_for_bootcamp(&state.db, bootcamp_id).await?;
    Ok(Json(ApiResponse::collection(courses)))
}

/// Get a course
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course with its bootcamp", body = CourseWithBootcamp),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    IdPath(id): IdPath<CourseId>,
) -> Result<Json<ApiResponse<CourseWithBootcamp>>, AppError> {
    let course = CourseService::get_course(&state.db, id).await?;
    Ok(Json(ApiResponse::ok(course)))
}

/// Add a course to a bootcamp
#[utoipa::path(
    post,
    path = "/api/v1/bootcamps/{id}/courses",
    params(("id" = String, Path, description = "Bootcamp id")),
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 401, description = "Caller does not own the bootcamp", body = ErrorResponse),
        (status = 404, description = "Bootcamp not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, auth_user, dto), fields(user.id = %auth_user.id()))]
pub async fn create_course(
    State(state): State<AppState>,
    RequirePublisher(auth_user): RequirePublisher,
    IdPath(bootcamp_id): IdPath<BootcampId>,
    ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
) -> Result<(StatusCode, Json<ApiResponse<Course>>), AppError> {
    let course = CourseService::create_course(&state.db, &auth_user.0, bootcamp_id, dto).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(course))))
}

/// Update a course
#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    request_body = UpdateCourseDto,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 401, description = "Caller does not own the course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, auth_user, dto), fields(user.id = %auth_user.id()))]
pub async fn update_course(
    State(state): State<AppState>,
    RequirePublisher(auth_user): RequirePublisher,
    IdPath(id): IdPath<CourseId>,
    ValidatedJson(dto): ValidatedJson<UpdateCourseDto>,
) -> Result<Json<ApiResponse<Course>>, AppError> {
    let course = CourseService::update_course(&state.db, &auth_user.0, id, dto).await?;
    Ok(Json(ApiResponse::ok(course)))
}

/// Delete a course
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course deleted"),
        (status = 401, description = "Caller does not own the course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, auth_user), fields(user.id = %auth_user.id()))]
pub async fn delete_course(
    State(state): State<AppState>,
    RequirePublisher(auth_user): RequirePublisher,
    IdPath(id): IdPath<CourseId>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    CourseService::delete_course(&state.db, &auth_user.0, id).await?;
    Ok(Json(ApiResponse::ok(json!({}))))
}
