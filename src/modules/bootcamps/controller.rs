use std::collections::HashMap;

use anyhow::anyhow;
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use devcamper_core::{AppError, ApiResponse};
use devcamper_db::AdvancedQuery;
use devcamper_models::{
    Bootcamp, BootcampId, BootcampWithCourses, CreateBootcampDto, UpdateBootcampDto,
};
use serde_json::{Value, json};
use tracing::instrument;

use super::service::{BOOTCAMPS, BootcampService, PhotoUpload};
use crate::docs::ErrorResponse;
use crate::middleware::role::RequirePublisher;
use crate::state::AppState;
use crate::validator::{IdPath, ValidatedJson};

const PHOTO_FIELD: &str = "file";

/// List bootcamps with their courses
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps",
    params(
        ("select" = Option<String>, Query, description = "Comma separated fields to return"),
        ("sort" = Option<String>, Query, description = "Sort fields, `-` prefix for descending"),
        ("page" = Option<i64>, Query, description = "Page number, from 1"),
        ("limit" = Option<i64>, Query, description = "Page size, 1 to 100"),
    ),
    responses(
        (status = 200, description = "Paginated bootcamps", body = [BootcampWithCourses]),
        (status = 400, description = "Unknown filter, sort or select field", body = ErrorResponse)
    ),
    tag = "Bootcamps"
)]
#[instrument(skip(state))]
pub async fn get_bootcamps(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<Value>>>, AppError> {
    let query = AdvancedQuery::parse(&params, &BOOTCAMPS)?;
    let (bootcamps, pagination) = BootcampService::list_bootcamps(&state.db, &query).await?;

    let data = bootcamps
        .into_iter()
        .map(|b| serde_json::to_value(b).map(|v| query.project(v, &["courses"])))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ApiResponse::paginated(data, pagination)))
}

/// Get a bootcamp
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/{id}",
    params(("id" = String, Path, description = "Bootcamp id")),
    responses(
        (status = 200, description = "Bootcamp", body = Bootcamp),
        (status = 404, description = "Bootcamp not found", body = ErrorResponse)
    ),
    tag = "Bootcamps"
)]
#[instrument(skip(state))]
pub async fn get_bootcamp(
    State(state): State<AppState>,
    IdPath(id): IdPath<BootcampId>,
) -> Result<Json<ApiResponse<Bootcamp>>, AppError> {
    let bootcamp = BootcampService::get_bootcamp(&state.db, id).await?;
    Ok(Json(ApiResponse::ok(bootcamp)))
}

/// Create a bootcamp owned by the caller
#[utoipa::path(
    post,
    path = "/api/v1/bootcamps",
    request_body = CreateBootcampDto,
    responses(
        (status = 201, description = "Bootcamp created", body = Bootcamp),
        (status = 400, description = "Validation error, unknown address or already published", body = ErrorResponse),
        (status = 403, description = "Caller is not a publisher", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Bootcamps"
)]
#[instrument(skip(state, auth_user, dto), fields(user.id = %auth_user.id()))]
pub async fn create_bootcamp(
    State(state): State<AppState>,
    RequirePublisher(auth_user): RequirePublisher,
    ValidatedJson(dto): ValidatedJson<CreateBootcampDto>,
) -> Result<(StatusCode, Json<ApiResponse<Bootcamp>>), AppError> {
    let bootcamp =
        BootcampService::create_bootcamp(&state.db, state.geocoder.as_ref(), &auth_user.0, dto)
            .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(bootcamp))))
}

/// Update a bootcamp
#[utoipa::path(
    put,
    path = "/api/v1/bootcamps/{id}",
    params(("id" = String, Path, description = "Bootcamp id")),
    request_body = UpdateBootcampDto,
    responses(
        (status = 200, description = "Bootcamp updated", body = Bootcamp),
        (status = 401, description = "Caller does not own the bootcamp", body = ErrorResponse),
        (status = 404, description = "Bootcamp not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Bootcamps"
)]
#[instrument(skip(state, auth_user, dto), fields(user.id = %auth_user.id()))]
pub async fn update_bootcamp(
    State(state): State<AppState>,
    RequirePublisher(auth_user): RequirePublisher,
    IdPath(id): IdPath<BootcampId>,
    ValidatedJson(dto): ValidatedJson<UpdateBootcampDto>,
) -> Result<Json<ApiResponse<Bootcamp>>, AppError> {
    let bootcamp = BootcampService::update_bootcamp(
        &state.db,
        state.geocoder.as_ref(),
        &auth_user.0,
        id,
        dto,
    )
    .await?;
    Ok(Json(ApiResponse::ok(bootcamp)))
}

/// Delete a bootcamp with its courses and reviews
#[utoipa::path(
    delete,
    path = "/api/v1/bootcamps/{id}",
    params(("id" = String, Path, description = "Bootcamp id")),
    responses(
        (status = 200, description = "Bootcamp deleted"),
        (status = 401, description = "Caller does not own the bootcamp", body = ErrorResponse),
        (status = 404, description = "Bootcamp not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Bootcamps"
)]
#[instrument(skip(state, auth_user), fields(user.id = %auth_user.id()))]
pub async fn delete_bootcamp(
    State(state): State<AppState>,
    RequirePublisher(auth_user): RequirePublisher,
    IdPath(id): IdPath<BootcampId>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    BootcampService::delete_bootcamp(&state.db, state.storage.as_ref(), &auth_user.0, id).await?;
    Ok(Json(ApiResponse::ok(json!({}))))
}

/// Bootcamps within a distance of a zipcode
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/radius/{zipcode}/{distance}",
    params(
        ("zipcode" = String, Path, description = "Zipcode at the centre of the search"),
        ("distance" = f64, Path, description = "Radius in kilometres"),
    ),
    responses(
        (status = 200, description = "Bootcamps in range", body = [Bootcamp]),
        (status = 400, description = "Invalid distance or unknown zipcode", body = ErrorResponse)
    ),
    tag = "Bootcamps"
)]
#[instrument(skip(state))]
pub async fn get_bootcamps_in_radius(
    State(state): State<AppState>,
    Path((zipcode, distance)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Vec<Bootcamp>>>, AppError> {
    let distance_km: f64 = distance
        .trim()
        .parse()
        .map_err(|_| AppError::bad_request(anyhow!("Distance must be a non-negative number")))?;

    let bootcamps = BootcampService::bootcamps_in_radius(
        &state.db,
        state.geocoder.as_ref(),
        &zipcode,
        distance_km,
    )
    .await?;

    Ok(Json(ApiResponse::collection(bootcamps)))
}

/// Reads the `file` part, stopping as soon as it exceeds `max_bytes`.
async fn read_photo(mut multipart: Multipart, max_bytes: usize) -> Result<PhotoUpload, AppError> {
    let multipart_error =
        |e: axum::extract::multipart::MultipartError| AppError::bad_request(anyhow!(e.body_text()));

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let mut content = Vec::new();

        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if content.len() + chunk.len() > max_bytes {
                return Err(AppError::bad_request(anyhow!(
                    "Please upload an image less than {} bytes",
                    max_bytes
                )));
            }
            content.extend_from_slice(&chunk);
        }

        if content.is_empty() {
            break;
        }

        return Ok(PhotoUpload {
            file_name,
            content_type,
            content,
        });
    }

    Err(AppError::bad_request(anyhow!("Please upload a file")))
}

/// Upload a bootcamp photo
#[utoipa::path(
    put,
    path = "/api/v1/bootcamps/{id}/photo",
    params(("id" = String, Path, description = "Bootcamp id")),
    request_body(content_type = "multipart/form-data", description = "Image in the `file` field"),
    responses(
        (status = 200, description = "Stored file name", body = String),
        (status = 400, description = "Missing, oversized or non-image file", body = ErrorResponse),
        (status = 401, description = "Caller does not own the bootcamp", body = ErrorResponse),
        (status = 404, description = "Bootcamp not found", body = ErrorResponse),
        (status = 500, description = "Problem with file upload", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Bootcamps"
)]
#[instrument(skip(state, auth_user, multipart), fields(user.id = %auth_user.id()))]
pub async fn upload_photo(
    State(state): State<AppState>,
    RequirePublisher(auth_user): RequirePublisher,
    IdPath(id): IdPath<BootcampId>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<String>>, AppError> {
    BootcampService::ensure_can_modify(&state.db, &auth_user.0, id, "update").await?;

    let upload = read_photo(multipart, state.storage.max_file_size()).await?;
    let file_name =
        BootcampService::upload_photo(&state.db, state.storage.as_ref(), id, upload).await?;

    Ok(Json(ApiResponse::ok(file_name)))
}
