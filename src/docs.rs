use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use devcamper_core::{PageLink, Pagination, TokenResponse};
use devcamper_models::{
    Bootcamp, BootcampSummary, BootcampWithCourses, Course, CourseWithBootcamp,
    CreateBootcampDto, CreateCourseDto, CreateReviewDto, CreateUserDto, ForgotPasswordDto,
    Location, LoginDto, RegisterDto, ResetPasswordDto, Review, ReviewWithBootcamp, SkillLevel,
    UpdateBootcampDto, UpdateCourseDto, UpdateDetailsDto, UpdatePasswordDto, UpdateReviewDto,
    UpdateUserDto, User, UserRole,
};

/// Body of every failed request.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::get_me,
        crate::modules::auth::controller::update_details,
        crate::modules::auth::controller::update_password,
        crate::modules::auth::controller::forgot_password,
        crate::modules::auth::controller::reset_password,
        crate::modules::bootcamps::controller::get_bootcamps,
        crate::modules::bootcamps::controller::get_bootcamp,
        crate::modules::bootcamps::controller::create_bootcamp,
        crate::modules::bootcamps::controller::update_bootcamp,
        crate::modules::bootcamps::controller::delete_bootcamp,
        crate::modules::bootcamps::controller::get_bootcamps_in_radius,
        crate::modules::bootcamps::controller::upload_photo,
        crate::modules::courses::controller::get_courses,
        crate::modules::courses::controller::get_bootcamp_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::reviews::controller::get_reviews,
        crate::modules::reviews::controller::get_bootcamp_reviews,
        crate::modules::reviews::controller::get_review,
        crate::modules::reviews::controller::create_review,
        crate::modules::reviews::controller::update_review,
        crate::modules::reviews::controller::delete_review,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
    ),
    components(
        schemas(
            User,
            UserRole,
            CreateUserDto,
            UpdateUserDto,
            RegisterDto,
            LoginDto,
            UpdateDetailsDto,
            UpdatePasswordDto,
            ForgotPasswordDto,
            ResetPasswordDto,
            TokenResponse,
            Bootcamp,
            BootcampSummary,
            BootcampWithCourses,
            Location,
            CreateBootcampDto,
            UpdateBootcampDto,
            Course,
            CourseWithBootcamp,
            SkillLevel,
            CreateCourseDto,
            UpdateCourseDto,
            Review,
            ReviewWithBootcamp,
            CreateReviewDto,
            UpdateReviewDto,
            Pagination,
            PageLink,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and password management"),
        (name = "Bootcamps", description = "Bootcamp directory, radius search and photos"),
        (name = "Courses", description = "Courses offered by bootcamps"),
        (name = "Reviews", description = "Bootcamp reviews and ratings"),
        (name = "Users", description = "User administration, admin only")
    ),
    info(
        title = "DevCamper API",
        version = "1.0.0",
        description = "Directory of coding bootcamps with their courses and reviews. Tokens are accepted as a Bearer header or a `token` cookie."
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_resource() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/v1/auth/login",
            "/api/v1/bootcamps/radius/{zipcode}/{distance}",
            "/api/v1/bootcamps/{id}/courses",
            "/api/v1/reviews/{id}",
            "/api/v1/users",
        ] {
            assert!(paths.contains_key(path), "{} missing from OpenAPI", path);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
