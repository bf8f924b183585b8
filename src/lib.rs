//! # DevCamper API
//!
//! A directory of coding bootcamps with their courses and reviews, built with
//! Axum and PostgreSQL.
//!
//! ## Layout
//!
//! ```text
//! src/
//! ├── middleware/      # AuthUser extractor and role checks
//! ├── modules/         # Feature modules
//! │   ├── auth/        # Register, login, password reset
//! │   ├── bootcamps/   # Bootcamps, radius search, photo upload
//! │   ├── courses/     # Courses, average cost
//! │   ├── reviews/     # Reviews, average rating
//! │   └── users/       # Admin user management
//! └── utils/           # Cookies, mail, geocoding
//! ```
//!
//! Each feature module has a `controller.rs` (handlers), a `service.rs`
//! (database work) and a `router.rs`.
//!
//! ## Roles
//!
//! | Role | May |
//! |------|-----|
//! | user | Write reviews |
//! | publisher | Publish one bootcamp and manage its courses |
//! | admin | Everything, including `/users` |
//!
//! Admins are created with `devcamper-cli create-admin`.
//!
//! ## Authentication
//!
//! Login and registration return a JWT in the body and as an HttpOnly `token`
//! cookie. Requests authenticate with `Authorization: Bearer <token>` or the cookie.
//!
//! ## API documentation
//!
//! - OpenAPI JSON: `/api-docs/openapi.json`
//! - Scalar: `/scalar`

pub mod docs;
pub mod logging;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;

pub use devcamper_auth;
pub use devcamper_config;
pub use devcamper_core;
pub use devcamper_db;
pub use devcamper_models;
