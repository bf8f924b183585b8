//! Authentication and authorization.
//!
//! - [`auth`]: the [`auth::AuthUser`] extractor (bearer header or `token` cookie)
//! - [`role`]: role allow-lists as extractors and router middleware, plus the
//!   owner-or-admin check used by mutating services
//!
//! ```ignore
//! use crate::middleware::role::RequirePublisher;
//!
//! async fn create_bootcamp(RequirePublisher(user): RequirePublisher) -> impl IntoResponse {
//!     // only publishers and admins get here
//! }
//! ```

pub mod auth;
pub mod role;
