//! # DevCamper Core
//!
//! Core types, errors, and utilities shared by every DevCamper crate.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`response`]: `{success, data}` envelopes and pagination links
//! - [`password`]: bcrypt hashing and verification
//! - [`file_storage`]: Storage backends for uploaded bootcamp photos
//! - [`geo`]: Great-circle distance helpers for radius search
//!
//! # Example
//!
//! ```ignore
//! use devcamper_core::{AppError, ApiResponse};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Bootcamp not found with id of {}", id));
//! let body = ApiResponse::ok(bootcamp);
//! ```

use std::future::Future;
use std::pin::Pin;

pub mod errors;
pub mod file_storage;
pub mod geo;
pub mod password;
pub mod response;

pub use errors::AppError;
pub use password::{hash_password, verify_password};
pub use response::{ApiResponse, PageLink, Pagination, TokenResponse};

/// Boxed future returned by the object-safe collaborator traits (storage, mail, geocoding).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
