//! # DevCamper Auth
//!
//! - [`claims`]: JWT claim set
//! - [`jwt`]: signing and verification of identity tokens
//! - [`reset_token`]: single-use password reset tokens

pub mod claims;
pub mod jwt;
pub mod reset_token;

pub use claims::Claims;
pub use jwt::{NOT_AUTHORIZED, create_token, verify_token};
pub use reset_token::{RESET_TOKEN_TTL_MINUTES, ResetToken, hash_reset_token};
