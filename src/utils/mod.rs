//! Outbound collaborators and small HTTP helpers.
//!
//! - [`email`]: password reset mail over SMTP
//! - [`geocoder`]: address and zipcode lookup
//! - [`cookies`]: the `token` auth cookie

pub mod cookies;
pub mod email;
pub mod geocoder;
