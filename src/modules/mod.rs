//! Feature modules. Each has a `controller` (HTTP handlers), a `service`
//! (database work) and a `router`.

pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod reviews;
pub mod users;
