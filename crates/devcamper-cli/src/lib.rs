//! # DevCamper CLI
//!
//! Administrative helpers used by the `devcamper-cli` binary: creating admin
//! accounts and filling a development database with fake bootcamps.
//!
//! ```ignore
//! use devcamper_cli::seeder::{seed_all, SeedConfig};
//!
//! seed_all(&pool, SeedConfig::new(10)).await?;
//! ```

pub mod admin;
pub mod seeder;
