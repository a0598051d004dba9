//! VisionVani API backend.
//!
//! Resolves settings once per process, then assembles an axum application
//! with CORS and the route collections mounted under `/api`.
//!
//! # Modules
//!
//! - [`config`]: Settings loading from environment and `.env`
//! - [`cors`]: CORS allow-list and middleware
//! - [`app`]: Application assembly
//! - [`routes`]: Mountable route collections
//! - [`error`]: Unified error types
//! - [`utils`]: Utility functions

pub mod app;
pub mod config;
pub mod cors;
pub mod error;
pub mod routes;
pub mod utils;

pub use app::{assemble, create_app, Application};
pub use config::{get_settings, Settings};
pub use error::{AppError, ConfigError, Result};
