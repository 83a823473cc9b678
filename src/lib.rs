//! Hostel complaint management service
//!
//! Students file maintenance complaints against their roll number and track
//! them; administrators triage every complaint from a filtered dashboard.

pub mod admin;
pub mod api;
pub mod auth;
pub mod complaints;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod server;
pub mod session;
pub mod validation;
pub mod views;

pub use context::AppContext;
pub use error::{AppError, AppResult};
