//! User module
//!
//! This module handles the user management endpoints and the service seam
//! they delegate to.

pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod service;
