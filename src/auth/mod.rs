//! Authentication module
//!
//! Bearer token issuance and the middleware guarding protected routes.

pub mod jwt;
pub mod middleware;
