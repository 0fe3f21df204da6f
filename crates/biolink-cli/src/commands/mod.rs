//! CLI command handlers

pub mod auth;
pub mod secret;
pub mod sign;
