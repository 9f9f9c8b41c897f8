//! Secure Score Dashboard Library
//!
//! This library provides the core functionality for the secure score
//! dashboard: a fresh OAuth2 client-credentials token exchange and score
//! fetch on every page load, rendered as HTML with a JSON mirror endpoint.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `graph_client`: Microsoft Graph secure score client.
//! - `handlers`: HTTP request handlers and router.
//! - `models`: Core data models.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests
pub mod config;
pub mod errors;
pub mod graph_client;
pub mod handlers;
pub mod models;
