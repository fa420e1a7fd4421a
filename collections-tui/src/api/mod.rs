//! Typed client for the collection backend.
//!
//! The backend exposes six operations (customer listing, creation, call
//! initiation and recording upload); this module wraps them in a thin
//! reqwest-based client with a uniform error shape.

pub mod client;
pub mod error;
pub mod models;

pub use client::ApiClient;
