//! Networking utilities
//!
//! Shared HTTP client configuration for all providers.

pub mod client;

pub use client::HttpClient;
