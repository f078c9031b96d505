//! CipherTrust Client - REST client for CipherTrust Manager
//!
//! This crate provides:
//! - HTTP client with token authentication, refresh and retry
//! - Typed methods for the administration endpoints used by the provider
//! - Wire-format model types for requests and responses

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod model;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use http::CmClient;
