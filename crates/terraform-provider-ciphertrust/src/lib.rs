//! Terraform provider for CipherTrust Manager
//!
//! Resources and data sources translate Terraform state into calls against
//! the appliance REST API through [`ciphertrust_client::CmClient`]. The
//! plugin protocol itself lives in `ciphertrust-plugin`.

pub mod config;
pub mod data_sources;
pub mod logging;
pub mod provider;
pub mod resources;

pub use provider::CipherTrustProvider;
