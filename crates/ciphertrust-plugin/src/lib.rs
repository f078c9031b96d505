//! Terraform plugin protocol v6 server
//!
//! Provides the gRPC service Terraform talks to, the go-plugin handshake,
//! the msgpack value codec and a typed resource framework that provider
//! crates implement.

pub mod data_source;
pub mod diagnostics;
pub mod error;
pub mod handshake;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod server;
pub mod value;

/// Generated protobuf and gRPC code for `tfplugin6`
pub mod proto {
    tonic::include_proto!("tfplugin6");
}

pub use data_source::{DataSource, DynamicDataSource};
pub use diagnostics::{Diagnostic, Diagnostics, ResultExt};
pub use error::{PluginError, ProviderError};
pub use handshake::serve;
pub use provider::ProviderService;
pub use resource::{DynamicResource, Resource};
pub use schema::{Attribute, AttributeType, Nesting, Schema};
pub use value::Value;
