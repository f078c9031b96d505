// Model types for CipherTrust Manager API requests and responses

pub mod auth;
pub mod ca;
pub mod client_mgmt;
pub mod cluster;
pub mod common;
pub mod domain;
pub mod interface;
pub mod keys;
pub mod licensing;
pub mod logging;
pub mod scheduler;
pub mod system;
pub mod usermgmt;

pub use ca::*;
pub use client_mgmt::*;
pub use cluster::*;
pub use common::*;
pub use domain::*;
pub use interface::*;
pub use keys::*;
pub use licensing::*;
pub use logging::*;
pub use scheduler::*;
pub use system::*;
pub use usermgmt::*;
