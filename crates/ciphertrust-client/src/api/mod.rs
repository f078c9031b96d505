// Typed CmClient methods, one module per appliance area

pub mod ca;
pub mod client_mgmt;
pub mod cluster;
pub mod domains;
pub mod interfaces;
pub mod keys;
pub mod licensing;
pub mod logging;
pub mod scheduler;
pub mod system;
pub mod usermgmt;
