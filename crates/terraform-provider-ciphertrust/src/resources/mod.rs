//! Managed resources
//!
//! Each resource maps its Terraform state onto a request body on the way
//! out and rebuilds the state from the appliance response on the way back,
//! keeping planned values wherever the appliance does not echo them.

use ciphertrust_client::{ClientError, CmClient};
use ciphertrust_plugin::{DynamicResource, ProviderError};
use serde_json::Value as JsonValue;

pub mod cluster;
pub mod domain;
pub mod group;
pub mod interface;
pub mod key;
pub mod license;
pub mod local_ca;
pub mod log_forwarder;
pub mod ntp;
pub mod password_policy;
pub mod property;
pub mod proxy;
pub mod reg_token;
pub mod scheduler;
pub mod self_sign_local_ca;
pub mod syslog;
pub mod trial_license;
pub mod user;

/// Every managed resource the provider serves
pub fn all() -> Vec<Box<dyn DynamicResource<CmClient>>> {
    vec![
        Box::new(local_ca::LocalCaResource),
        Box::new(self_sign_local_ca::SelfSignLocalCaResource),
        Box::new(user::UserResource),
        Box::new(group::GroupResource),
        Box::new(key::KeyResource),
        Box::new(cluster::ClusterResource),
        Box::new(domain::DomainResource),
        Box::new(interface::InterfaceResource),
        Box::new(license::LicenseResource),
        Box::new(trial_license::TrialLicenseResource),
        Box::new(scheduler::SchedulerResource),
        Box::new(syslog::SyslogResource),
        Box::new(log_forwarder::LogForwarderResource),
        Box::new(password_policy::PasswordPolicyResource),
        Box::new(proxy::ProxyResource),
        Box::new(ntp::NtpResource),
        Box::new(property::PropertyResource),
        Box::new(reg_token::RegTokenResource),
    ]
}

/// Maps a 404 to `None` so reads can drop vanished objects from state
pub trait NotFoundExt<T> {
    fn found(self) -> Result<Option<T>, ClientError>;
}

impl<T> NotFoundExt<T> for Result<T, ClientError> {
    fn found(self) -> Result<Option<T>, ClientError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Deleting something already gone succeeds
pub fn ignore_not_found(result: Result<(), ClientError>) -> Result<(), ClientError> {
    match result {
        Err(e) if e.is_not_found() => Ok(()),
        other => other,
    }
}

pub fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Optional and computed: the appliance value wins, the plan fills gaps
pub fn computed_str(response: String, planned: Option<String>) -> Option<String> {
    non_empty(response).or(planned)
}

/// Optional values the appliance may echo: null unless configured, the
/// echoed value wins over the configured one
pub fn keep_planned<T>(response: Option<T>, planned: Option<T>) -> Option<T> {
    planned.map(|p| response.unwrap_or(p))
}

/// Parse a JSON-encoded string attribute
pub fn parse_json(
    attribute: &str,
    text: Option<&str>,
) -> Result<Option<JsonValue>, ProviderError> {
    text.filter(|t| !t.trim().is_empty())
        .map(|t| {
            serde_json::from_str(t).map_err(|e| {
                ProviderError::new("Invalid JSON", format!("{attribute}: {e}")).at(attribute)
            })
        })
        .transpose()
}

/// Render a JSON response field, keeping the planned text when equivalent
pub fn json_text(response: Option<&JsonValue>, planned: Option<String>) -> Option<String> {
    let response = response.filter(|v| match v {
        JsonValue::Null => false,
        JsonValue::Object(map) => !map.is_empty(),
        _ => true,
    });
    match (response, planned) {
        (None, planned) => planned,
        (Some(r), Some(p)) if serde_json::from_str::<JsonValue>(&p).ok().as_ref() == Some(r) => {
            Some(p)
        }
        (Some(r), _) => Some(r.to_string()),
    }
}

/// Identifier of a resource state, required for every call after create
pub fn require_id<'a>(id: &'a Option<String>, what: &str) -> Result<&'a str, ProviderError> {
    id.as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ProviderError::new(format!("Missing {what} id"), "the state has no id"))
}
