// Licensing model types

use serde::{Deserialize, Serialize};

/// Body of `POST /v1/licensing/licenses`
#[derive(Clone, Debug, Default, Serialize)]
pub struct AddLicenseRequest {
    pub license: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_type: Option<String>,
}

/// Installed license
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    pub id: String,
    pub state: String,
    #[serde(rename = "type")]
    pub license_type: String,
    pub feature: String,
    pub version: String,
    pub start: String,
    pub expiration: String,
    pub license_count: i64,
    pub bind_type: String,
}

/// Trial license offered by the appliance
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialLicense {
    pub id: String,
    pub status: String,
    pub activated: bool,
    pub expiry: String,
    pub days_left: i64,
}
