// Domain model types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /v1/domains`
#[derive(Clone, Debug, Default, Serialize)]
pub struct CreateDomainRequest {
    pub name: String,
    pub admins: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_user_management: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_ca_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsm_connection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsm_kek_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Body of `PATCH /v1/domains/{id}`
#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdateDomainRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_user_management: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsm_kek_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Domain as returned by the appliance
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Domain {
    pub id: String,
    pub uri: String,
    pub account: String,
    pub name: String,
    pub admins: Vec<String>,
    pub allow_user_management: bool,
    pub parent_ca_id: String,
    pub hsm_connection_id: String,
    pub hsm_kek_label: String,
    pub meta: Option<Value>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}
