// Client management model types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of `POST /v1/client-management/regtokens`
#[derive(Clone, Debug, Default, Serialize)]
pub struct CreateRegTokenRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_clients: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<BTreeMap<String, String>>,
}

/// Registration token as returned by the appliance
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegToken {
    pub id: String,
    pub uri: String,
    pub token: String,
    pub ca_id: String,
    pub lifetime: String,
    pub max_clients: i64,
    pub clients_registered: i64,
    pub name_prefix: String,
    pub label: Option<BTreeMap<String, String>>,
    pub expiry: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}
