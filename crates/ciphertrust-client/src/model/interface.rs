// Network interface model types

use serde::{Deserialize, Serialize};

use super::ca::DistinguishedName;

/// Subject of the certificate the appliance generates for an interface
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoGenAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cn: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_addresses: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub email_addresses: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<DistinguishedName>,
}

/// CA ids trusted for client certificates
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustedCas {
    pub local: Vec<String>,
    pub external: Vec<String>,
}

/// Body of `POST /v1/configs/interfaces` and `PATCH /v1/configs/interfaces/{name}`
#[derive(Clone, Debug, Default, Serialize)]
pub struct InterfaceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub interface_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_gen_ca_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_auto_gen_attributes: Option<AutoGenAttributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trusted_cas: Option<TrustedCas>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_user_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_tls_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_tls_version: Option<String>,
}

/// Interface as returned by the appliance
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Interface {
    pub id: String,
    pub name: String,
    pub port: i64,
    pub mode: String,
    #[serde(rename = "type")]
    pub interface_type: String,
    pub network_interface: String,
    pub enabled: bool,
    pub auto_gen_ca_id: String,
    pub local_auto_gen_attributes: Option<AutoGenAttributes>,
    pub trusted_cas: Option<TrustedCas>,
    pub cert_user_field: String,
    pub minimum_tls_version: String,
    pub maximum_tls_version: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}
