// Certificate authority model types

use serde::{Deserialize, Serialize};

/// One relative distinguished name set of a CSR subject
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistinguishedName {
    #[serde(rename = "C", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "ST", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(rename = "L", skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(rename = "O", skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(rename = "OU", skip_serializing_if = "Option::is_none")]
    pub organizational_unit: Option<String>,
}

/// Body of `POST /v1/ca/local-cas`
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocalCaRequest {
    pub cn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_addresses: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub email_addresses: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<DistinguishedName>,
}

/// Body of `PATCH /v1/ca/local-cas/{id}`
#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdateLocalCaRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_client_authentication: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_user_authentication: Option<bool>,
}

/// Body of `POST /v1/ca/local-cas/{id}/self-sign`
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfSignRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_after: Option<String>,
}

/// Usage flags of a local CA as reported by the appliance
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaPurpose {
    pub client_authentication: Option<String>,
    pub user_authentication: Option<String>,
}

/// Local CA as returned by the appliance
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalCa {
    pub id: String,
    pub uri: String,
    pub account: String,
    pub name: String,
    pub state: String,
    pub csr: String,
    pub cert: String,
    pub subject: String,
    pub issuer: String,
    pub serial_number: String,
    pub not_before: String,
    pub not_after: String,
    pub sha1_fingerprint: String,
    pub sha256_fingerprint: String,
    pub sha512_fingerprint: String,
    pub purpose: Option<CaPurpose>,
    pub created_at: String,
    pub updated_at: String,
}

/// Query of `GET /v1/ca/local-cas`
#[derive(Clone, Debug, Default, Serialize)]
pub struct LocalCaQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_uses_camel_case() {
        let request = CreateLocalCaRequest {
            cn: "ca.local".to_string(),
            dns_names: vec!["ca.local".to_string()],
            names: vec![DistinguishedName {
                country: Some("US".to_string()),
                organization: Some("Thales".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "cn": "ca.local",
                "dnsNames": ["ca.local"],
                "names": [{"C": "US", "O": "Thales"}]
            })
        );
    }

    #[test]
    fn test_local_ca_response() {
        let ca: LocalCa = serde_json::from_value(json!({
            "id": "c1",
            "state": "pending",
            "sha256Fingerprint": "AB",
            "purpose": {"client_authentication": "Enabled"}
        }))
        .unwrap();
        assert_eq!(ca.state, "pending");
        assert_eq!(ca.sha256_fingerprint, "AB");
        assert_eq!(
            ca.purpose.unwrap().client_authentication.as_deref(),
            Some("Enabled")
        );
    }
}
