// Key vault model types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key ownership metadata
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

/// Body of `POST /v1/vault/keys2`
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(rename = "curveid", skip_serializing_if = "Option::is_none")]
    pub curve_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_mask: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undeletable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unexportable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<KeyMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

/// Body of `PATCH /v1/vault/keys2/{id}`
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateKeyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_mask: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undeletable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unexportable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<KeyMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

/// Key as returned by the appliance
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Key {
    pub id: String,
    pub uri: String,
    pub account: String,
    pub name: String,
    pub algorithm: String,
    pub size: i64,
    #[serde(rename = "curveid")]
    pub curve_id: Option<String>,
    pub usage_mask: i64,
    pub version: i64,
    pub state: String,
    pub object_type: String,
    pub undeletable: bool,
    pub unexportable: bool,
    pub meta: Option<KeyMeta>,
    pub labels: Option<BTreeMap<String, String>>,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_response() {
        let key: Key = serde_json::from_value(json!({
            "id": "k1",
            "name": "app-key",
            "algorithm": "AES",
            "size": 256,
            "usageMask": 12,
            "objectType": "Symmetric Key",
            "meta": {"ownerId": "local|abc"},
            "labels": {"env": "prod"}
        }))
        .unwrap();
        assert_eq!(key.usage_mask, 12);
        assert_eq!(key.object_type, "Symmetric Key");
        assert_eq!(key.meta.unwrap().owner_id.as_deref(), Some("local|abc"));
        assert_eq!(key.labels.unwrap()["env"], "prod");
    }
}
