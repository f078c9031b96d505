//! `ciphertrust_cm_key`: keys in the appliance vault

use std::collections::BTreeMap;

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{CreateKeyRequest, Key, KeyMeta, UpdateKeyRequest};
use ciphertrust_plugin::{Attribute, AttributeType, ProviderError, Resource, ResultExt, Schema};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{NotFoundExt, computed_str, ignore_not_found, non_empty, require_id};

pub struct KeyResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyState {
    pub id: Option<String>,
    pub name: Option<String>,
    pub algorithm: Option<String>,
    pub size: Option<i64>,
    pub curve_id: Option<String>,
    pub usage_mask: Option<i64>,
    pub undeletable: Option<bool>,
    pub unexportable: Option<bool>,
    pub owner_id: Option<String>,
    pub labels: Option<BTreeMap<String, String>>,
    pub version: Option<i64>,
    pub state: Option<String>,
    pub object_type: Option<String>,
    pub uri: Option<String>,
    pub account: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// The appliance upper-cases algorithm names; configured spelling is kept
fn algorithm(response: String, planned: Option<String>) -> Option<String> {
    match planned {
        Some(p) if p.eq_ignore_ascii_case(&response) => Some(p),
        planned => computed_str(response, planned),
    }
}

impl KeyState {
    fn meta(&self) -> Option<KeyMeta> {
        self.owner_id.clone().map(|owner_id| KeyMeta {
            owner_id: Some(owner_id),
        })
    }

    pub fn create_request(&self) -> CreateKeyRequest {
        CreateKeyRequest {
            name: self.name.clone().unwrap_or_default(),
            algorithm: self.algorithm.clone(),
            size: self.size,
            curve_id: self.curve_id.clone(),
            usage_mask: self.usage_mask,
            undeletable: self.undeletable,
            unexportable: self.unexportable,
            meta: self.meta(),
            labels: self.labels.clone(),
        }
    }

    pub fn update_request(&self) -> UpdateKeyRequest {
        UpdateKeyRequest {
            usage_mask: self.usage_mask,
            undeletable: self.undeletable,
            unexportable: self.unexportable,
            meta: self.meta(),
            labels: self.labels.clone(),
        }
    }

    pub fn from_response(key: Key, planned: &KeyState) -> Self {
        KeyState {
            id: non_empty(key.id),
            name: computed_str(key.name, planned.name.clone()),
            algorithm: algorithm(key.algorithm, planned.algorithm.clone()),
            size: (key.size > 0).then_some(key.size).or(planned.size),
            curve_id: key.curve_id.and_then(non_empty).or(planned.curve_id.clone()),
            usage_mask: Some(key.usage_mask),
            undeletable: Some(key.undeletable),
            unexportable: Some(key.unexportable),
            owner_id: key
                .meta
                .and_then(|meta| meta.owner_id)
                .and_then(non_empty)
                .or(planned.owner_id.clone()),
            labels: key
                .labels
                .filter(|labels| !labels.is_empty())
                .or(planned.labels.clone()),
            version: Some(key.version),
            state: non_empty(key.state),
            object_type: non_empty(key.object_type),
            uri: non_empty(key.uri),
            account: non_empty(key.account),
            created_at: non_empty(key.created_at),
            updated_at: non_empty(key.updated_at),
        }
    }
}

#[async_trait]
impl Resource for KeyResource {
    type Data = CmClient;
    type State = KeyState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_key"
    }

    fn schema(&self) -> Schema {
        Schema::new("Key stored in the CipherTrust Manager vault.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(Attribute::string("name").required().requires_replace())
            .attribute(
                Attribute::string("algorithm")
                    .optional()
                    .computed()
                    .requires_replace()
                    .use_state_for_unknown()
                    .description("AES, RSA, EC, HMAC-SHA256 and so on. Defaults to AES."),
            )
            .attribute(
                Attribute::number("size")
                    .optional()
                    .computed()
                    .requires_replace()
                    .use_state_for_unknown(),
            )
            .attribute(
                Attribute::string("curve_id")
                    .optional()
                    .computed()
                    .requires_replace()
                    .use_state_for_unknown(),
            )
            .attribute(
                Attribute::number("usage_mask")
                    .optional()
                    .computed()
                    .description("Bit mask of permitted cryptographic usages."),
            )
            .attribute(Attribute::bool("undeletable").optional().computed())
            .attribute(Attribute::bool("unexportable").optional().computed())
            .attribute(Attribute::string("owner_id").optional().computed())
            .attribute(Attribute::map("labels", AttributeType::String).optional().computed())
            .attribute(Attribute::number("version").computed())
            .attribute(Attribute::string("state").computed())
            .attribute(Attribute::string("object_type").computed().use_state_for_unknown())
            .attribute(Attribute::string("uri").computed().use_state_for_unknown())
            .attribute(Attribute::string("account").computed().use_state_for_unknown())
            .attribute(Attribute::string("created_at").computed().use_state_for_unknown())
            .attribute(Attribute::string("updated_at").computed())
    }

    async fn create(&self, client: &CmClient, plan: KeyState) -> Result<KeyState, ProviderError> {
        let key = client
            .create_key(&plan.create_request())
            .await
            .or_diagnostic("Error creating key")?;
        info!(id = %key.id, name = %key.name, algorithm = %key.algorithm, "Created key");
        Ok(KeyState::from_response(key, &plan))
    }

    async fn read(
        &self,
        client: &CmClient,
        state: KeyState,
    ) -> Result<Option<KeyState>, ProviderError> {
        let id = require_id(&state.id, "key")?;
        let key = client.get_key(id).await.found().or_diagnostic("Error reading key")?;
        Ok(key.map(|key| KeyState::from_response(key, &state)))
    }

    async fn update(
        &self,
        client: &CmClient,
        prior: KeyState,
        plan: KeyState,
    ) -> Result<KeyState, ProviderError> {
        let id = require_id(&prior.id, "key")?;
        let key = client
            .update_key(id, &plan.update_request())
            .await
            .or_diagnostic("Error updating key")?;
        Ok(KeyState::from_response(key, &plan))
    }

    async fn delete(&self, client: &CmClient, state: KeyState) -> Result<(), ProviderError> {
        let id = require_id(&state.id, "key")?;
        ignore_not_found(client.delete_key(id).await).or_diagnostic("Error deleting key")?;
        info!(id, "Deleted key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_body() {
        let plan = KeyState {
            name: Some("app-key".to_string()),
            algorithm: Some("aes".to_string()),
            size: Some(256),
            owner_id: Some("local|abc".to_string()),
            labels: Some(BTreeMap::from([("env".to_string(), "prod".to_string())])),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(plan.create_request()).unwrap(),
            json!({
                "name": "app-key",
                "algorithm": "aes",
                "size": 256,
                "meta": {"ownerId": "local|abc"},
                "labels": {"env": "prod"}
            })
        );
    }

    #[test]
    fn test_algorithm_keeps_planned_case() {
        assert_eq!(algorithm("AES".to_string(), Some("aes".to_string())).as_deref(), Some("aes"));
        assert_eq!(algorithm("RSA".to_string(), Some("aes".to_string())).as_deref(), Some("RSA"));
        assert_eq!(algorithm("AES".to_string(), None).as_deref(), Some("AES"));
    }

    #[test]
    fn test_from_response() {
        let key: Key = serde_json::from_value(json!({
            "id": "k1",
            "name": "app-key",
            "algorithm": "AES",
            "size": 256,
            "usageMask": 12,
            "state": "Active",
            "version": 0
        }))
        .unwrap();
        let state = KeyState::from_response(key, &KeyState::default());
        assert_eq!(state.algorithm.as_deref(), Some("AES"));
        assert_eq!(state.usage_mask, Some(12));
        assert_eq!(state.curve_id, None);
        assert_eq!(state.labels, None);
        assert_eq!(state.state.as_deref(), Some("Active"));
    }
}
