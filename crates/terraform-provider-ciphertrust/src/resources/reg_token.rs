//! `ciphertrust_cm_reg_token`: registration tokens for NAE/KMIP clients

use std::collections::BTreeMap;

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{CreateRegTokenRequest, RegToken};
use ciphertrust_plugin::{Attribute, AttributeType, ProviderError, Resource, ResultExt, Schema};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{NotFoundExt, computed_str, ignore_not_found, non_empty, require_id};

pub struct RegTokenResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegTokenState {
    pub id: Option<String>,
    pub ca_id: Option<String>,
    pub lifetime: Option<String>,
    pub max_clients: Option<i64>,
    pub name_prefix: Option<String>,
    pub label: Option<BTreeMap<String, String>>,
    pub token: Option<String>,
    pub clients_registered: Option<i64>,
    pub expiry: Option<String>,
    pub uri: Option<String>,
    pub created_at: Option<String>,
}

impl RegTokenState {
    pub fn create_request(&self) -> CreateRegTokenRequest {
        CreateRegTokenRequest {
            ca_id: self.ca_id.clone(),
            lifetime: self.lifetime.clone(),
            max_clients: self.max_clients,
            name_prefix: self.name_prefix.clone(),
            label: self.label.clone(),
        }
    }

    pub fn from_response(token: RegToken, planned: &RegTokenState) -> Self {
        RegTokenState {
            id: non_empty(token.id),
            ca_id: computed_str(token.ca_id, planned.ca_id.clone()),
            // the appliance normalizes durations, e.g. 720h to 720h0m0s
            lifetime: planned.lifetime.clone().or_else(|| non_empty(token.lifetime)),
            max_clients: (token.max_clients > 0)
                .then_some(token.max_clients)
                .or(planned.max_clients),
            name_prefix: computed_str(token.name_prefix, planned.name_prefix.clone()),
            label: planned
                .label
                .clone()
                .or(token.label.filter(|label| !label.is_empty())),
            token: non_empty(token.token).or(planned.token.clone()),
            clients_registered: Some(token.clients_registered),
            expiry: non_empty(token.expiry),
            uri: non_empty(token.uri),
            created_at: non_empty(token.created_at),
        }
    }
}

#[async_trait]
impl Resource for RegTokenResource {
    type Data = CmClient;
    type State = RegTokenState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_reg_token"
    }

    fn schema(&self) -> Schema {
        let replace = |attr: Attribute| {
            attr.optional()
                .computed()
                .requires_replace()
                .use_state_for_unknown()
        };
        Schema::new("Token clients present to register with the appliance.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(replace(
                Attribute::string("ca_id").description("Local CA signing the client certificates."),
            ))
            .attribute(replace(Attribute::string("lifetime").description("Duration such as 720h.")))
            .attribute(replace(Attribute::number("max_clients")))
            .attribute(replace(Attribute::string("name_prefix")))
            .attribute(
                Attribute::map("label", AttributeType::String)
                    .optional()
                    .requires_replace(),
            )
            .attribute(
                Attribute::string("token")
                    .computed()
                    .sensitive()
                    .use_state_for_unknown(),
            )
            .attribute(Attribute::number("clients_registered").computed())
            .attribute(Attribute::string("expiry").computed().use_state_for_unknown())
            .attribute(Attribute::string("uri").computed().use_state_for_unknown())
            .attribute(Attribute::string("created_at").computed().use_state_for_unknown())
    }

    async fn create(
        &self,
        client: &CmClient,
        plan: RegTokenState,
    ) -> Result<RegTokenState, ProviderError> {
        let token = client
            .create_reg_token(&plan.create_request())
            .await
            .or_diagnostic("Error creating registration token")?;
        info!(id = %token.id, ca_id = %token.ca_id, "Created registration token");
        Ok(RegTokenState::from_response(token, &plan))
    }

    async fn read(
        &self,
        client: &CmClient,
        state: RegTokenState,
    ) -> Result<Option<RegTokenState>, ProviderError> {
        let id = require_id(&state.id, "registration token")?;
        let token = client
            .get_reg_token(id)
            .await
            .found()
            .or_diagnostic("Error reading registration token")?;
        Ok(token.map(|token| RegTokenState::from_response(token, &state)))
    }

    async fn update(
        &self,
        _client: &CmClient,
        prior: RegTokenState,
        _plan: RegTokenState,
    ) -> Result<RegTokenState, ProviderError> {
        Ok(prior)
    }

    async fn delete(&self, client: &CmClient, state: RegTokenState) -> Result<(), ProviderError> {
        let id = require_id(&state.id, "registration token")?;
        ignore_not_found(client.delete_reg_token(id).await)
            .or_diagnostic("Error deleting registration token")?;
        info!(id, "Deleted registration token");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_body() {
        let plan = RegTokenState {
            ca_id: Some("ca-1".to_string()),
            lifetime: Some("720h".to_string()),
            max_clients: Some(10),
            label: Some(BTreeMap::from([("team".to_string(), "payments".to_string())])),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(plan.create_request()).unwrap(),
            json!({
                "ca_id": "ca-1",
                "lifetime": "720h",
                "max_clients": 10,
                "label": {"team": "payments"}
            })
        );
    }

    #[test]
    fn test_from_response() {
        let plan = RegTokenState {
            lifetime: Some("720h".to_string()),
            ..Default::default()
        };
        let token: RegToken = serde_json::from_value(json!({
            "id": "t-1",
            "token": "MjAyNC0w",
            "ca_id": "ca-1",
            "lifetime": "720h0m0s",
            "max_clients": 10,
            "clients_registered": 2,
            "name_prefix": "client"
        }))
        .unwrap();

        let state = RegTokenState::from_response(token, &plan);
        assert_eq!(state.lifetime.as_deref(), Some("720h"));
        assert_eq!(state.token.as_deref(), Some("MjAyNC0w"));
        assert_eq!(state.ca_id.as_deref(), Some("ca-1"));
        assert_eq!(state.clients_registered, Some(2));
        assert_eq!(state.label, None);
    }
}
