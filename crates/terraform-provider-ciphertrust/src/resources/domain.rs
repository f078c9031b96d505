//! `ciphertrust_cm_domain`: administrative domains

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{CreateDomainRequest, Domain, UpdateDomainRequest};
use ciphertrust_plugin::{Attribute, AttributeType, ProviderError, Resource, ResultExt, Schema};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    NotFoundExt, computed_str, ignore_not_found, json_text, non_empty, parse_json, require_id,
};

pub struct DomainResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainState {
    pub id: Option<String>,
    pub name: Option<String>,
    pub admins: Option<Vec<String>>,
    pub allow_user_management: Option<bool>,
    pub parent_ca_id: Option<String>,
    pub hsm_connection_id: Option<String>,
    pub hsm_kek_label: Option<String>,
    /// JSON-encoded
    pub meta: Option<String>,
    pub uri: Option<String>,
    pub account: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl DomainState {
    pub fn create_request(&self) -> Result<CreateDomainRequest, ProviderError> {
        Ok(CreateDomainRequest {
            name: self.name.clone().unwrap_or_default(),
            admins: self.admins.clone().unwrap_or_default(),
            allow_user_management: self.allow_user_management,
            parent_ca_id: self.parent_ca_id.clone(),
            hsm_connection_id: self.hsm_connection_id.clone(),
            hsm_kek_label: self.hsm_kek_label.clone(),
            meta: parse_json("meta", self.meta.as_deref())?,
        })
    }

    pub fn update_request(&self) -> Result<UpdateDomainRequest, ProviderError> {
        Ok(UpdateDomainRequest {
            allow_user_management: self.allow_user_management,
            hsm_kek_label: self.hsm_kek_label.clone(),
            meta: parse_json("meta", self.meta.as_deref())?,
        })
    }

    pub fn from_response(domain: Domain, planned: &DomainState) -> Self {
        DomainState {
            id: non_empty(domain.id),
            name: computed_str(domain.name, planned.name.clone()),
            // the appliance reports admins as user ids even when names were given
            admins: planned
                .admins
                .clone()
                .or_else(|| (!domain.admins.is_empty()).then_some(domain.admins)),
            allow_user_management: Some(domain.allow_user_management),
            parent_ca_id: computed_str(domain.parent_ca_id, planned.parent_ca_id.clone()),
            hsm_connection_id: computed_str(
                domain.hsm_connection_id,
                planned.hsm_connection_id.clone(),
            ),
            hsm_kek_label: computed_str(domain.hsm_kek_label, planned.hsm_kek_label.clone()),
            meta: json_text(domain.meta.as_ref(), planned.meta.clone()),
            uri: non_empty(domain.uri),
            account: non_empty(domain.account),
            created_at: non_empty(domain.created_at),
            updated_at: non_empty(domain.updated_at),
        }
    }
}

#[async_trait]
impl Resource for DomainResource {
    type Data = CmClient;
    type State = DomainState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_domain"
    }

    fn schema(&self) -> Schema {
        Schema::new("Administrative domain.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(Attribute::string("name").required().requires_replace())
            .attribute(
                Attribute::list("admins", AttributeType::String)
                    .required()
                    .requires_replace()
                    .description("Users, by name or id, administering the domain."),
            )
            .attribute(Attribute::bool("allow_user_management").optional().computed())
            .attribute(
                Attribute::string("parent_ca_id")
                    .optional()
                    .computed()
                    .requires_replace()
                    .use_state_for_unknown(),
            )
            .attribute(
                Attribute::string("hsm_connection_id")
                    .optional()
                    .computed()
                    .requires_replace()
                    .use_state_for_unknown(),
            )
            .attribute(Attribute::string("hsm_kek_label").optional().computed())
            .attribute(Attribute::string("meta").optional().computed())
            .attribute(Attribute::string("uri").computed().use_state_for_unknown())
            .attribute(Attribute::string("account").computed().use_state_for_unknown())
            .attribute(Attribute::string("created_at").computed().use_state_for_unknown())
            .attribute(Attribute::string("updated_at").computed())
    }

    async fn create(
        &self,
        client: &CmClient,
        plan: DomainState,
    ) -> Result<DomainState, ProviderError> {
        let domain = client
            .create_domain(&plan.create_request()?)
            .await
            .or_diagnostic("Error creating domain")?;
        info!(id = %domain.id, name = %domain.name, "Created domain");
        Ok(DomainState::from_response(domain, &plan))
    }

    async fn read(
        &self,
        client: &CmClient,
        state: DomainState,
    ) -> Result<Option<DomainState>, ProviderError> {
        let id = require_id(&state.id, "domain")?;
        let domain = client
            .get_domain(id)
            .await
            .found()
            .or_diagnostic("Error reading domain")?;
        Ok(domain.map(|domain| DomainState::from_response(domain, &state)))
    }

    async fn update(
        &self,
        client: &CmClient,
        prior: DomainState,
        plan: DomainState,
    ) -> Result<DomainState, ProviderError> {
        let id = require_id(&prior.id, "domain")?;
        let domain = client
            .update_domain(id, &plan.update_request()?)
            .await
            .or_diagnostic("Error updating domain")?;
        Ok(DomainState::from_response(domain, &plan))
    }

    async fn delete(&self, client: &CmClient, state: DomainState) -> Result<(), ProviderError> {
        let id = require_id(&state.id, "domain")?;
        ignore_not_found(client.delete_domain(id).await).or_diagnostic("Error deleting domain")?;
        info!(id, "Deleted domain");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_bodies() {
        let plan = DomainState {
            name: Some("engineering".to_string()),
            admins: Some(vec!["admin".to_string()]),
            allow_user_management: Some(true),
            meta: Some("{\"cost_center\": 42}".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(plan.create_request().unwrap()).unwrap(),
            json!({
                "name": "engineering",
                "admins": ["admin"],
                "allow_user_management": true,
                "meta": {"cost_center": 42}
            })
        );
        assert_eq!(
            serde_json::to_value(plan.update_request().unwrap()).unwrap(),
            json!({"allow_user_management": true, "meta": {"cost_center": 42}})
        );
    }

    #[test]
    fn test_from_response_keeps_admin_names() {
        let plan = DomainState {
            name: Some("engineering".to_string()),
            admins: Some(vec!["admin".to_string()]),
            ..Default::default()
        };
        let domain: Domain = serde_json::from_value(json!({
            "id": "d-1",
            "name": "engineering",
            "admins": ["local|0a1b"],
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        let state = DomainState::from_response(domain, &plan);
        assert_eq!(state.admins, Some(vec!["admin".to_string()]));
        assert_eq!(state.allow_user_management, Some(false));
        assert_eq!(state.created_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(state.meta, None);
    }
}
