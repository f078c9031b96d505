//! `ciphertrust_cm_property`: system configuration properties
//!
//! Properties always exist on the appliance; destroying the resource resets
//! the value to its default.

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::Property;
use ciphertrust_plugin::{Attribute, ProviderError, Resource, ResultExt, Schema};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{NotFoundExt, computed_str, ignore_not_found, non_empty, require_id};

pub struct PropertyResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyState {
    pub id: Option<String>,
    pub name: Option<String>,
    pub value: Option<String>,
    pub description: Option<String>,
    pub updated_at: Option<String>,
}

impl PropertyState {
    pub fn from_response(property: Property, planned: &PropertyState) -> Self {
        let name = computed_str(property.name, planned.name.clone());
        PropertyState {
            id: name.clone(),
            name,
            value: Some(property.value),
            description: non_empty(property.description),
            updated_at: non_empty(property.updated_at),
        }
    }
}

async fn set(client: &CmClient, plan: PropertyState) -> Result<PropertyState, ProviderError> {
    let name = require_id(&plan.name, "property")?;
    let value = plan.value.as_deref().unwrap_or_default();
    let property = client
        .set_property(name, value)
        .await
        .or_diagnostic("Error setting property")?;
    info!(name, value, "Set property");
    Ok(PropertyState::from_response(property, &plan))
}

#[async_trait]
impl Resource for PropertyResource {
    type Data = CmClient;
    type State = PropertyState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_property"
    }

    fn schema(&self) -> Schema {
        Schema::new("System property such as ENABLE_RECORDS_DB_STORE.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(Attribute::string("name").required().requires_replace())
            .attribute(Attribute::string("value").required())
            .attribute(Attribute::string("description").computed().use_state_for_unknown())
            .attribute(Attribute::string("updated_at").computed())
    }

    async fn create(
        &self,
        client: &CmClient,
        plan: PropertyState,
    ) -> Result<PropertyState, ProviderError> {
        set(client, plan).await
    }

    async fn read(
        &self,
        client: &CmClient,
        state: PropertyState,
    ) -> Result<Option<PropertyState>, ProviderError> {
        let name = require_id(&state.id, "property")?;
        let property = client
            .get_property(name)
            .await
            .found()
            .or_diagnostic("Error reading property")?;
        Ok(property.map(|property| PropertyState::from_response(property, &state)))
    }

    async fn update(
        &self,
        client: &CmClient,
        _prior: PropertyState,
        plan: PropertyState,
    ) -> Result<PropertyState, ProviderError> {
        set(client, plan).await
    }

    async fn delete(&self, client: &CmClient, state: PropertyState) -> Result<(), ProviderError> {
        let name = require_id(&state.id, "property")?;
        ignore_not_found(client.reset_property(name).await)
            .or_diagnostic("Error resetting property")?;
        info!(name, "Reset property to its default");
        Ok(())
    }

    async fn import(&self, _client: &CmClient, id: &str) -> Result<PropertyState, ProviderError> {
        Ok(PropertyState {
            id: Some(id.to_string()),
            name: Some(id.to_string()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_response() {
        let property: Property = serde_json::from_value(json!({
            "name": "ENABLE_RECORDS_DB_STORE",
            "value": "false",
            "description": "Store records in the database",
            "updatedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        let state = PropertyState::from_response(property, &PropertyState::default());
        assert_eq!(state.id.as_deref(), Some("ENABLE_RECORDS_DB_STORE"));
        assert_eq!(state.value.as_deref(), Some("false"));
        assert_eq!(state.updated_at.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_empty_value_is_kept() {
        let plan = PropertyState {
            name: Some("BANNER".to_string()),
            value: Some(String::new()),
            ..Default::default()
        };
        let property: Property =
            serde_json::from_value(json!({"name": "BANNER", "value": ""})).unwrap();
        let state = PropertyState::from_response(property, &plan);
        assert_eq!(state.value.as_deref(), Some(""));
        assert_eq!(state.description, None);
    }
}
