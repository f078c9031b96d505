//! `ciphertrust_cm_license`: installed licenses
//!
//! The appliance has no endpoint to remove a license, so delete only drops
//! it from state.

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{AddLicenseRequest, License};
use ciphertrust_plugin::{Attribute, ProviderError, Resource, ResultExt, Schema};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{NotFoundExt, computed_str, non_empty, require_id};

pub struct LicenseResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicenseState {
    pub id: Option<String>,
    pub license: Option<String>,
    pub bind_type: Option<String>,
    pub state: Option<String>,
    pub license_type: Option<String>,
    pub feature: Option<String>,
    pub version: Option<String>,
    pub start: Option<String>,
    pub expiration: Option<String>,
    pub license_count: Option<i64>,
}

impl LicenseState {
    pub fn add_request(&self) -> AddLicenseRequest {
        AddLicenseRequest {
            license: self.license.clone().unwrap_or_default(),
            bind_type: self.bind_type.clone(),
        }
    }

    pub fn from_response(license: License, planned: &LicenseState) -> Self {
        LicenseState {
            id: non_empty(license.id),
            // never echoed back
            license: planned.license.clone(),
            bind_type: computed_str(license.bind_type, planned.bind_type.clone()),
            state: non_empty(license.state),
            license_type: non_empty(license.license_type),
            feature: non_empty(license.feature),
            version: non_empty(license.version),
            start: non_empty(license.start),
            expiration: non_empty(license.expiration),
            license_count: Some(license.license_count),
        }
    }
}

#[async_trait]
impl Resource for LicenseResource {
    type Data = CmClient;
    type State = LicenseState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_license"
    }

    fn schema(&self) -> Schema {
        Schema::new("License installed on the appliance.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(
                Attribute::string("license")
                    .required()
                    .sensitive()
                    .requires_replace()
                    .description("License string issued by Thales."),
            )
            .attribute(
                Attribute::string("bind_type")
                    .optional()
                    .computed()
                    .requires_replace()
                    .use_state_for_unknown()
                    .one_of(&["instance", "cluster"]),
            )
            .attribute(Attribute::string("state").computed())
            .attribute(Attribute::string("license_type").computed().use_state_for_unknown())
            .attribute(Attribute::string("feature").computed().use_state_for_unknown())
            .attribute(Attribute::string("version").computed().use_state_for_unknown())
            .attribute(Attribute::string("start").computed().use_state_for_unknown())
            .attribute(Attribute::string("expiration").computed().use_state_for_unknown())
            .attribute(Attribute::number("license_count").computed())
    }

    async fn create(
        &self,
        client: &CmClient,
        plan: LicenseState,
    ) -> Result<LicenseState, ProviderError> {
        let license = client
            .add_license(&plan.add_request())
            .await
            .or_diagnostic("Error adding license")?;
        info!(id = %license.id, feature = %license.feature, "Added license");
        Ok(LicenseState::from_response(license, &plan))
    }

    async fn read(
        &self,
        client: &CmClient,
        state: LicenseState,
    ) -> Result<Option<LicenseState>, ProviderError> {
        let id = require_id(&state.id, "license")?;
        let license = client
            .get_license(id)
            .await
            .found()
            .or_diagnostic("Error reading license")?;
        Ok(license.map(|license| LicenseState::from_response(license, &state)))
    }

    async fn update(
        &self,
        _client: &CmClient,
        _prior: LicenseState,
        plan: LicenseState,
    ) -> Result<LicenseState, ProviderError> {
        // every input forces replacement
        Ok(plan)
    }

    async fn delete(&self, _client: &CmClient, state: LicenseState) -> Result<(), ProviderError> {
        warn!(
            id = state.id.as_deref().unwrap_or_default(),
            "Licenses cannot be removed from the appliance, dropping from state only"
        );
        Ok(())
    }

    fn state_only_delete(&self) -> Option<&'static str> {
        Some("Licenses cannot be removed from the appliance; the license stays installed.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_destroy_warns_state_only() {
        let detail = Resource::state_only_delete(&LicenseResource).unwrap();
        assert!(detail.contains("stays"));
    }

    #[test]
    fn test_add_request_body() {
        let plan = LicenseState {
            license: Some("LIC-123".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(plan.add_request()).unwrap(),
            json!({"license": "LIC-123"})
        );
    }

    #[test]
    fn test_from_response_keeps_license_string() {
        let plan = LicenseState {
            license: Some("LIC-123".to_string()),
            ..Default::default()
        };
        let license: License = serde_json::from_value(json!({
            "id": "l-1",
            "state": "active",
            "type": "production",
            "feature": "KeySecure",
            "bind_type": "cluster",
            "license_count": 5
        }))
        .unwrap();

        let state = LicenseState::from_response(license, &plan);
        assert_eq!(state.license.as_deref(), Some("LIC-123"));
        assert_eq!(state.bind_type.as_deref(), Some("cluster"));
        assert_eq!(state.license_type.as_deref(), Some("production"));
        assert_eq!(state.license_count, Some(5));
        assert_eq!(state.expiration, None);
    }
}
