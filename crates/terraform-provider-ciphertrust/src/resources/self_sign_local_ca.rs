//! `ciphertrust_cm_self_sign_local_ca`: self-signing a pending local CA
//!
//! Signing cannot be undone through the API, so destroying this resource
//! only drops it from state.

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{LocalCa, SelfSignRequest};
use ciphertrust_plugin::{Attribute, ProviderError, Resource, ResultExt, Schema};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{NotFoundExt, non_empty, require_id};

pub struct SelfSignLocalCaResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelfSignState {
    pub id: Option<String>,
    pub local_ca_id: Option<String>,
    pub duration: Option<i64>,
    pub not_before: Option<String>,
    pub not_after: Option<String>,
    pub state: Option<String>,
    pub cert: Option<String>,
    pub serial_number: Option<String>,
    pub subject: Option<String>,
    pub issuer: Option<String>,
}

impl SelfSignState {
    pub fn request(&self) -> SelfSignRequest {
        SelfSignRequest {
            duration: self.duration,
            not_before: self.not_before.clone(),
            not_after: self.not_after.clone(),
        }
    }

    fn with_response(mut self, ca: LocalCa) -> Self {
        self.id = non_empty(ca.id.clone()).or(self.local_ca_id.clone());
        self.local_ca_id = self.id.clone();
        self.state = non_empty(ca.state);
        self.cert = non_empty(ca.cert);
        self.serial_number = non_empty(ca.serial_number);
        self.subject = non_empty(ca.subject);
        self.issuer = non_empty(ca.issuer);
        self
    }
}

#[async_trait]
impl Resource for SelfSignLocalCaResource {
    type Data = CmClient;
    type State = SelfSignState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_self_sign_local_ca"
    }

    fn schema(&self) -> Schema {
        Schema::new("Self-signs a pending local CA.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(Attribute::string("local_ca_id").required().requires_replace())
            .attribute(
                Attribute::number("duration")
                    .optional()
                    .requires_replace()
                    .description("Validity in days."),
            )
            .attribute(Attribute::string("not_before").optional().requires_replace())
            .attribute(Attribute::string("not_after").optional().requires_replace())
            .attribute(Attribute::string("state").computed())
            .attribute(Attribute::string("cert").computed())
            .attribute(Attribute::string("serial_number").computed())
            .attribute(Attribute::string("subject").computed())
            .attribute(Attribute::string("issuer").computed())
    }

    async fn create(
        &self,
        client: &CmClient,
        plan: SelfSignState,
    ) -> Result<SelfSignState, ProviderError> {
        let ca_id = require_id(&plan.local_ca_id, "local CA")?;
        let ca = client
            .self_sign_local_ca(ca_id, &plan.request())
            .await
            .or_diagnostic("Error self-signing local CA")?;
        info!(id = ca_id, serial = %ca.serial_number, "Self-signed local CA");
        Ok(plan.with_response(ca))
    }

    async fn read(
        &self,
        client: &CmClient,
        state: SelfSignState,
    ) -> Result<Option<SelfSignState>, ProviderError> {
        let id = require_id(&state.id, "local CA")?;
        let ca = client
            .get_local_ca(id)
            .await
            .found()
            .or_diagnostic("Error reading local CA")?;
        Ok(ca.map(|ca| state.with_response(ca)))
    }

    async fn update(
        &self,
        _client: &CmClient,
        prior: SelfSignState,
        plan: SelfSignState,
    ) -> Result<SelfSignState, ProviderError> {
        // every input forces replacement
        Ok(SelfSignState {
            id: prior.id,
            state: prior.state,
            cert: prior.cert,
            serial_number: prior.serial_number,
            subject: prior.subject,
            issuer: prior.issuer,
            ..plan
        })
    }

    async fn delete(&self, _client: &CmClient, state: SelfSignState) -> Result<(), ProviderError> {
        warn!(
            id = state.id.as_deref().unwrap_or_default(),
            "Self-signed local CA removed from state only; the certificate stays on the appliance"
        );
        Ok(())
    }

    fn state_only_delete(&self) -> Option<&'static str> {
        Some("The self-signed certificate stays on the appliance until the local CA is deleted.")
    }

    async fn import(&self, _client: &CmClient, id: &str) -> Result<SelfSignState, ProviderError> {
        Ok(SelfSignState {
            id: Some(id.to_string()),
            local_ca_id: Some(id.to_string()),
            ..Default::default()
        })
    }
}
