//! `ciphertrust_cm_ntp`: NTP servers the appliance synchronizes with

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{NtpServer, NtpServerRequest};
use ciphertrust_plugin::{Attribute, ProviderError, Resource, ResultExt, Schema};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{NotFoundExt, computed_str, ignore_not_found, non_empty, require_id};

pub struct NtpResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NtpState {
    pub id: Option<String>,
    pub host: Option<String>,
    pub key: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl NtpState {
    pub fn request(&self) -> NtpServerRequest {
        NtpServerRequest {
            host: self.host.clone().unwrap_or_default(),
            key: self.key.clone(),
        }
    }

    pub fn from_response(server: NtpServer, planned: &NtpState) -> Self {
        NtpState {
            id: non_empty(server.id),
            host: computed_str(server.host, planned.host.clone()),
            key: planned.key.clone(),
            created_at: non_empty(server.created_at),
            updated_at: non_empty(server.updated_at),
        }
    }
}

#[async_trait]
impl Resource for NtpResource {
    type Data = CmClient;
    type State = NtpState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_ntp"
    }

    fn schema(&self) -> Schema {
        Schema::new("NTP server used by the appliance.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(Attribute::string("host").required().requires_replace())
            .attribute(
                Attribute::string("key")
                    .optional()
                    .sensitive()
                    .requires_replace()
                    .description("Symmetric key authenticating the server."),
            )
            .attribute(Attribute::string("created_at").computed().use_state_for_unknown())
            .attribute(Attribute::string("updated_at").computed().use_state_for_unknown())
    }

    async fn create(&self, client: &CmClient, plan: NtpState) -> Result<NtpState, ProviderError> {
        let server = client
            .add_ntp_server(&plan.request())
            .await
            .or_diagnostic("Error adding NTP server")?;
        info!(id = %server.id, host = %server.host, "Added NTP server");
        Ok(NtpState::from_response(server, &plan))
    }

    async fn read(
        &self,
        client: &CmClient,
        state: NtpState,
    ) -> Result<Option<NtpState>, ProviderError> {
        let id = require_id(&state.id, "NTP server")?;
        let server = client
            .get_ntp_server(id)
            .await
            .found()
            .or_diagnostic("Error reading NTP server")?;
        Ok(server.map(|server| NtpState::from_response(server, &state)))
    }

    async fn update(
        &self,
        _client: &CmClient,
        _prior: NtpState,
        plan: NtpState,
    ) -> Result<NtpState, ProviderError> {
        // every input forces replacement
        Ok(plan)
    }

    async fn delete(&self, client: &CmClient, state: NtpState) -> Result<(), ProviderError> {
        let id = require_id(&state.id, "NTP server")?;
        ignore_not_found(client.delete_ntp_server(id).await)
            .or_diagnostic("Error removing NTP server")?;
        info!(id, "Removed NTP server");
        Ok(())
    }
}
