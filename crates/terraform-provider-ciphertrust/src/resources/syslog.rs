//! `ciphertrust_cm_syslog`: remote syslog connections

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{Syslog, SyslogRequest};
use ciphertrust_plugin::{Attribute, Diagnostics, ProviderError, Resource, ResultExt, Schema, Value};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{NotFoundExt, computed_str, ignore_not_found, non_empty, require_id};

pub struct SyslogResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyslogState {
    pub id: Option<String>,
    pub host: Option<String>,
    pub port: Option<i64>,
    pub transport: Option<String>,
    pub ca_cert: Option<String>,
    pub message_format: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl SyslogState {
    pub fn request(&self) -> SyslogRequest {
        SyslogRequest {
            host: self.host.clone(),
            port: self.port,
            transport: self.transport.clone(),
            ca_cert: self.ca_cert.clone(),
            message_format: self.message_format.clone(),
        }
    }

    pub fn from_response(syslog: Syslog, planned: &SyslogState) -> Self {
        SyslogState {
            id: non_empty(syslog.id),
            host: computed_str(syslog.host, planned.host.clone()),
            port: (syslog.port > 0).then_some(syslog.port).or(planned.port),
            transport: computed_str(syslog.transport, planned.transport.clone()),
            // PEM formatting differs between what was sent and what is echoed
            ca_cert: planned.ca_cert.clone(),
            message_format: computed_str(syslog.message_format, planned.message_format.clone()),
            created_at: non_empty(syslog.created_at),
            updated_at: non_empty(syslog.updated_at),
        }
    }
}

#[async_trait]
impl Resource for SyslogResource {
    type Data = CmClient;
    type State = SyslogState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_syslog"
    }

    fn schema(&self) -> Schema {
        Schema::new("Remote syslog server receiving appliance logs.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(Attribute::string("host").required())
            .attribute(Attribute::number("port").optional().computed())
            .attribute(
                Attribute::string("transport")
                    .required()
                    .one_of(&["udp", "tcp", "tls"]),
            )
            .attribute(
                Attribute::string("ca_cert")
                    .optional()
                    .description("PEM CA certificate, used with the tls transport."),
            )
            .attribute(
                Attribute::string("message_format")
                    .optional()
                    .computed()
                    .one_of(&["rfc5424", "plain_message", "cef", "leef"]),
            )
            .attribute(Attribute::string("created_at").computed().use_state_for_unknown())
            .attribute(Attribute::string("updated_at").computed())
    }

    fn validate(&self, config: &Value, diags: &mut Diagnostics) {
        let transport = config.get("transport").and_then(|v| v.as_str());
        let ca_cert = config.get("ca_cert");
        if transport == Some("tls") && ca_cert.is_none_or(|v| v.is_null()) {
            diags.attribute_error(
                vec!["ca_cert".to_string()],
                "Missing CA certificate",
                "ca_cert is required when transport is tls.",
            );
        }
    }

    async fn create(
        &self,
        client: &CmClient,
        plan: SyslogState,
    ) -> Result<SyslogState, ProviderError> {
        let syslog = client
            .create_syslog(&plan.request())
            .await
            .or_diagnostic("Error creating syslog connection")?;
        info!(id = %syslog.id, host = %syslog.host, "Created syslog connection");
        Ok(SyslogState::from_response(syslog, &plan))
    }

    async fn read(
        &self,
        client: &CmClient,
        state: SyslogState,
    ) -> Result<Option<SyslogState>, ProviderError> {
        let id = require_id(&state.id, "syslog connection")?;
        let syslog = client
            .get_syslog(id)
            .await
            .found()
            .or_diagnostic("Error reading syslog connection")?;
        Ok(syslog.map(|syslog| SyslogState::from_response(syslog, &state)))
    }

    async fn update(
        &self,
        client: &CmClient,
        prior: SyslogState,
        plan: SyslogState,
    ) -> Result<SyslogState, ProviderError> {
        let id = require_id(&prior.id, "syslog connection")?;
        let syslog = client
            .update_syslog(id, &plan.request())
            .await
            .or_diagnostic("Error updating syslog connection")?;
        Ok(SyslogState::from_response(syslog, &plan))
    }

    async fn delete(&self, client: &CmClient, state: SyslogState) -> Result<(), ProviderError> {
        let id = require_id(&state.id, "syslog connection")?;
        ignore_not_found(client.delete_syslog(id).await)
            .or_diagnostic("Error deleting syslog connection")?;
        info!(id, "Deleted syslog connection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_is_camel_case() {
        let plan = SyslogState {
            host: Some("logs.example.com".to_string()),
            port: Some(6514),
            transport: Some("tls".to_string()),
            ca_cert: Some("-----BEGIN CERTIFICATE-----".to_string()),
            message_format: Some("rfc5424".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(plan.request()).unwrap(),
            json!({
                "host": "logs.example.com",
                "port": 6514,
                "transport": "tls",
                "caCert": "-----BEGIN CERTIFICATE-----",
                "messageFormat": "rfc5424"
            })
        );
    }

    #[test]
    fn test_from_response() {
        let syslog: Syslog = serde_json::from_value(json!({
            "id": "s-1",
            "host": "logs.example.com",
            "port": 514,
            "transport": "udp",
            "messageFormat": "plain_message",
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        let plan = SyslogState {
            host: Some("logs.example.com".to_string()),
            transport: Some("udp".to_string()),
            ..Default::default()
        };

        let state = SyslogState::from_response(syslog, &plan);
        assert_eq!(state.id.as_deref(), Some("s-1"));
        assert_eq!(state.port, Some(514));
        assert_eq!(state.message_format.as_deref(), Some("plain_message"));
        assert_eq!(state.ca_cert, None);
    }

    #[test]
    fn test_tls_requires_ca_cert() {
        let config = Value::from_json(json!({"host": "logs", "transport": "tls", "ca_cert": null}));
        let mut diags = Diagnostics::new();
        SyslogResource.validate(&config, &mut diags);
        assert!(diags.has_errors());

        let config = Value::from_json(json!({"host": "logs", "transport": "udp", "ca_cert": null}));
        let mut diags = Diagnostics::new();
        SyslogResource.validate(&config, &mut diags);
        assert!(!diags.has_errors());
    }
}
