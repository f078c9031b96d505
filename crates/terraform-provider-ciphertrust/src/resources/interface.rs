//! `ciphertrust_cm_interface`: network interfaces (NAE, KMIP, SSH, web)
//!
//! Interfaces are addressed by name.

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{
    AutoGenAttributes, DistinguishedName, Interface, InterfaceRequest, TrustedCas,
};
use ciphertrust_plugin::{Attribute, AttributeType, ProviderError, Resource, ResultExt, Schema};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::local_ca::NameModel;
use super::{NotFoundExt, computed_str, ignore_not_found, non_empty, require_id};

pub struct InterfaceResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoGenAttributesModel {
    pub cn: Option<String>,
    pub dns_names: Option<Vec<String>>,
    pub ip_addresses: Option<Vec<String>>,
    pub email_addresses: Option<Vec<String>>,
    pub names: Option<Vec<NameModel>>,
}

impl From<&AutoGenAttributesModel> for AutoGenAttributes {
    fn from(model: &AutoGenAttributesModel) -> Self {
        AutoGenAttributes {
            cn: model.cn.clone(),
            dns_names: model.dns_names.clone().unwrap_or_default(),
            ip_addresses: model.ip_addresses.clone().unwrap_or_default(),
            email_addresses: model.email_addresses.clone().unwrap_or_default(),
            names: model
                .names
                .iter()
                .flatten()
                .map(DistinguishedName::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrustedCasModel {
    pub local: Option<Vec<String>>,
    pub external: Option<Vec<String>>,
}

impl TrustedCasModel {
    fn from_wire(cas: TrustedCas) -> Self {
        TrustedCasModel {
            local: Some(cas.local),
            external: Some(cas.external),
        }
    }
}

impl From<&TrustedCasModel> for TrustedCas {
    fn from(model: &TrustedCasModel) -> Self {
        TrustedCas {
            local: model.local.clone().unwrap_or_default(),
            external: model.external.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceState {
    pub id: Option<String>,
    pub name: Option<String>,
    pub port: Option<i64>,
    pub mode: Option<String>,
    pub interface_type: Option<String>,
    pub network_interface: Option<String>,
    pub enabled: Option<bool>,
    pub auto_gen_ca_id: Option<String>,
    pub local_auto_gen_attributes: Option<AutoGenAttributesModel>,
    pub trusted_cas: Option<TrustedCasModel>,
    pub cert_user_field: Option<String>,
    pub minimum_tls_version: Option<String>,
    pub maximum_tls_version: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl InterfaceState {
    pub fn create_request(&self) -> InterfaceRequest {
        InterfaceRequest {
            name: self.name.clone(),
            interface_type: self.interface_type.clone(),
            local_auto_gen_attributes: self
                .local_auto_gen_attributes
                .as_ref()
                .map(AutoGenAttributes::from),
            ..self.update_request()
        }
    }

    /// Name, type and the generated certificate subject are fixed
    pub fn update_request(&self) -> InterfaceRequest {
        InterfaceRequest {
            name: None,
            port: self.port,
            mode: self.mode.clone(),
            interface_type: None,
            network_interface: self.network_interface.clone(),
            enabled: self.enabled,
            auto_gen_ca_id: self.auto_gen_ca_id.clone(),
            local_auto_gen_attributes: None,
            trusted_cas: self.trusted_cas.as_ref().map(TrustedCas::from),
            cert_user_field: self.cert_user_field.clone(),
            minimum_tls_version: self.minimum_tls_version.clone(),
            maximum_tls_version: self.maximum_tls_version.clone(),
        }
    }

    pub fn from_response(interface: Interface, planned: &InterfaceState) -> Self {
        let name = computed_str(interface.name, planned.name.clone());
        InterfaceState {
            id: name.clone(),
            name,
            port: (interface.port > 0).then_some(interface.port).or(planned.port),
            mode: computed_str(interface.mode, planned.mode.clone()),
            interface_type: computed_str(interface.interface_type, planned.interface_type.clone()),
            network_interface: computed_str(
                interface.network_interface,
                planned.network_interface.clone(),
            ),
            enabled: Some(interface.enabled),
            auto_gen_ca_id: computed_str(interface.auto_gen_ca_id, planned.auto_gen_ca_id.clone()),
            local_auto_gen_attributes: planned.local_auto_gen_attributes.clone(),
            trusted_cas: planned.trusted_cas.clone().map(|planned_cas| {
                interface
                    .trusted_cas
                    .map(TrustedCasModel::from_wire)
                    .unwrap_or(planned_cas)
            }),
            cert_user_field: computed_str(
                interface.cert_user_field,
                planned.cert_user_field.clone(),
            ),
            minimum_tls_version: computed_str(
                interface.minimum_tls_version,
                planned.minimum_tls_version.clone(),
            ),
            maximum_tls_version: computed_str(
                interface.maximum_tls_version,
                planned.maximum_tls_version.clone(),
            ),
            created_at: non_empty(interface.created_at),
            updated_at: non_empty(interface.updated_at),
        }
    }
}

#[async_trait]
impl Resource for InterfaceResource {
    type Data = CmClient;
    type State = InterfaceState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_interface"
    }

    fn schema(&self) -> Schema {
        let names = vec![
            Attribute::string("c").optional(),
            Attribute::string("st").optional(),
            Attribute::string("l").optional(),
            Attribute::string("o").optional(),
            Attribute::string("ou").optional(),
        ];

        Schema::new("Network interface of the appliance.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(Attribute::string("name").required().requires_replace())
            .attribute(Attribute::number("port").optional().computed())
            .attribute(
                Attribute::string("mode")
                    .optional()
                    .computed()
                    .description("Authentication mode, e.g. tls-cert-opt-pw-opt or no-tls-pw-opt."),
            )
            .attribute(
                Attribute::string("interface_type")
                    .optional()
                    .computed()
                    .requires_replace()
                    .use_state_for_unknown()
                    .one_of(&["nae", "kmip", "snmp", "ssh", "web"]),
            )
            .attribute(Attribute::string("network_interface").optional().computed())
            .attribute(Attribute::bool("enabled").optional().computed())
            .attribute(Attribute::string("auto_gen_ca_id").optional().computed())
            .attribute(
                Attribute::single_nested(
                    "local_auto_gen_attributes",
                    vec![
                        Attribute::string("cn").required(),
                        Attribute::list("dns_names", AttributeType::String).optional(),
                        Attribute::list("ip_addresses", AttributeType::String).optional(),
                        Attribute::list("email_addresses", AttributeType::String).optional(),
                        Attribute::list_nested("names", names).optional(),
                    ],
                )
                .optional()
                .requires_replace(),
            )
            .attribute(
                Attribute::single_nested(
                    "trusted_cas",
                    vec![
                        Attribute::list("local", AttributeType::String).optional(),
                        Attribute::list("external", AttributeType::String).optional(),
                    ],
                )
                .optional(),
            )
            .attribute(Attribute::string("cert_user_field").optional().computed())
            .attribute(Attribute::string("minimum_tls_version").optional().computed())
            .attribute(Attribute::string("maximum_tls_version").optional().computed())
            .attribute(Attribute::string("created_at").computed().use_state_for_unknown())
            .attribute(Attribute::string("updated_at").computed())
    }

    async fn create(
        &self,
        client: &CmClient,
        plan: InterfaceState,
    ) -> Result<InterfaceState, ProviderError> {
        let interface = client
            .create_interface(&plan.create_request())
            .await
            .or_diagnostic("Error creating interface")?;
        info!(name = %interface.name, port = interface.port, "Created interface");
        Ok(InterfaceState::from_response(interface, &plan))
    }

    async fn read(
        &self,
        client: &CmClient,
        state: InterfaceState,
    ) -> Result<Option<InterfaceState>, ProviderError> {
        let name = require_id(&state.id, "interface")?;
        let interface = client
            .get_interface(name)
            .await
            .found()
            .or_diagnostic("Error reading interface")?;
        Ok(interface.map(|interface| InterfaceState::from_response(interface, &state)))
    }

    async fn update(
        &self,
        client: &CmClient,
        prior: InterfaceState,
        plan: InterfaceState,
    ) -> Result<InterfaceState, ProviderError> {
        let name = require_id(&prior.id, "interface")?;
        let interface = client
            .update_interface(name, &plan.update_request())
            .await
            .or_diagnostic("Error updating interface")?;
        Ok(InterfaceState::from_response(interface, &plan))
    }

    async fn delete(&self, client: &CmClient, state: InterfaceState) -> Result<(), ProviderError> {
        let name = require_id(&state.id, "interface")?;
        ignore_not_found(client.delete_interface(name).await)
            .or_diagnostic("Error deleting interface")?;
        info!(name, "Deleted interface");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan() -> InterfaceState {
        InterfaceState {
            name: Some("kmip-2".to_string()),
            port: Some(5697),
            mode: Some("tls-cert-pw-opt".to_string()),
            interface_type: Some("kmip".to_string()),
            local_auto_gen_attributes: Some(AutoGenAttributesModel {
                cn: Some("kmip.example.com".to_string()),
                dns_names: Some(vec!["kmip.example.com".to_string()]),
                ..Default::default()
            }),
            trusted_cas: Some(TrustedCasModel {
                local: Some(vec!["ca-1".to_string()]),
                external: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_request_body() {
        assert_eq!(
            serde_json::to_value(plan().create_request()).unwrap(),
            json!({
                "name": "kmip-2",
                "port": 5697,
                "mode": "tls-cert-pw-opt",
                "type": "kmip",
                "local_auto_gen_attributes": {"cn": "kmip.example.com", "dns_names": ["kmip.example.com"]},
                "trusted_cas": {"local": ["ca-1"], "external": []}
            })
        );
    }

    #[test]
    fn test_update_request_omits_fixed_fields() {
        let body = serde_json::to_value(plan().update_request()).unwrap();
        assert!(body.get("name").is_none());
        assert!(body.get("type").is_none());
        assert!(body.get("local_auto_gen_attributes").is_none());
        assert_eq!(body["port"], 5697);
    }

    #[test]
    fn test_from_response() {
        let interface: Interface = serde_json::from_value(json!({
            "id": "9f1c",
            "name": "kmip-2",
            "port": 5697,
            "mode": "tls-cert-pw-opt",
            "type": "kmip",
            "enabled": true,
            "trusted_cas": {"local": ["ca-1"], "external": []}
        }))
        .unwrap();

        let state = InterfaceState::from_response(interface, &plan());
        assert_eq!(state.id.as_deref(), Some("kmip-2"));
        assert_eq!(state.enabled, Some(true));
        assert_eq!(
            state.trusted_cas,
            Some(TrustedCasModel {
                local: Some(vec!["ca-1".to_string()]),
                external: Some(vec![]),
            })
        );
    }
}
