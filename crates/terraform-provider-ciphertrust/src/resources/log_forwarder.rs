//! `ciphertrust_cm_log_forwarder`: ships audit and activity logs to an
//! external Elasticsearch, Loki or syslog connection

use std::collections::BTreeMap;

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{
    ElasticsearchIndices, ElasticsearchParams, LogForwarder, LogForwarderRequest, LokiParams,
};
use ciphertrust_plugin::{
    Attribute, AttributeType, Diagnostics, ProviderError, Resource, ResultExt, Schema, Value,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{NotFoundExt, computed_str, ignore_not_found, keep_planned, non_empty, require_id};

pub struct LogForwarderResource;

const FORWARDER_TYPES: [&str; 3] = ["elasticsearch", "loki", "syslog"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicesModel {
    pub activity_kmip: Option<String>,
    pub activity_nae: Option<String>,
    pub client_audit: Option<String>,
    pub server_audit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElasticsearchParamsModel {
    pub indices: Option<IndicesModel>,
}

impl ElasticsearchParamsModel {
    fn to_wire(&self) -> ElasticsearchParams {
        ElasticsearchParams {
            indices: self.indices.as_ref().map(|indices| ElasticsearchIndices {
                activity_kmip: indices.activity_kmip.clone(),
                activity_nae: indices.activity_nae.clone(),
                client_audit: indices.client_audit.clone(),
                server_audit: indices.server_audit.clone(),
            }),
        }
    }

    fn reconcile(response: Option<ElasticsearchParams>, planned: &Self) -> Self {
        let echoed_indices = response.and_then(|params| params.indices).unwrap_or_default();
        ElasticsearchParamsModel {
            indices: planned.indices.as_ref().map(|indices| IndicesModel {
                activity_kmip: keep_planned(
                    echoed_indices.activity_kmip,
                    indices.activity_kmip.clone(),
                ),
                activity_nae: keep_planned(
                    echoed_indices.activity_nae,
                    indices.activity_nae.clone(),
                ),
                client_audit: keep_planned(
                    echoed_indices.client_audit,
                    indices.client_audit.clone(),
                ),
                server_audit: keep_planned(
                    echoed_indices.server_audit,
                    indices.server_audit.clone(),
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LokiParamsModel {
    pub labels: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogForwarderState {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub forwarder_type: Option<String>,
    pub connection_id: Option<String>,
    pub elasticsearch_params: Option<ElasticsearchParamsModel>,
    pub loki_params: Option<LokiParamsModel>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl LogForwarderState {
    pub fn create_request(&self) -> LogForwarderRequest {
        LogForwarderRequest {
            name: self.name.clone(),
            forwarder_type: self.forwarder_type.clone(),
            ..self.update_request()
        }
    }

    pub fn update_request(&self) -> LogForwarderRequest {
        LogForwarderRequest {
            name: None,
            forwarder_type: None,
            connection_id: self.connection_id.clone(),
            elasticsearch_params: self
                .elasticsearch_params
                .as_ref()
                .map(ElasticsearchParamsModel::to_wire),
            loki_params: self.loki_params.as_ref().map(|params| LokiParams {
                labels: params.labels.clone(),
            }),
        }
    }

    pub fn from_response(forwarder: LogForwarder, planned: &LogForwarderState) -> Self {
        LogForwarderState {
            id: non_empty(forwarder.id),
            name: computed_str(forwarder.name, planned.name.clone()),
            forwarder_type: computed_str(forwarder.forwarder_type, planned.forwarder_type.clone()),
            connection_id: computed_str(forwarder.connection_id, planned.connection_id.clone()),
            elasticsearch_params: planned
                .elasticsearch_params
                .as_ref()
                .map(|params| {
                    ElasticsearchParamsModel::reconcile(forwarder.elasticsearch_params, params)
                }),
            loki_params: planned.loki_params.as_ref().map(|params| LokiParamsModel {
                labels: keep_planned(
                    forwarder.loki_params.and_then(|loki| loki.labels),
                    params.labels.clone(),
                ),
            }),
            created_at: non_empty(forwarder.created_at),
            updated_at: non_empty(forwarder.updated_at),
        }
    }
}

#[async_trait]
impl Resource for LogForwarderResource {
    type Data = CmClient;
    type State = LogForwarderState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_log_forwarder"
    }

    fn schema(&self) -> Schema {
        Schema::new("Forwards appliance logs to an external connection.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(Attribute::string("name").required().requires_replace())
            .attribute(
                Attribute::string("type")
                    .required()
                    .requires_replace()
                    .one_of(&FORWARDER_TYPES),
            )
            .attribute(
                Attribute::string("connection_id")
                    .required()
                    .description("Id or name of the connection logs are sent to."),
            )
            .attribute(
                Attribute::single_nested(
                    "elasticsearch_params",
                    vec![
                        Attribute::single_nested(
                            "indices",
                            vec![
                                Attribute::string("activity_kmip").optional(),
                                Attribute::string("activity_nae").optional(),
                                Attribute::string("client_audit").optional(),
                                Attribute::string("server_audit").optional(),
                            ],
                        )
                        .optional(),
                    ],
                )
                .optional(),
            )
            .attribute(
                Attribute::single_nested(
                    "loki_params",
                    vec![Attribute::map("labels", AttributeType::String).optional()],
                )
                .optional(),
            )
            .attribute(Attribute::string("created_at").computed().use_state_for_unknown())
            .attribute(Attribute::string("updated_at").computed())
    }

    fn validate(&self, config: &Value, diags: &mut Diagnostics) {
        let Some(forwarder_type) = config.get("type").and_then(|v| v.as_str()) else {
            return;
        };
        for (attr, owner) in [("elasticsearch_params", "elasticsearch"), ("loki_params", "loki")] {
            let set = config.get(attr).is_some_and(|v| !v.is_null());
            if set && forwarder_type != owner {
                diags.attribute_error(
                    vec![attr.to_string()],
                    "Unexpected forwarder parameters",
                    format!("{attr} can only be set when type is {owner}."),
                );
            }
        }
    }

    async fn create(
        &self,
        client: &CmClient,
        plan: LogForwarderState,
    ) -> Result<LogForwarderState, ProviderError> {
        let forwarder = client
            .create_log_forwarder(&plan.create_request())
            .await
            .or_diagnostic("Error creating log forwarder")?;
        info!(
            id = %forwarder.id,
            forwarder_type = %forwarder.forwarder_type,
            "Created log forwarder"
        );
        Ok(LogForwarderState::from_response(forwarder, &plan))
    }

    async fn read(
        &self,
        client: &CmClient,
        state: LogForwarderState,
    ) -> Result<Option<LogForwarderState>, ProviderError> {
        let id = require_id(&state.id, "log forwarder")?;
        let forwarder = client
            .get_log_forwarder(id)
            .await
            .found()
            .or_diagnostic("Error reading log forwarder")?;
        Ok(forwarder.map(|forwarder| LogForwarderState::from_response(forwarder, &state)))
    }

    async fn update(
        &self,
        client: &CmClient,
        prior: LogForwarderState,
        plan: LogForwarderState,
    ) -> Result<LogForwarderState, ProviderError> {
        let id = require_id(&prior.id, "log forwarder")?;
        let forwarder = client
            .update_log_forwarder(id, &plan.update_request())
            .await
            .or_diagnostic("Error updating log forwarder")?;
        Ok(LogForwarderState::from_response(forwarder, &plan))
    }

    async fn delete(
        &self,
        client: &CmClient,
        state: LogForwarderState,
    ) -> Result<(), ProviderError> {
        let id = require_id(&state.id, "log forwarder")?;
        ignore_not_found(client.delete_log_forwarder(id).await)
            .or_diagnostic("Error deleting log forwarder")?;
        info!(id, "Deleted log forwarder");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn elasticsearch_plan() -> LogForwarderState {
        LogForwarderState {
            name: Some("es".to_string()),
            forwarder_type: Some("elasticsearch".to_string()),
            connection_id: Some("es-conn".to_string()),
            elasticsearch_params: Some(ElasticsearchParamsModel {
                indices: Some(IndicesModel {
                    server_audit: Some("cm-server".to_string()),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_request_body() {
        assert_eq!(
            serde_json::to_value(elasticsearch_plan().create_request()).unwrap(),
            json!({
                "name": "es",
                "type": "elasticsearch",
                "connection_id": "es-conn",
                "elasticsearch_params": {"indices": {"server_audit": "cm-server"}}
            })
        );
    }

    #[test]
    fn test_from_response_only_keeps_planned_indices() {
        let forwarder: LogForwarder = serde_json::from_value(json!({
            "id": "lf-1",
            "name": "es",
            "type": "elasticsearch",
            "connection_id": "es-conn",
            "elasticsearch_params": {"indices": {
                "activity_kmip": "kmip-default",
                "server_audit": "cm-server-v2"
            }}
        }))
        .unwrap();

        let state = LogForwarderState::from_response(forwarder, &elasticsearch_plan());
        let indices = state.elasticsearch_params.unwrap().indices.unwrap();
        assert_eq!(indices.server_audit.as_deref(), Some("cm-server-v2"));
        assert_eq!(indices.activity_kmip, None);
        assert_eq!(state.loki_params, None);
    }

    #[test]
    fn test_state_uses_type_attribute() {
        let state = elasticsearch_plan();
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["type"], "elasticsearch");
    }

    #[test]
    fn test_params_must_match_type() {
        let config = Value::from_json(json!({
            "type": "loki",
            "elasticsearch_params": {"indices": null},
            "loki_params": {"labels": {"app": "cm"}}
        }));
        let mut diags = Diagnostics::new();
        LogForwarderResource.validate(&config, &mut diags);
        let paths: Vec<_> = diags.iter().filter_map(|d| d.attribute.clone()).collect();
        assert_eq!(paths, vec![vec!["elasticsearch_params".to_string()]]);
    }
}
