// Syslog and log forwarder model types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of `POST /v1/configs/syslogs` and `PATCH /v1/configs/syslogs/{id}`
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyslogRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_format: Option<String>,
}

/// Syslog connection as returned by the appliance
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Syslog {
    pub id: String,
    pub host: String,
    pub port: i64,
    pub transport: String,
    pub ca_cert: String,
    pub message_format: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Elasticsearch index names per log category
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticsearchIndices {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_kmip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_nae: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_audit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_audit: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticsearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices: Option<ElasticsearchIndices>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LokiParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

/// Body of `POST /v1/configs/log-forwarders` and its PATCH
#[derive(Clone, Debug, Default, Serialize)]
pub struct LogForwarderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub forwarder_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elasticsearch_params: Option<ElasticsearchParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loki_params: Option<LokiParams>,
}

/// Log forwarder as returned by the appliance
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogForwarder {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub forwarder_type: String,
    pub connection_id: String,
    pub elasticsearch_params: Option<ElasticsearchParams>,
    pub loki_params: Option<LokiParams>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}
