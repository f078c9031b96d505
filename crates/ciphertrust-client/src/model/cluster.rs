// Cluster model types

use serde::{Deserialize, Serialize};

/// Body of `POST /v1/cluster/new`, sent to the founding node
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClusterRequest {
    pub local_node_host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_node_port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_address: Option<String>,
}

/// Body of `POST /v1/cluster/csr`, sent to the joining node
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrRequest {
    pub local_node_host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_address: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CsrResponse {
    pub csr: String,
}

/// Body of `POST /v1/nodes`, sent to an existing member to sign the CSR
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNodeRequest {
    pub csr: String,
    pub new_node_host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_address: Option<String>,
    #[serde(rename = "shared_hsm_partition", skip_serializing_if = "Option::is_none")]
    pub shared_hsm_partition: Option<bool>,
}

/// Certificate material returned by the member for the joining node
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddNodeResponse {
    pub cert: String,
    pub cachain: String,
    pub mkek_blob: String,
}

/// Body of `POST /v1/cluster/join`, sent to the joining node
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinClusterRequest {
    pub cert: String,
    pub cachain: String,
    #[serde(rename = "mkek_blob")]
    pub mkek_blob: String,
    pub member_node_host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_node_port: Option<i64>,
    pub local_node_host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_node_port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_address: Option<String>,
    pub blocking: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeStatus {
    pub code: String,
    pub description: String,
}

/// Cluster member as listed by `GET /v1/nodes`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterNode {
    pub id: String,
    pub host: String,
    pub port: i64,
    pub public_address: String,
    pub status: Option<NodeStatus>,
    #[serde(rename = "this_node")]
    pub this_node: bool,
}
