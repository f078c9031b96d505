//! `ciphertrust_cm_cluster`: appliance clustering
//!
//! The node flagged `original` founds the cluster. Every other node joins in
//! three steps: it generates a CSR, the original node signs it and the
//! joining node installs the result and joins. Joins run one at a time and
//! a failure leaves earlier nodes in the cluster.

use std::collections::BTreeMap;

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{
    AddNodeRequest, ClusterNode, CsrRequest, JoinClusterRequest, NewClusterRequest,
};
use ciphertrust_plugin::{
    Attribute, AttributeType, Diagnostics, ProviderError, Resource, ResultExt, Schema, Value,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::ignore_not_found;

pub struct ClusterResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeModel {
    pub host: Option<String>,
    pub port: Option<i64>,
    pub public_address: Option<String>,
    pub original: Option<bool>,
}

impl NodeModel {
    fn host(&self) -> &str {
        self.host.as_deref().unwrap_or_default()
    }

    fn is_original(&self) -> bool {
        self.original.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterState {
    pub id: Option<String>,
    pub nodes: Option<Vec<NodeModel>>,
    /// Host to cluster node id
    pub node_ids: Option<BTreeMap<String, String>>,
}

impl ClusterState {
    fn nodes(&self) -> &[NodeModel] {
        self.nodes.as_deref().unwrap_or_default()
    }

    fn original(&self) -> Result<&NodeModel, ProviderError> {
        self.nodes()
            .iter()
            .find(|n| n.is_original())
            .ok_or_else(|| {
                ProviderError::new("Invalid cluster", "exactly one node must have original = true")
                    .at("nodes")
            })
    }
}

/// Client for the node at `host`, using the provider's URL scheme and port
fn node_client(client: &CmClient, host: &str) -> CmClient {
    client.for_node(&client.config().node_address(host))
}

async fn found_cluster(client: &CmClient, node: &NodeModel) -> Result<(), ProviderError> {
    let request = NewClusterRequest {
        local_node_host: node.host().to_string(),
        local_node_port: node.port,
        public_address: node.public_address.clone(),
    };
    node_client(client, node.host())
        .new_cluster(&request)
        .await
        .or_diagnostic("Error creating cluster")
}

/// CSR on the joining node, signature on the original, then join
async fn join_node(
    client: &CmClient,
    original: &NodeModel,
    node: &NodeModel,
) -> Result<(), ProviderError> {
    let host = node.host();
    let member = node_client(client, original.host());
    let joining = node_client(client, host);

    let csr = joining
        .cluster_csr(&CsrRequest {
            local_node_host: host.to_string(),
            public_address: node.public_address.clone(),
        })
        .await
        .or_diagnostic(&format!("Error generating cluster CSR on {host}"))?;

    let signed = member
        .add_cluster_node(&AddNodeRequest {
            csr: csr.csr,
            new_node_host: host.to_string(),
            public_address: node.public_address.clone(),
            shared_hsm_partition: None,
        })
        .await
        .or_diagnostic(&format!("Error adding {host} to the cluster"))?;

    joining
        .join_cluster(&JoinClusterRequest {
            cert: signed.cert,
            cachain: signed.cachain,
            mkek_blob: signed.mkek_blob,
            member_node_host: original.host().to_string(),
            member_node_port: original.port,
            local_node_host: host.to_string(),
            local_node_port: node.port,
            public_address: node.public_address.clone(),
            blocking: true,
        })
        .await
        .or_diagnostic(&format!("Error joining {host} to the cluster"))?;

    info!(host, member = original.host(), "Node joined cluster");
    Ok(())
}

async fn list_members(
    client: &CmClient,
    original: &str,
) -> Result<Vec<ClusterNode>, ProviderError> {
    let page = node_client(client, original)
        .list_cluster_nodes()
        .await
        .or_diagnostic("Error listing cluster nodes")?;
    Ok(page.resources)
}

/// Rebuild the state from the members the appliance reports
///
/// Configured nodes that are no longer members drop out; on import every
/// member is taken as reported.
pub fn state_from_members(
    original: &str,
    members: &[ClusterNode],
    prior: &ClusterState,
) -> ClusterState {
    let node_ids: BTreeMap<String, String> = members
        .iter()
        .map(|m| (m.host.clone(), m.id.clone()))
        .collect();

    let nodes = match &prior.nodes {
        Some(nodes) => nodes
            .iter()
            .filter(|n| node_ids.contains_key(n.host()))
            .cloned()
            .collect(),
        None => members
            .iter()
            .map(|m| NodeModel {
                host: Some(m.host.clone()),
                port: (m.port > 0).then_some(m.port),
                public_address: (!m.public_address.is_empty()).then(|| m.public_address.clone()),
                original: Some(m.host == original),
            })
            .collect(),
    };

    ClusterState {
        id: Some(original.to_string()),
        nodes: Some(nodes),
        node_ids: Some(node_ids),
    }
}

#[async_trait]
impl Resource for ClusterResource {
    type Data = CmClient;
    type State = ClusterState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_cluster"
    }

    fn schema(&self) -> Schema {
        Schema::new("Cluster of CipherTrust Manager appliances.")
            .attribute(
                Attribute::string("id")
                    .computed()
                    .use_state_for_unknown()
                    .description("Host of the original node."),
            )
            .attribute(
                Attribute::list_nested(
                    "nodes",
                    vec![
                        Attribute::string("host")
                            .required()
                            .description("Address other nodes reach this node on."),
                        Attribute::number("port").optional(),
                        Attribute::string("public_address").optional(),
                        Attribute::bool("original")
                            .optional()
                            .description("Whether this node founds the cluster."),
                    ],
                )
                .required(),
            )
            .attribute(
                Attribute::map("node_ids", AttributeType::String)
                    .computed()
                    .description("Cluster node id by host."),
            )
    }

    fn validate(&self, config: &Value, diags: &mut Diagnostics) {
        let Some(Value::List(nodes)) = config.get("nodes") else {
            return;
        };
        if nodes.iter().any(|n| n.get("original").is_some_and(Value::is_unknown)) {
            return;
        }
        let originals = nodes
            .iter()
            .filter(|n| matches!(n.get("original"), Some(Value::Bool(true))))
            .count();
        if originals != 1 {
            diags.attribute_error(
                vec!["nodes".to_string()],
                "Invalid cluster",
                format!("exactly one node must have original = true, found {originals}"),
            );
        }
    }

    async fn create(
        &self,
        client: &CmClient,
        plan: ClusterState,
    ) -> Result<ClusterState, ProviderError> {
        let original = plan.original()?;
        found_cluster(client, original).await?;
        info!(host = original.host(), "Cluster created");

        for node in plan.nodes().iter().filter(|n| !n.is_original()) {
            join_node(client, original, node).await?;
        }

        let members = list_members(client, original.host()).await?;
        Ok(state_from_members(original.host(), &members, &plan))
    }

    async fn read(
        &self,
        client: &CmClient,
        state: ClusterState,
    ) -> Result<Option<ClusterState>, ProviderError> {
        let original = match state.original() {
            Ok(node) => node.host().to_string(),
            Err(_) => match &state.id {
                Some(id) => id.clone(),
                None => return Ok(None),
            },
        };

        let members = list_members(client, &original).await?;
        if members.is_empty() {
            return Ok(None);
        }
        Ok(Some(state_from_members(&original, &members, &state)))
    }

    async fn update(
        &self,
        client: &CmClient,
        prior: ClusterState,
        plan: ClusterState,
    ) -> Result<ClusterState, ProviderError> {
        let original = plan.original()?;
        if let Ok(prior_original) = prior.original()
            && prior_original.host() != original.host()
        {
            return Err(ProviderError::new(
                "Cannot change the original node",
                format!(
                    "the cluster was founded by {}; replace the resource to found it on {}",
                    prior_original.host(),
                    original.host()
                ),
            )
            .at("nodes"));
        }

        let prior_hosts: Vec<&str> = prior.nodes().iter().map(NodeModel::host).collect();
        let planned_hosts: Vec<&str> = plan.nodes().iter().map(NodeModel::host).collect();
        let node_ids = prior.node_ids.clone().unwrap_or_default();
        let member = node_client(client, original.host());

        for node in prior.nodes().iter().filter(|n| !planned_hosts.contains(&n.host())) {
            match node_ids.get(node.host()) {
                Some(id) => {
                    ignore_not_found(member.delete_cluster_node(id).await)
                        .or_diagnostic(&format!(
                            "Error removing {} from the cluster",
                            node.host()
                        ))?;
                    info!(host = node.host(), "Node removed from cluster");
                }
                None => warn!(host = node.host(), "No node id recorded, skipping removal"),
            }
        }

        for node in plan
            .nodes()
            .iter()
            .filter(|n| !n.is_original() && !prior_hosts.contains(&n.host()))
        {
            join_node(client, original, node).await?;
        }

        let members = list_members(client, original.host()).await?;
        Ok(state_from_members(original.host(), &members, &plan))
    }

    async fn delete(&self, client: &CmClient, state: ClusterState) -> Result<(), ProviderError> {
        let Ok(original) = state.original() else {
            return Ok(());
        };
        let member = node_client(client, original.host());
        let node_ids = state.node_ids.clone().unwrap_or_default();

        for node in state.nodes().iter().filter(|n| !n.is_original()) {
            if let Some(id) = node_ids.get(node.host()) {
                ignore_not_found(member.delete_cluster_node(id).await)
                    .or_diagnostic(&format!("Error removing {} from the cluster", node.host()))?;
            }
        }
        info!(host = original.host(), "Cluster reduced to the original node");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(host: &str, original: bool) -> NodeModel {
        NodeModel {
            host: Some(host.to_string()),
            original: Some(original),
            ..Default::default()
        }
    }

    fn members() -> Vec<ClusterNode> {
        serde_json::from_value(json!([
            {"id": "n1", "host": "10.0.0.1", "port": 5432, "this_node": true},
            {"id": "n2", "host": "10.0.0.2", "port": 5432, "publicAddress": "cm2.example.com"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_state_keeps_configured_members() {
        let prior = ClusterState {
            nodes: Some(vec![
                node("10.0.0.1", true),
                node("10.0.0.2", false),
                node("10.0.0.3", false),
            ]),
            ..Default::default()
        };
        let state = state_from_members("10.0.0.1", &members(), &prior);
        assert_eq!(state.id.as_deref(), Some("10.0.0.1"));
        assert_eq!(
            state.nodes,
            Some(vec![node("10.0.0.1", true), node("10.0.0.2", false)])
        );
        assert_eq!(state.node_ids.unwrap()["10.0.0.2"], "n2");
    }

    #[test]
    fn test_import_takes_members() {
        let state = state_from_members("10.0.0.1", &members(), &ClusterState::default());
        let nodes = state.nodes.unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].original, Some(true));
        assert_eq!(nodes[1].public_address.as_deref(), Some("cm2.example.com"));
        assert_eq!(nodes[1].port, Some(5432));
    }

    #[test]
    fn test_exactly_one_original() {
        let mut diags = Diagnostics::new();
        let config = Value::from_json(json!({
            "nodes": [{"host": "a", "original": true}, {"host": "b", "original": true}]
        }));
        Resource::validate(&ClusterResource, &config, &mut diags);
        assert!(diags.has_errors());

        let mut diags = Diagnostics::new();
        let config = Value::from_json(json!({
            "nodes": [{"host": "a", "original": true}, {"host": "b", "original": null}]
        }));
        Resource::validate(&ClusterResource, &config, &mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_node_client_keeps_scheme_and_port() {
        let client =
            CmClient::new(ciphertrust_client::ClientConfig::new("http://127.0.0.1:9000")).unwrap();
        assert_eq!(node_client(&client, "10.0.0.2").config().address, "http://10.0.0.2:9000");
        assert_eq!(
            node_client(&client, "10.0.0.2:9443").config().address,
            "http://10.0.0.2:9443"
        );

        let client =
            CmClient::new(ciphertrust_client::ClientConfig::new("cm.example.com")).unwrap();
        assert_eq!(node_client(&client, "10.0.0.2").config().address, "https://10.0.0.2");
    }
}
