// Cluster APIs
//
// Joining a node touches two appliances: the CSR and the final join go to the
// joining node, the signing goes to an existing member. Callers pass the
// client for the right node (see `CmClient::for_node`).

use tracing::info;

use crate::{
    CmClient,
    constants::api_path,
    error::Result,
    model::{
        AddNodeRequest, AddNodeResponse, ClusterNode, CsrRequest, CsrResponse,
        JoinClusterRequest, NewClusterRequest, Page,
    },
};

impl CmClient {
    /// Create a new cluster with this node as its first member
    pub async fn new_cluster(&self, request: &NewClusterRequest) -> Result<()> {
        info!("Creating cluster on {}", request.local_node_host);
        let _: serde_json::Value = self.post_json(api_path::CLUSTER_NEW, request).await?;
        Ok(())
    }

    /// Step 1 of a join, on the joining node: produce a CSR
    pub async fn cluster_csr(&self, request: &CsrRequest) -> Result<CsrResponse> {
        self.post_json(api_path::CLUSTER_CSR, request).await
    }

    /// Step 2 of a join, on an existing member: sign the joining node's CSR
    pub async fn add_cluster_node(&self, request: &AddNodeRequest) -> Result<AddNodeResponse> {
        self.post_json(api_path::CLUSTER_NODES, request).await
    }

    /// Step 3 of a join, on the joining node: install the certificate and join
    pub async fn join_cluster(&self, request: &JoinClusterRequest) -> Result<()> {
        info!(
            "Joining {} to cluster via {}",
            request.local_node_host, request.member_node_host
        );
        let _: serde_json::Value = self.post_json(api_path::CLUSTER_JOIN, request).await?;
        Ok(())
    }

    pub async fn list_cluster_nodes(&self) -> Result<Page<ClusterNode>> {
        self.get(api_path::CLUSTER_NODES).await
    }

    pub async fn delete_cluster_node(&self, id: &str) -> Result<()> {
        self.delete(&format!("{}/{}", api_path::CLUSTER_NODES, id))
            .await
    }
}
