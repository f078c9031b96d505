// Domain APIs

use crate::{
    CmClient,
    constants::api_path,
    error::Result,
    model::{CreateDomainRequest, Domain, UpdateDomainRequest},
};

impl CmClient {
    pub async fn create_domain(&self, request: &CreateDomainRequest) -> Result<Domain> {
        self.post_json(api_path::DOMAINS, request).await
    }

    pub async fn get_domain(&self, id: &str) -> Result<Domain> {
        self.get(&format!("{}/{}", api_path::DOMAINS, id)).await
    }

    pub async fn update_domain(&self, id: &str, request: &UpdateDomainRequest) -> Result<Domain> {
        self.patch_json(&format!("{}/{}", api_path::DOMAINS, id), request)
            .await
    }

    pub async fn delete_domain(&self, id: &str) -> Result<()> {
        self.delete(&format!("{}/{}", api_path::DOMAINS, id)).await
    }
}
