// Certificate authority APIs

use crate::{
    CmClient,
    constants::api_path,
    error::Result,
    model::{
        CreateLocalCaRequest, LocalCa, LocalCaQuery, Page, SelfSignRequest, UpdateLocalCaRequest,
    },
};

impl CmClient {
    pub async fn list_local_cas(&self, query: &LocalCaQuery) -> Result<Page<LocalCa>> {
        self.get_with_query(api_path::LOCAL_CAS, query).await
    }

    pub async fn create_local_ca(&self, request: &CreateLocalCaRequest) -> Result<LocalCa> {
        self.post_json(api_path::LOCAL_CAS, request).await
    }

    pub async fn get_local_ca(&self, id: &str) -> Result<LocalCa> {
        self.get(&format!("{}/{}", api_path::LOCAL_CAS, id)).await
    }

    pub async fn update_local_ca(
        &self,
        id: &str,
        request: &UpdateLocalCaRequest,
    ) -> Result<LocalCa> {
        self.patch_json(&format!("{}/{}", api_path::LOCAL_CAS, id), request)
            .await
    }

    pub async fn delete_local_ca(&self, id: &str) -> Result<()> {
        self.delete(&format!("{}/{}", api_path::LOCAL_CAS, id)).await
    }

    /// Self-sign a pending local CA, activating it
    pub async fn self_sign_local_ca(&self, id: &str, request: &SelfSignRequest) -> Result<LocalCa> {
        self.post_json(&format!("{}/{}/self-sign", api_path::LOCAL_CAS, id), request)
            .await
    }
}
