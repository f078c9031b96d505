// Key vault APIs

use crate::{
    CmClient,
    constants::api_path,
    error::Result,
    model::{CreateKeyRequest, Key, ListQuery, Page, UpdateKeyRequest},
};

impl CmClient {
    pub async fn list_keys(&self, query: &ListQuery) -> Result<Page<Key>> {
        self.get_with_query(api_path::KEYS, query).await
    }

    pub async fn create_key(&self, request: &CreateKeyRequest) -> Result<Key> {
        self.post_json(api_path::KEYS, request).await
    }

    pub async fn get_key(&self, id: &str) -> Result<Key> {
        self.get(&format!("{}/{}", api_path::KEYS, id)).await
    }

    pub async fn update_key(&self, id: &str, request: &UpdateKeyRequest) -> Result<Key> {
        self.patch_json(&format!("{}/{}", api_path::KEYS, id), request)
            .await
    }

    pub async fn delete_key(&self, id: &str) -> Result<()> {
        self.delete(&format!("{}/{}", api_path::KEYS, id)).await
    }
}
