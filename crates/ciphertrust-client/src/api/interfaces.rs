// Network interface APIs, addressed by interface name

use crate::{
    CmClient,
    constants::api_path,
    error::Result,
    model::{Interface, InterfaceRequest},
};

impl CmClient {
    pub async fn create_interface(&self, request: &InterfaceRequest) -> Result<Interface> {
        self.post_json(api_path::INTERFACES, request).await
    }

    pub async fn get_interface(&self, name: &str) -> Result<Interface> {
        self.get(&format!("{}/{}", api_path::INTERFACES, name)).await
    }

    pub async fn update_interface(
        &self,
        name: &str,
        request: &InterfaceRequest,
    ) -> Result<Interface> {
        self.patch_json(&format!("{}/{}", api_path::INTERFACES, name), request)
            .await
    }

    pub async fn delete_interface(&self, name: &str) -> Result<()> {
        self.delete(&format!("{}/{}", api_path::INTERFACES, name))
            .await
    }
}
