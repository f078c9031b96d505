// Client management APIs

use crate::{
    CmClient,
    constants::api_path,
    error::Result,
    model::{CreateRegTokenRequest, RegToken},
};

impl CmClient {
    pub async fn create_reg_token(&self, request: &CreateRegTokenRequest) -> Result<RegToken> {
        self.post_json(api_path::REG_TOKENS, request).await
    }

    pub async fn get_reg_token(&self, id: &str) -> Result<RegToken> {
        self.get(&format!("{}/{}", api_path::REG_TOKENS, id)).await
    }

    pub async fn delete_reg_token(&self, id: &str) -> Result<()> {
        self.delete(&format!("{}/{}", api_path::REG_TOKENS, id))
            .await
    }
}
