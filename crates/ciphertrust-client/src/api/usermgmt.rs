// User management APIs: users, groups, group membership, password policies

use tracing::info;

use crate::{
    CmClient,
    constants::api_path,
    error::Result,
    model::{
        CreateGroupRequest, CreateUserRequest, Group, ListQuery, Page, PasswordPolicy,
        UpdateGroupRequest, UpdateUserRequest, User, UserQuery,
    },
};

impl CmClient {
    // ============================================================================
    // Users
    // ============================================================================

    pub async fn list_users(&self, query: &UserQuery) -> Result<Page<User>> {
        self.get_with_query(api_path::USERS, query).await
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User> {
        self.post_json(api_path::USERS, request).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.get(&format!("{}/{}", api_path::USERS, user_id)).await
    }

    pub async fn update_user(&self, user_id: &str, request: &UpdateUserRequest) -> Result<User> {
        self.patch_json(&format!("{}/{}", api_path::USERS, user_id), request)
            .await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.delete(&format!("{}/{}", api_path::USERS, user_id)).await
    }

    // ============================================================================
    // Groups
    // ============================================================================

    pub async fn list_groups(&self, query: &ListQuery) -> Result<Page<Group>> {
        self.get_with_query(api_path::GROUPS, query).await
    }

    pub async fn create_group(&self, request: &CreateGroupRequest) -> Result<Group> {
        self.post_json(api_path::GROUPS, request).await
    }

    pub async fn get_group(&self, name: &str) -> Result<Group> {
        self.get(&format!("{}/{}", api_path::GROUPS, name)).await
    }

    pub async fn update_group(&self, name: &str, request: &UpdateGroupRequest) -> Result<Group> {
        self.patch_json(&format!("{}/{}", api_path::GROUPS, name), request)
            .await
    }

    pub async fn delete_group(&self, name: &str) -> Result<()> {
        self.delete(&format!("{}/{}", api_path::GROUPS, name)).await
    }

    pub async fn add_user_to_group(&self, group: &str, user_id: &str) -> Result<()> {
        let _: serde_json::Value = self
            .post_empty(&format!("{}/{}/users/{}", api_path::GROUPS, group, user_id))
            .await?;
        Ok(())
    }

    pub async fn remove_user_from_group(&self, group: &str, user_id: &str) -> Result<()> {
        self.delete(&format!("{}/{}/users/{}", api_path::GROUPS, group, user_id))
            .await
    }

    // ============================================================================
    // Password policies
    // ============================================================================

    pub async fn get_password_policy(&self, name: &str) -> Result<PasswordPolicy> {
        self.get(&format!("{}/{}", api_path::PASSWORD_POLICIES, name))
            .await
    }

    pub async fn create_password_policy(&self, policy: &PasswordPolicy) -> Result<PasswordPolicy> {
        self.post_json(api_path::PASSWORD_POLICIES, policy).await
    }

    pub async fn update_password_policy(
        &self,
        name: &str,
        policy: &PasswordPolicy,
    ) -> Result<PasswordPolicy> {
        self.patch_json(&format!("{}/{}", api_path::PASSWORD_POLICIES, name), policy)
            .await
    }

    /// Update a password policy, creating it when the appliance does not know it yet
    pub async fn upsert_password_policy(
        &self,
        name: &str,
        policy: &PasswordPolicy,
    ) -> Result<PasswordPolicy> {
        match self.update_password_policy(name, policy).await {
            Err(e) if e.is_not_found() => {
                info!("Password policy {} not found, creating it", name);
                let policy = PasswordPolicy {
                    policy_name: Some(name.to_string()),
                    ..policy.clone()
                };
                self.create_password_policy(&policy).await
            }
            result => result,
        }
    }

    pub async fn delete_password_policy(&self, name: &str) -> Result<()> {
        self.delete(&format!("{}/{}", api_path::PASSWORD_POLICIES, name))
            .await
    }
}
