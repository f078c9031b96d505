//! `ciphertrust_cm_user`: local users
//!
//! The password is never returned by the appliance; the configured value is
//! kept in state and only sent again when it changes.

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{CreateUserRequest, UpdateUserRequest, User};
use ciphertrust_plugin::{Attribute, ProviderError, Resource, ResultExt, Schema};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    NotFoundExt, computed_str, ignore_not_found, json_text, non_empty, parse_json, require_id,
};

pub struct UserResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub id: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub is_domain_user: Option<bool>,
    pub prevent_ui_login: Option<bool>,
    pub password_change_required: Option<bool>,
    /// JSON-encoded
    pub user_metadata: Option<String>,
    /// JSON-encoded
    pub app_metadata: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub last_login: Option<String>,
    pub logins_count: Option<i64>,
}

impl UserState {
    pub fn create_request(&self) -> Result<CreateUserRequest, ProviderError> {
        Ok(CreateUserRequest {
            username: self.username.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
            name: self.name.clone(),
            email: self.email.clone(),
            is_domain_user: self.is_domain_user,
            prevent_ui_login: self.prevent_ui_login,
            password_change_required: self.password_change_required,
            user_metadata: parse_json("user_metadata", self.user_metadata.as_deref())?,
            app_metadata: parse_json("app_metadata", self.app_metadata.as_deref())?,
        })
    }

    /// Username and password are only sent when they changed
    pub fn update_request(&self, prior: &UserState) -> Result<UpdateUserRequest, ProviderError> {
        let changed = |planned: &Option<String>, prior: &Option<String>| {
            planned.clone().filter(|value| Some(value) != prior.as_ref())
        };

        Ok(UpdateUserRequest {
            username: changed(&self.username, &prior.username),
            password: changed(&self.password, &prior.password),
            name: self.name.clone(),
            email: self.email.clone(),
            prevent_ui_login: self.prevent_ui_login,
            password_change_required: self.password_change_required,
            user_metadata: parse_json("user_metadata", self.user_metadata.as_deref())?,
        })
    }

    pub fn from_response(user: User, planned: &UserState) -> Self {
        UserState {
            id: non_empty(user.user_id),
            username: computed_str(user.username, planned.username.clone()),
            password: planned.password.clone(),
            name: computed_str(user.name, planned.name.clone()),
            email: computed_str(user.email, planned.email.clone()),
            nickname: non_empty(user.nickname),
            is_domain_user: Some(user.is_domain_user),
            prevent_ui_login: Some(user.prevent_ui_login),
            password_change_required: Some(user.password_change_required),
            user_metadata: json_text(user.user_metadata.as_ref(), planned.user_metadata.clone()),
            app_metadata: json_text(user.app_metadata.as_ref(), planned.app_metadata.clone()),
            created_at: non_empty(user.created_at),
            updated_at: non_empty(user.updated_at),
            last_login: user.last_login.and_then(non_empty),
            logins_count: Some(user.logins_count),
        }
    }
}

#[async_trait]
impl Resource for UserResource {
    type Data = CmClient;
    type State = UserState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_user"
    }

    fn schema(&self) -> Schema {
        Schema::new("CipherTrust Manager user.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(Attribute::string("username").required())
            .attribute(Attribute::string("password").required().sensitive())
            .attribute(Attribute::string("name").optional().computed())
            .attribute(Attribute::string("email").optional().computed())
            .attribute(Attribute::string("nickname").computed())
            .attribute(
                Attribute::bool("is_domain_user")
                    .optional()
                    .computed()
                    .requires_replace(),
            )
            .attribute(Attribute::bool("prevent_ui_login").optional().computed())
            .attribute(Attribute::bool("password_change_required").optional().computed())
            .attribute(
                Attribute::string("user_metadata")
                    .optional()
                    .computed()
                    .description("JSON-encoded metadata editable by the user."),
            )
            .attribute(
                Attribute::string("app_metadata")
                    .optional()
                    .computed()
                    .requires_replace()
                    .description("JSON-encoded application metadata, set on creation only."),
            )
            .attribute(Attribute::string("created_at").computed().use_state_for_unknown())
            .attribute(Attribute::string("updated_at").computed())
            .attribute(Attribute::string("last_login").computed())
            .attribute(Attribute::number("logins_count").computed())
    }

    async fn create(&self, client: &CmClient, plan: UserState) -> Result<UserState, ProviderError> {
        let user = client
            .create_user(&plan.create_request()?)
            .await
            .or_diagnostic("Error creating user")?;
        info!(id = %user.user_id, username = %user.username, "Created user");
        Ok(UserState::from_response(user, &plan))
    }

    async fn read(
        &self,
        client: &CmClient,
        state: UserState,
    ) -> Result<Option<UserState>, ProviderError> {
        let id = require_id(&state.id, "user")?;
        let user = client
            .get_user(id)
            .await
            .found()
            .or_diagnostic("Error reading user")?;
        Ok(user.map(|user| UserState::from_response(user, &state)))
    }

    async fn update(
        &self,
        client: &CmClient,
        prior: UserState,
        plan: UserState,
    ) -> Result<UserState, ProviderError> {
        let id = require_id(&prior.id, "user")?;
        let user = client
            .update_user(id, &plan.update_request(&prior)?)
            .await
            .or_diagnostic("Error updating user")?;
        Ok(UserState::from_response(user, &plan))
    }

    async fn delete(&self, client: &CmClient, state: UserState) -> Result<(), ProviderError> {
        let id = require_id(&state.id, "user")?;
        ignore_not_found(client.delete_user(id).await).or_diagnostic("Error deleting user")?;
        info!(id, "Deleted user");
        Ok(())
    }
}
