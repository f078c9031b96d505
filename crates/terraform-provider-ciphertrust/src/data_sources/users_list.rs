//! `ciphertrust_cm_users_list`

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{User, UserQuery};
use ciphertrust_plugin::{Attribute, DataSource, ProviderError, ResultExt, Schema};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{limit_attribute, page_limit};
use crate::resources::non_empty;

pub struct UsersListDataSource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub is_domain_user: Option<bool>,
    pub prevent_ui_login: Option<bool>,
    pub last_login: Option<String>,
    pub logins_count: Option<i64>,
    pub created_at: Option<String>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        UserSummary {
            user_id: non_empty(user.user_id),
            username: non_empty(user.username),
            name: non_empty(user.name),
            email: non_empty(user.email),
            nickname: non_empty(user.nickname),
            is_domain_user: Some(user.is_domain_user),
            prevent_ui_login: Some(user.prevent_ui_login),
            last_login: user.last_login.and_then(non_empty),
            logins_count: Some(user.logins_count),
            created_at: non_empty(user.created_at),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsersListState {
    pub username: Option<String>,
    pub email: Option<String>,
    pub group: Option<String>,
    pub limit: Option<i64>,
    pub users: Option<Vec<UserSummary>>,
}

impl UsersListState {
    pub fn query(&self) -> UserQuery {
        UserQuery {
            username: self.username.clone(),
            email: self.email.clone(),
            groups: self.group.clone(),
            skip: None,
            limit: Some(page_limit(self.limit)),
        }
    }
}

#[async_trait]
impl DataSource for UsersListDataSource {
    type Data = CmClient;
    type State = UsersListState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_users_list"
    }

    fn schema(&self) -> Schema {
        let summary = vec![
            Attribute::string("user_id").computed(),
            Attribute::string("username").computed(),
            Attribute::string("name").computed(),
            Attribute::string("email").computed(),
            Attribute::string("nickname").computed(),
            Attribute::bool("is_domain_user").computed(),
            Attribute::bool("prevent_ui_login").computed(),
            Attribute::string("last_login").computed(),
            Attribute::number("logins_count").computed(),
            Attribute::string("created_at").computed(),
        ];
        Schema::new("Users, optionally filtered by name, email or group.")
            .attribute(Attribute::string("username").optional())
            .attribute(Attribute::string("email").optional())
            .attribute(Attribute::string("group").optional())
            .attribute(limit_attribute())
            .attribute(Attribute::list_nested("users", summary).computed())
    }

    async fn read(
        &self,
        client: &CmClient,
        config: UsersListState,
    ) -> Result<UsersListState, ProviderError> {
        let page = client
            .list_users(&config.query())
            .await
            .or_diagnostic("Error listing users")?;
        debug!(total = page.total, "Listed users");
        Ok(UsersListState {
            users: Some(page.resources.into_iter().map(UserSummary::from).collect()),
            ..config
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_maps_group_filter() {
        let config = UsersListState {
            group: Some("admin".to_string()),
            limit: Some(10),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(config.query()).unwrap(),
            json!({"groups": "admin", "limit": 10})
        );
    }

    #[test]
    fn test_summary_from_response() {
        let user: User = serde_json::from_value(json!({
            "user_id": "local|1",
            "username": "alice",
            "logins_count": 3,
            "last_login": ""
        }))
        .unwrap();
        let summary = UserSummary::from(user);
        assert_eq!(summary.username.as_deref(), Some("alice"));
        assert_eq!(summary.logins_count, Some(3));
        assert_eq!(summary.last_login, None);
        assert_eq!(summary.email, None);
    }
}
