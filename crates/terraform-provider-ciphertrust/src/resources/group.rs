//! `ciphertrust_cm_group`: user groups and their membership

use std::collections::BTreeSet;

use async_trait::async_trait;
use ciphertrust_client::constants::DEFAULT_PAGE_LIMIT;
use ciphertrust_client::model::{CreateGroupRequest, Group, UpdateGroupRequest, UserQuery};
use ciphertrust_client::{ClientError, CmClient};
use ciphertrust_plugin::{Attribute, AttributeType, ProviderError, Resource, ResultExt, Schema};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    NotFoundExt, computed_str, ignore_not_found, json_text, non_empty, parse_json, require_id,
};

pub struct GroupResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupState {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub user_ids: Option<Vec<String>>,
    /// JSON-encoded
    pub app_metadata: Option<String>,
    /// JSON-encoded
    pub user_metadata: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Users to add and to remove to get from `current` to `desired`
pub fn membership_changes(current: &[String], desired: &[String]) -> (Vec<String>, Vec<String>) {
    let current: BTreeSet<&String> = current.iter().collect();
    let desired: BTreeSet<&String> = desired.iter().collect();
    let add = desired.difference(&current).map(|s| s.to_string()).collect();
    let remove = current.difference(&desired).map(|s| s.to_string()).collect();
    (add, remove)
}

impl GroupState {
    pub fn create_request(&self) -> Result<CreateGroupRequest, ProviderError> {
        Ok(CreateGroupRequest {
            name: self.name.clone().unwrap_or_default(),
            description: self.description.clone(),
            app_metadata: parse_json("app_metadata", self.app_metadata.as_deref())?,
            user_metadata: parse_json("user_metadata", self.user_metadata.as_deref())?,
        })
    }

    pub fn update_request(&self) -> Result<UpdateGroupRequest, ProviderError> {
        Ok(UpdateGroupRequest {
            description: self.description.clone(),
            app_metadata: parse_json("app_metadata", self.app_metadata.as_deref())?,
            user_metadata: parse_json("user_metadata", self.user_metadata.as_deref())?,
        })
    }

    pub fn from_response(group: Group, user_ids: Vec<String>, planned: &GroupState) -> Self {
        let name = computed_str(group.name, planned.name.clone());
        GroupState {
            id: name.clone(),
            name,
            description: computed_str(group.description, planned.description.clone()),
            user_ids: Some(user_ids),
            app_metadata: json_text(group.app_metadata.as_ref(), planned.app_metadata.clone()),
            user_metadata: json_text(group.user_metadata.as_ref(), planned.user_metadata.clone()),
            created_at: non_empty(group.created_at),
            updated_at: non_empty(group.updated_at),
        }
    }
}

async fn group_members(client: &CmClient, group: &str) -> Result<Vec<String>, ClientError> {
    collect_members(client, group, DEFAULT_PAGE_LIMIT).await
}

async fn collect_members(
    client: &CmClient,
    group: &str,
    page_size: i64,
) -> Result<Vec<String>, ClientError> {
    let mut ids = Vec::new();
    loop {
        let query = UserQuery {
            groups: Some(group.to_string()),
            skip: Some(ids.len() as i64),
            limit: Some(page_size),
            ..Default::default()
        };
        let page = client.list_users(&query).await?;
        let fetched = page.resources.len() as i64;
        ids.extend(page.resources.into_iter().map(|u| u.user_id));
        // total is optional in some appliance versions
        let complete = page.total > 0 && ids.len() as i64 >= page.total;
        if fetched < page_size || complete {
            break;
        }
    }
    ids.sort();
    Ok(ids)
}

async fn apply_membership(
    client: &CmClient,
    group: &str,
    current: &[String],
    desired: &[String],
) -> Result<(), ProviderError> {
    let (add, remove) = membership_changes(current, desired);
    debug!(group, added = add.len(), removed = remove.len(), "Reconciling group membership");

    try_join_all(add.iter().map(|user| client.add_user_to_group(group, user)))
        .await
        .or_diagnostic("Error adding users to group")?;
    try_join_all(
        remove
            .iter()
            .map(|user| async move {
                ignore_not_found(client.remove_user_from_group(group, user).await)
            }),
    )
    .await
    .or_diagnostic("Error removing users from group")?;
    Ok(())
}

#[async_trait]
impl Resource for GroupResource {
    type Data = CmClient;
    type State = GroupState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_group"
    }

    fn schema(&self) -> Schema {
        Schema::new("User group.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(Attribute::string("name").required().requires_replace())
            .attribute(Attribute::string("description").optional().computed())
            .attribute(
                Attribute::set("user_ids", AttributeType::String)
                    .optional()
                    .computed()
                    .description("Ids of the users in the group."),
            )
            .attribute(Attribute::string("app_metadata").optional().computed())
            .attribute(Attribute::string("user_metadata").optional().computed())
            .attribute(Attribute::string("created_at").computed().use_state_for_unknown())
            .attribute(Attribute::string("updated_at").computed())
    }

    async fn create(
        &self,
        client: &CmClient,
        plan: GroupState,
    ) -> Result<GroupState, ProviderError> {
        let group = client
            .create_group(&plan.create_request()?)
            .await
            .or_diagnostic("Error creating group")?;
        info!(name = %group.name, "Created group");

        let desired = plan.user_ids.clone().unwrap_or_default();
        apply_membership(client, &group.name, &[], &desired).await?;
        let members = group_members(client, &group.name)
            .await
            .or_diagnostic("Error reading group members")?;
        Ok(GroupState::from_response(group, members, &plan))
    }

    async fn read(
        &self,
        client: &CmClient,
        state: GroupState,
    ) -> Result<Option<GroupState>, ProviderError> {
        let name = require_id(&state.id, "group")?;
        let Some(group) = client
            .get_group(name)
            .await
            .found()
            .or_diagnostic("Error reading group")?
        else {
            return Ok(None);
        };
        let members = group_members(client, name)
            .await
            .or_diagnostic("Error reading group members")?;
        Ok(Some(GroupState::from_response(group, members, &state)))
    }

    async fn update(
        &self,
        client: &CmClient,
        prior: GroupState,
        plan: GroupState,
    ) -> Result<GroupState, ProviderError> {
        let name = require_id(&prior.id, "group")?;
        let group = client
            .update_group(name, &plan.update_request()?)
            .await
            .or_diagnostic("Error updating group")?;

        if let Some(desired) = &plan.user_ids {
            let current = prior.user_ids.clone().unwrap_or_default();
            apply_membership(client, name, &current, desired).await?;
        }
        let members = group_members(client, name)
            .await
            .or_diagnostic("Error reading group members")?;
        Ok(GroupState::from_response(group, members, &plan))
    }

    async fn delete(&self, client: &CmClient, state: GroupState) -> Result<(), ProviderError> {
        let name = require_id(&state.id, "group")?;
        ignore_not_found(client.delete_group(name).await).or_diagnostic("Error deleting group")?;
        info!(name, "Deleted group");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_members_span_pages() {
        use ciphertrust_client::ClientConfig;
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/tokens"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"jwt": "jwt-1", "duration": 300})),
            )
            .mount(&server)
            .await;
        for (skip, users) in [("0", json!(["u3", "u1"])), ("2", json!(["u2"]))] {
            let resources: Vec<_> = users
                .as_array()
                .unwrap()
                .iter()
                .map(|id| json!({"user_id": id}))
                .collect();
            Mock::given(method("GET"))
                .and(path("/api/v1/usermgmt/users"))
                .and(query_param("groups", "auditors"))
                .and(query_param("skip", skip))
                .and(query_param("limit", "2"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"total": 3, "resources": resources})),
                )
                .expect(1)
                .mount(&server)
                .await;
        }

        let config = ClientConfig::new(&server.uri()).with_auth("admin", "secret");
        let client = CmClient::new(config).unwrap();
        let members = collect_members(&client, "auditors", 2).await.unwrap();
        assert_eq!(members, ids(&["u1", "u2", "u3"]));
    }

    #[test]
    fn test_membership_changes() {
        let (add, remove) =
            membership_changes(&ids(&["u1", "u2", "u3"]), &ids(&["u3", "u4", "u1"]));
        assert_eq!(add, ids(&["u4"]));
        assert_eq!(remove, ids(&["u2"]));

        let (add, remove) = membership_changes(&[], &ids(&["u1", "u1"]));
        assert_eq!(add, ids(&["u1"]));
        assert!(remove.is_empty());
    }

    #[test]
    fn test_create_request_body() {
        let plan = GroupState {
            name: Some("auditors".to_string()),
            description: Some("read-only".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(plan.create_request().unwrap()).unwrap(),
            json!({"name": "auditors", "description": "read-only"})
        );
    }

    #[test]
    fn test_from_response_id_is_name() {
        let group: Group =
            serde_json::from_value(json!({"name": "auditors", "created_at": "2024-01-01"})).unwrap();
        let state = GroupState::from_response(group, ids(&["u1"]), &GroupState::default());
        assert_eq!(state.id.as_deref(), Some("auditors"));
        assert_eq!(state.user_ids, Some(ids(&["u1"])));
        assert_eq!(state.description, None);
    }
}
