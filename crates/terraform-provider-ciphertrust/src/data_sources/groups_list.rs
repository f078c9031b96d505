//! `ciphertrust_cm_groups_list`

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{Group, ListQuery};
use ciphertrust_plugin::{Attribute, DataSource, ProviderError, ResultExt, Schema};
use serde::{Deserialize, Serialize};

use super::{limit_attribute, page_limit};
use crate::resources::non_empty;

pub struct GroupsListDataSource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Group> for GroupSummary {
    fn from(group: Group) -> Self {
        GroupSummary {
            name: non_empty(group.name),
            description: non_empty(group.description),
            created_at: non_empty(group.created_at),
            updated_at: non_empty(group.updated_at),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupsListState {
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub groups: Option<Vec<GroupSummary>>,
}

#[async_trait]
impl DataSource for GroupsListDataSource {
    type Data = CmClient;
    type State = GroupsListState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_groups_list"
    }

    fn schema(&self) -> Schema {
        Schema::new("User groups, optionally filtered by name.")
            .attribute(Attribute::string("name").optional())
            .attribute(limit_attribute())
            .attribute(
                Attribute::list_nested(
                    "groups",
                    vec![
                        Attribute::string("name").computed(),
                        Attribute::string("description").computed(),
                        Attribute::string("created_at").computed(),
                        Attribute::string("updated_at").computed(),
                    ],
                )
                .computed(),
            )
    }

    async fn read(
        &self,
        client: &CmClient,
        config: GroupsListState,
    ) -> Result<GroupsListState, ProviderError> {
        let query = ListQuery::named(config.name.as_deref(), page_limit(config.limit));
        let page = client
            .list_groups(&query)
            .await
            .or_diagnostic("Error listing groups")?;
        Ok(GroupsListState {
            groups: Some(page.resources.into_iter().map(GroupSummary::from).collect()),
            ..config
        })
    }
}
