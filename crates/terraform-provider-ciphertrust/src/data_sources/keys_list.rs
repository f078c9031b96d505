//! `ciphertrust_cm_keys_list`

use std::collections::BTreeMap;

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{Key, ListQuery};
use ciphertrust_plugin::{Attribute, AttributeType, DataSource, ProviderError, ResultExt, Schema};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{limit_attribute, page_limit};
use crate::resources::non_empty;

pub struct KeysListDataSource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeySummary {
    pub id: Option<String>,
    pub name: Option<String>,
    pub algorithm: Option<String>,
    pub size: Option<i64>,
    pub usage_mask: Option<i64>,
    pub version: Option<i64>,
    pub state: Option<String>,
    pub object_type: Option<String>,
    pub labels: Option<BTreeMap<String, String>>,
    pub uri: Option<String>,
    pub created_at: Option<String>,
}

impl From<Key> for KeySummary {
    fn from(key: Key) -> Self {
        KeySummary {
            id: non_empty(key.id),
            name: non_empty(key.name),
            algorithm: non_empty(key.algorithm),
            size: (key.size > 0).then_some(key.size),
            usage_mask: Some(key.usage_mask),
            version: Some(key.version),
            state: non_empty(key.state),
            object_type: non_empty(key.object_type),
            labels: key.labels.filter(|labels| !labels.is_empty()),
            uri: non_empty(key.uri),
            created_at: non_empty(key.created_at),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeysListState {
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub keys: Option<Vec<KeySummary>>,
}

#[async_trait]
impl DataSource for KeysListDataSource {
    type Data = CmClient;
    type State = KeysListState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_keys_list"
    }

    fn schema(&self) -> Schema {
        let summary = vec![
            Attribute::string("id").computed(),
            Attribute::string("name").computed(),
            Attribute::string("algorithm").computed(),
            Attribute::number("size").computed(),
            Attribute::number("usage_mask").computed(),
            Attribute::number("version").computed(),
            Attribute::string("state").computed(),
            Attribute::string("object_type").computed(),
            Attribute::map("labels", AttributeType::String).computed(),
            Attribute::string("uri").computed(),
            Attribute::string("created_at").computed(),
        ];
        Schema::new("Keys in the vault, optionally filtered by name.")
            .attribute(Attribute::string("name").optional())
            .attribute(limit_attribute())
            .attribute(Attribute::list_nested("keys", summary).computed())
    }

    async fn read(
        &self,
        client: &CmClient,
        config: KeysListState,
    ) -> Result<KeysListState, ProviderError> {
        let query = ListQuery::named(config.name.as_deref(), page_limit(config.limit));
        let page = client
            .list_keys(&query)
            .await
            .or_diagnostic("Error listing keys")?;
        debug!(total = page.total, "Listed keys");
        Ok(KeysListState {
            keys: Some(page.resources.into_iter().map(KeySummary::from).collect()),
            ..config
        })
    }
}
