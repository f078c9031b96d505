//! `ciphertrust_cm_local_ca_list`

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::{LocalCa, LocalCaQuery};
use ciphertrust_plugin::{Attribute, DataSource, ProviderError, ResultExt, Schema};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{limit_attribute, page_limit};
use crate::resources::non_empty;

pub struct LocalCaListDataSource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalCaSummary {
    pub id: Option<String>,
    pub name: Option<String>,
    pub state: Option<String>,
    pub subject: Option<String>,
    pub issuer: Option<String>,
    pub serial_number: Option<String>,
    pub not_before: Option<String>,
    pub not_after: Option<String>,
    pub cert: Option<String>,
    pub sha256_fingerprint: Option<String>,
    pub created_at: Option<String>,
}

impl From<LocalCa> for LocalCaSummary {
    fn from(ca: LocalCa) -> Self {
        LocalCaSummary {
            id: non_empty(ca.id),
            name: non_empty(ca.name),
            state: non_empty(ca.state),
            subject: non_empty(ca.subject),
            issuer: non_empty(ca.issuer),
            serial_number: non_empty(ca.serial_number),
            not_before: non_empty(ca.not_before),
            not_after: non_empty(ca.not_after),
            cert: non_empty(ca.cert),
            sha256_fingerprint: non_empty(ca.sha256_fingerprint),
            created_at: non_empty(ca.created_at),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalCaListState {
    pub subject: Option<String>,
    pub issuer: Option<String>,
    pub state: Option<String>,
    pub limit: Option<i64>,
    pub cas: Option<Vec<LocalCaSummary>>,
}

impl LocalCaListState {
    pub fn query(&self) -> LocalCaQuery {
        LocalCaQuery {
            subject: self.subject.clone(),
            issuer: self.issuer.clone(),
            state: self.state.clone(),
            cert: None,
            limit: Some(page_limit(self.limit)),
        }
    }
}

#[async_trait]
impl DataSource for LocalCaListDataSource {
    type Data = CmClient;
    type State = LocalCaListState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_local_ca_list"
    }

    fn schema(&self) -> Schema {
        let summary = vec![
            Attribute::string("id").computed(),
            Attribute::string("name").computed(),
            Attribute::string("state").computed(),
            Attribute::string("subject").computed(),
            Attribute::string("issuer").computed(),
            Attribute::string("serial_number").computed(),
            Attribute::string("not_before").computed(),
            Attribute::string("not_after").computed(),
            Attribute::string("cert").computed(),
            Attribute::string("sha256_fingerprint").computed(),
            Attribute::string("created_at").computed(),
        ];
        Schema::new("Local CAs, optionally filtered.")
            .attribute(Attribute::string("subject").optional())
            .attribute(Attribute::string("issuer").optional())
            .attribute(
                Attribute::string("state")
                    .optional()
                    .one_of(&["pending", "active", "expired"]),
            )
            .attribute(limit_attribute())
            .attribute(Attribute::list_nested("cas", summary).computed())
    }

    async fn read(
        &self,
        client: &CmClient,
        config: LocalCaListState,
    ) -> Result<LocalCaListState, ProviderError> {
        let page = client
            .list_local_cas(&config.query())
            .await
            .or_diagnostic("Error listing local CAs")?;
        debug!(total = page.total, returned = page.resources.len(), "Listed local CAs");
        Ok(LocalCaListState {
            cas: Some(page.resources.into_iter().map(LocalCaSummary::from).collect()),
            ..config
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query() {
        let config = LocalCaListState {
            state: Some("active".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(config.query()).unwrap(),
            json!({"state": "active", "limit": 1000})
        );
    }

    #[test]
    fn test_summary_from_response() {
        let ca: LocalCa = serde_json::from_value(json!({
            "id": "ca-1",
            "name": "root",
            "state": "active",
            "subject": "/CN=root",
            "sha256Fingerprint": "AB12"
        }))
        .unwrap();
        let summary = LocalCaSummary::from(ca);
        assert_eq!(summary.sha256_fingerprint.as_deref(), Some("AB12"));
        assert_eq!(summary.issuer, None);
    }
}
