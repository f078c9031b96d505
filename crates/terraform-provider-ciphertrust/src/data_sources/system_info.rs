//! `ciphertrust_cm_system_info`

use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_client::model::SystemInfo;
use ciphertrust_plugin::{Attribute, DataSource, ProviderError, ResultExt, Schema};
use serde::{Deserialize, Serialize};

use crate::resources::non_empty;

pub struct SystemInfoDataSource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemInfoState {
    pub name: Option<String>,
    pub version: Option<String>,
    pub model: Option<String>,
    pub vendor: Option<String>,
    pub crypto_version: Option<String>,
    pub uptime: Option<String>,
}

impl From<SystemInfo> for SystemInfoState {
    fn from(info: SystemInfo) -> Self {
        SystemInfoState {
            name: non_empty(info.name),
            version: non_empty(info.version),
            model: non_empty(info.model),
            vendor: non_empty(info.vendor),
            crypto_version: non_empty(info.crypto_version),
            uptime: non_empty(info.uptime),
        }
    }
}

#[async_trait]
impl DataSource for SystemInfoDataSource {
    type Data = CmClient;
    type State = SystemInfoState;

    fn type_name(&self) -> &'static str {
        "ciphertrust_cm_system_info"
    }

    fn schema(&self) -> Schema {
        Schema::new("Version and model of the appliance.")
            .attribute(Attribute::string("name").computed())
            .attribute(Attribute::string("version").computed())
            .attribute(Attribute::string("model").computed())
            .attribute(Attribute::string("vendor").computed())
            .attribute(Attribute::string("crypto_version").computed())
            .attribute(Attribute::string("uptime").computed())
    }

    async fn read(
        &self,
        client: &CmClient,
        _config: SystemInfoState,
    ) -> Result<SystemInfoState, ProviderError> {
        let info = client
            .system_info()
            .await
            .or_diagnostic("Error reading system information")?;
        Ok(SystemInfoState::from(info))
    }
}
