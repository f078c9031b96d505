// System configuration APIs: proxy, NTP, properties, system info

use crate::{
    CmClient,
    constants::api_path,
    error::Result,
    model::{NtpServer, NtpServerRequest, Property, Proxy, SystemInfo, UpdatePropertyRequest},
};

impl CmClient {
    pub async fn get_proxy(&self) -> Result<Proxy> {
        self.get(api_path::PROXY).await
    }

    pub async fn set_proxy(&self, proxy: &Proxy) -> Result<Proxy> {
        self.put_json(api_path::PROXY, proxy).await
    }

    pub async fn delete_proxy(&self) -> Result<()> {
        self.delete(api_path::PROXY).await
    }

    pub async fn add_ntp_server(&self, request: &NtpServerRequest) -> Result<NtpServer> {
        self.post_json(api_path::NTP_SERVERS, request).await
    }

    pub async fn get_ntp_server(&self, id: &str) -> Result<NtpServer> {
        self.get(&format!("{}/{}", api_path::NTP_SERVERS, id)).await
    }

    pub async fn delete_ntp_server(&self, id: &str) -> Result<()> {
        self.delete(&format!("{}/{}", api_path::NTP_SERVERS, id))
            .await
    }

    pub async fn get_property(&self, name: &str) -> Result<Property> {
        self.get(&format!("{}/{}", api_path::PROPERTIES, name)).await
    }

    pub async fn set_property(&self, name: &str, value: &str) -> Result<Property> {
        let request = UpdatePropertyRequest {
            value: value.to_string(),
        };
        self.patch_json(&format!("{}/{}", api_path::PROPERTIES, name), &request)
            .await
    }

    /// Reset a property to its appliance default
    pub async fn reset_property(&self, name: &str) -> Result<()> {
        self.delete(&format!("{}/{}", api_path::PROPERTIES, name))
            .await
    }

    pub async fn system_info(&self) -> Result<SystemInfo> {
        self.get(api_path::SYSTEM_INFO).await
    }
}
