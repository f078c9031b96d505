// Syslog and log forwarder APIs

use crate::{
    CmClient,
    constants::api_path,
    error::Result,
    model::{LogForwarder, LogForwarderRequest, Syslog, SyslogRequest},
};

impl CmClient {
    pub async fn create_syslog(&self, request: &SyslogRequest) -> Result<Syslog> {
        self.post_json(api_path::SYSLOGS, request).await
    }

    pub async fn get_syslog(&self, id: &str) -> Result<Syslog> {
        self.get(&format!("{}/{}", api_path::SYSLOGS, id)).await
    }

    pub async fn update_syslog(&self, id: &str, request: &SyslogRequest) -> Result<Syslog> {
        self.patch_json(&format!("{}/{}", api_path::SYSLOGS, id), request)
            .await
    }

    pub async fn delete_syslog(&self, id: &str) -> Result<()> {
        self.delete(&format!("{}/{}", api_path::SYSLOGS, id)).await
    }

    pub async fn create_log_forwarder(
        &self,
        request: &LogForwarderRequest,
    ) -> Result<LogForwarder> {
        self.post_json(api_path::LOG_FORWARDERS, request).await
    }

    pub async fn get_log_forwarder(&self, id: &str) -> Result<LogForwarder> {
        self.get(&format!("{}/{}", api_path::LOG_FORWARDERS, id))
            .await
    }

    pub async fn update_log_forwarder(
        &self,
        id: &str,
        request: &LogForwarderRequest,
    ) -> Result<LogForwarder> {
        self.patch_json(&format!("{}/{}", api_path::LOG_FORWARDERS, id), request)
            .await
    }

    pub async fn delete_log_forwarder(&self, id: &str) -> Result<()> {
        self.delete(&format!("{}/{}", api_path::LOG_FORWARDERS, id))
            .await
    }
}
