// System configuration model types: proxy, NTP, properties, system info

use serde::{Deserialize, Serialize};

/// Proxy settings, used as request body and response
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Proxy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_proxy: Option<Vec<String>>,
}

/// Body of `POST /v1/configs/ntp/servers`
#[derive(Clone, Debug, Default, Serialize)]
pub struct NtpServerRequest {
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NtpServer {
    pub id: String,
    pub host: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// Body of `PATCH /v1/configs/properties/{name}`
#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdatePropertyRequest {
    pub value: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Property {
    pub name: String,
    pub value: String,
    pub description: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// Response of `GET /v1/system/info`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    pub name: String,
    pub version: String,
    pub model: String,
    pub vendor: String,
    pub crypto_version: String,
    pub uptime: String,
}
