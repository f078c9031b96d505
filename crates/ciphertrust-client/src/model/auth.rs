// Authentication model types

use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;

/// Body of `POST /v1/auth/tokens`
#[derive(Clone, Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub grant_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_domain: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_lifetime: Option<i64>,
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

impl<'a> TokenRequest<'a> {
    pub fn password(config: &'a ClientConfig) -> Self {
        Self {
            grant_type: "password",
            username: Some(&config.username),
            password: Some(&config.password),
            refresh_token: None,
            domain: non_empty(&config.domain),
            auth_domain: non_empty(&config.auth_domain),
            refresh_token_lifetime: (config.refresh_token_lifetime > 0)
                .then_some(config.refresh_token_lifetime),
        }
    }

    pub fn refresh(config: &'a ClientConfig, refresh_token: &'a str) -> Self {
        Self {
            grant_type: "refresh_token",
            username: None,
            password: None,
            refresh_token: Some(refresh_token),
            domain: non_empty(&config.domain),
            auth_domain: None,
            refresh_token_lifetime: None,
        }
    }
}

/// Response of `POST /v1/auth/tokens`
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    pub jwt: String,
    pub duration: i64,
    pub token_type: String,
    pub client_id: String,
    pub refresh_token: Option<String>,
    pub refresh_token_id: Option<String>,
}
