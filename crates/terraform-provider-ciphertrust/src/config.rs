//! Provider settings
//!
//! Settings are layered with the `config` crate, lowest precedence first:
//! built-in defaults, the INI file at `~/.ciphertrust/config` (or
//! `CM_CONFIG_FILE`), `CM_*` environment variables and finally the
//! attributes of the `provider` block.

use std::path::{Path, PathBuf};

use ciphertrust_client::ClientConfig;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

pub const ADDRESS: &str = "address";
pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";
pub const DOMAIN: &str = "domain";
pub const AUTH_DOMAIN: &str = "auth_domain";
pub const NO_SSL_VERIFY: &str = "no_ssl_verify";
pub const REST_API_TIMEOUT: &str = "rest_api_timeout";
pub const MAX_RETRIES: &str = "max_retries";
pub const REFRESH_TOKEN_LIFETIME: &str = "refresh_token_lifetime";

pub const ENV_PREFIX: &str = "CM";
pub const CONFIG_FILE_ENV: &str = "CM_CONFIG_FILE";

/// REST API read timeout in seconds
pub const DEFAULT_REST_API_TIMEOUT: i64 = 60;
pub const DEFAULT_MAX_RETRIES: i64 = 3;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load provider settings: {0}")]
    Source(#[from] ConfigError),

    #[error("{0} must be set in the provider block, the CM_{1} environment variable or the config file")]
    Missing(&'static str, String),
}

/// Attributes of the `provider` block; every one may be omitted
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderBlock {
    pub address: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub domain: Option<String>,
    pub auth_domain: Option<String>,
    pub no_ssl_verify: Option<bool>,
    pub rest_api_timeout: Option<i64>,
    pub max_retries: Option<i64>,
    pub refresh_token_lifetime: Option<i64>,
}

/// Layered provider settings
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    /// Load from the default config file and the process environment
    pub fn new(block: &ProviderBlock) -> Result<Self, SettingsError> {
        let file = config_file_path();
        Self::from_sources(file.as_deref(), Environment::with_prefix(ENV_PREFIX), block)
    }

    pub fn from_sources(
        file: Option<&Path>,
        env: Environment,
        block: &ProviderBlock,
    ) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .set_default(DOMAIN, "")?
            .set_default(AUTH_DOMAIN, "")?
            .set_default(NO_SSL_VERIFY, false)?
            .set_default(REST_API_TIMEOUT, DEFAULT_REST_API_TIMEOUT)?
            .set_default(MAX_RETRIES, DEFAULT_MAX_RETRIES)?
            .set_default(REFRESH_TOKEN_LIFETIME, 0_i64)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Ini).required(false));
        }

        let config = builder
            .add_source(env.try_parsing(true))
            .set_override_option(ADDRESS, block.address.clone())?
            .set_override_option(USERNAME, block.username.clone())?
            .set_override_option(PASSWORD, block.password.clone())?
            .set_override_option(DOMAIN, block.domain.clone())?
            .set_override_option(AUTH_DOMAIN, block.auth_domain.clone())?
            .set_override_option(NO_SSL_VERIFY, block.no_ssl_verify)?
            .set_override_option(REST_API_TIMEOUT, block.rest_api_timeout)?
            .set_override_option(MAX_RETRIES, block.max_retries)?
            .set_override_option(REFRESH_TOKEN_LIFETIME, block.refresh_token_lifetime)?
            .build()?;

        Ok(Configuration { config })
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        self.config
            .get_string(key)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, SettingsError> {
        self.non_empty(key)
            .ok_or_else(|| SettingsError::Missing(key, key.to_uppercase()))
    }

    pub fn address(&self) -> Option<String> {
        self.non_empty(ADDRESS)
    }

    pub fn username(&self) -> Option<String> {
        self.non_empty(USERNAME)
    }

    pub fn domain(&self) -> String {
        self.config.get_string(DOMAIN).unwrap_or_default()
    }

    pub fn auth_domain(&self) -> String {
        self.config.get_string(AUTH_DOMAIN).unwrap_or_default()
    }

    pub fn no_ssl_verify(&self) -> bool {
        self.config.get_bool(NO_SSL_VERIFY).unwrap_or(false)
    }

    /// Read timeout in seconds
    pub fn rest_api_timeout(&self) -> u64 {
        self.config
            .get_int(REST_API_TIMEOUT)
            .ok()
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_REST_API_TIMEOUT) as u64
    }

    pub fn max_retries(&self) -> u32 {
        self.config
            .get_int(MAX_RETRIES)
            .ok()
            .filter(|v| *v >= 0)
            .unwrap_or(DEFAULT_MAX_RETRIES) as u32
    }

    /// Requested refresh token lifetime in seconds, 0 for the appliance default
    pub fn refresh_token_lifetime(&self) -> i64 {
        self.config
            .get_int(REFRESH_TOKEN_LIFETIME)
            .ok()
            .filter(|v| *v > 0)
            .unwrap_or(0)
    }

    /// Client settings; address and credentials are mandatory
    pub fn client_config(&self) -> Result<ClientConfig, SettingsError> {
        let address = self.required(ADDRESS)?;
        let username = self.required(USERNAME)?;
        let password = self.required(PASSWORD)?;
        let defaults = ClientConfig::default();

        Ok(ClientConfig::new(&address)
            .with_auth(&username, &password)
            .with_domains(&self.domain(), &self.auth_domain())
            .with_insecure_skip_verify(self.no_ssl_verify())
            .with_timeouts(defaults.connect_timeout_ms, self.rest_api_timeout() * 1000)
            .with_retries(self.max_retries(), defaults.retry_backoff_ms)
            .with_refresh_token_lifetime(self.refresh_token_lifetime()))
    }
}

/// `CM_CONFIG_FILE`, else `~/.ciphertrust/config`
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_FILE_ENV)
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }
    std::env::var("HOME")
        .ok()
        .filter(|home| !home.is_empty())
        .map(|home| Path::new(&home).join(".ciphertrust").join("config"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    fn ini(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings =
            Configuration::from_sources(None, env(&[]), &ProviderBlock::default()).unwrap();
        assert_eq!(settings.address(), None);
        assert_eq!(settings.domain(), "");
        assert!(!settings.no_ssl_verify());
        assert_eq!(settings.rest_api_timeout(), 60);
        assert_eq!(settings.max_retries(), 3);
        assert_eq!(settings.refresh_token_lifetime(), 0);
    }

    #[test]
    fn test_layering_precedence() {
        let file = ini(
            "address = https://file.local\nusername = file-user\npassword = file-pass\nno_ssl_verify = true\n",
        );
        let block = ProviderBlock {
            password: Some("block-pass".to_string()),
            ..Default::default()
        };
        let settings = Configuration::from_sources(
            Some(file.path()),
            env(&[("CM_USERNAME", "env-user"), ("CM_PASSWORD", "env-pass")]),
            &block,
        )
        .unwrap();

        let client = settings.client_config().unwrap();
        assert_eq!(client.address, "https://file.local");
        assert_eq!(client.username, "env-user");
        assert_eq!(client.password, "block-pass");
        assert!(client.insecure_skip_verify);
    }

    #[test]
    fn test_missing_config_file_is_ignored() {
        let block = ProviderBlock {
            address: Some("cm.local".to_string()),
            ..Default::default()
        };
        let settings = Configuration::from_sources(
            Some(Path::new("/nonexistent/ciphertrust/config")),
            env(&[]),
            &block,
        )
        .unwrap();
        assert_eq!(settings.address().as_deref(), Some("cm.local"));
    }

    #[test]
    fn test_missing_credentials() {
        let block = ProviderBlock {
            address: Some("cm.local".to_string()),
            username: Some("admin".to_string()),
            ..Default::default()
        };
        let settings = Configuration::from_sources(None, env(&[]), &block).unwrap();
        let err = settings.client_config().unwrap_err();
        assert!(matches!(err, SettingsError::Missing(PASSWORD, _)));
        assert!(err.to_string().contains("CM_PASSWORD"));
    }

    #[test]
    fn test_timeouts_and_retries() {
        let block = ProviderBlock {
            address: Some("cm.local".to_string()),
            username: Some("admin".to_string()),
            password: Some("secret".to_string()),
            domain: Some("engineering".to_string()),
            ..Default::default()
        };
        let settings = Configuration::from_sources(
            None,
            env(&[
                ("CM_REST_API_TIMEOUT", "15"),
                ("CM_MAX_RETRIES", "0"),
                ("CM_REFRESH_TOKEN_LIFETIME", "3600"),
            ]),
            &block,
        )
        .unwrap();

        let client = settings.client_config().unwrap();
        assert_eq!(client.read_timeout_ms, 15_000);
        assert_eq!(client.max_retries, 0);
        assert_eq!(client.domain, "engineering");
        assert_eq!(client.auth_domain, "");
        assert_eq!(client.refresh_token_lifetime, 3600);
    }
}
