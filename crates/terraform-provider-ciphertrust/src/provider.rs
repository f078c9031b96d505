use async_trait::async_trait;
use ciphertrust_client::CmClient;
use ciphertrust_plugin::resource::from_value;
use ciphertrust_plugin::{
    Attribute, DynamicDataSource, DynamicResource, ProviderError, ProviderService, ResultExt,
    Schema, Value,
};
use tracing::info;

use crate::config::{self, Configuration, ProviderBlock};
use crate::{data_sources, resources};

/// CipherTrust Manager provider; configured data is an authenticated client
#[derive(Debug, Default, Clone, Copy)]
pub struct CipherTrustProvider;

impl CipherTrustProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProviderService for CipherTrustProvider {
    type Data = CmClient;

    fn schema(&self) -> Schema {
        Schema::new("Manage CipherTrust Manager appliances.")
            .attribute(
                Attribute::string(config::ADDRESS)
                    .optional()
                    .description("Appliance URL. May also be set with CM_ADDRESS."),
            )
            .attribute(
                Attribute::string(config::USERNAME)
                    .optional()
                    .description("Username. May also be set with CM_USERNAME."),
            )
            .attribute(
                Attribute::string(config::PASSWORD)
                    .optional()
                    .sensitive()
                    .description("Password. May also be set with CM_PASSWORD."),
            )
            .attribute(
                Attribute::string(config::DOMAIN)
                    .optional()
                    .description("Domain the session is scoped to. Defaults to the root domain."),
            )
            .attribute(
                Attribute::string(config::AUTH_DOMAIN)
                    .optional()
                    .description("Domain the user authenticates against. Defaults to the root domain."),
            )
            .attribute(
                Attribute::bool(config::NO_SSL_VERIFY)
                    .optional()
                    .description("Skip verification of the appliance certificate."),
            )
            .attribute(
                Attribute::number(config::REST_API_TIMEOUT)
                    .optional()
                    .description("REST API read timeout in seconds. Defaults to 60."),
            )
            .attribute(
                Attribute::number(config::MAX_RETRIES)
                    .optional()
                    .description("Retries for failed requests. Defaults to 3."),
            )
            .attribute(
                Attribute::number(config::REFRESH_TOKEN_LIFETIME)
                    .optional()
                    .description("Lifetime in seconds requested for refresh tokens."),
            )
    }

    async fn configure(
        &self,
        terraform_version: &str,
        config: &Value,
    ) -> Result<CmClient, ProviderError> {
        if !config.is_fully_known() {
            return Err(ProviderError::new(
                "Unknown provider configuration",
                "provider attributes must be known before resources can be managed; \
                 avoid depending on values computed during apply",
            ));
        }

        let block: ProviderBlock = from_value(config)?;
        let settings = Configuration::new(&block).or_diagnostic("Invalid provider configuration")?;
        let client_config = settings
            .client_config()
            .or_diagnostic("Invalid provider configuration")?;

        let client = CmClient::new(client_config).or_diagnostic("Failed to create API client")?;
        client
            .authenticate()
            .await
            .or_diagnostic("Failed to authenticate with CipherTrust Manager")?;

        info!(
            terraform_version,
            address = %client.config().address,
            domain = %client.config().domain,
            "Provider configured"
        );

        Ok(client)
    }

    fn resources(&self) -> Vec<Box<dyn DynamicResource<CmClient>>> {
        resources::all()
    }

    fn data_sources(&self) -> Vec<Box<dyn DynamicDataSource<CmClient>>> {
        data_sources::all()
    }
}
