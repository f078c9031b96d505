//! Provider definition implemented by provider crates

use async_trait::async_trait;

use crate::data_source::DynamicDataSource;
use crate::diagnostics::Diagnostics;
use crate::error::ProviderError;
use crate::resource::DynamicResource;
use crate::schema::Schema;
use crate::value::Value;

#[async_trait]
pub trait ProviderService: Send + Sync + 'static {
    /// Data handed to every resource once the provider is configured
    type Data: Send + Sync + 'static;

    /// Schema of the `provider` block
    fn schema(&self) -> Schema;

    fn validate(&self, _config: &Value, _diags: &mut Diagnostics) {}

    async fn configure(
        &self,
        terraform_version: &str,
        config: &Value,
    ) -> Result<Self::Data, ProviderError>;

    fn resources(&self) -> Vec<Box<dyn DynamicResource<Self::Data>>>;

    fn data_sources(&self) -> Vec<Box<dyn DynamicDataSource<Self::Data>>>;
}
