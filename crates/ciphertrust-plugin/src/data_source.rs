//! Data source framework

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::diagnostics::Diagnostics;
use crate::error::ProviderError;
use crate::resource::{from_value, to_value};
use crate::schema::Schema;
use crate::value::Value;

/// A read-only Terraform data source
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    type Data: Send + Sync + 'static;
    type State: Serialize + DeserializeOwned + Send + Sync + 'static;

    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    fn validate(&self, _config: &Value, _diags: &mut Diagnostics) {}

    async fn read(&self, data: &Self::Data, config: Self::State)
    -> Result<Self::State, ProviderError>;
}

/// Type-erased data source used by the server
#[async_trait]
pub trait DynamicDataSource<D>: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn schema(&self) -> Schema;
    fn validate(&self, config: &Value, diags: &mut Diagnostics);
    async fn read(&self, data: &D, config: &Value) -> Result<Value, ProviderError>;
}

#[async_trait]
impl<S: DataSource> DynamicDataSource<S::Data> for S {
    fn type_name(&self) -> &'static str {
        DataSource::type_name(self)
    }

    fn schema(&self) -> Schema {
        DataSource::schema(self)
    }

    fn validate(&self, config: &Value, diags: &mut Diagnostics) {
        DataSource::schema(self).validate(config, diags);
        DataSource::validate(self, config, diags);
    }

    async fn read(&self, data: &S::Data, config: &Value) -> Result<Value, ProviderError> {
        let state = DataSource::read(self, data, from_value(config)?).await?;
        to_value(&state, &DataSource::schema(self))
    }
}
