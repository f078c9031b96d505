//! gRPC implementation of the `tfplugin6.Provider` service

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tonic::{Request, Response, Status};
use tracing::{debug, info, warn};

use crate::data_source::DynamicDataSource;
use crate::diagnostics::{Diagnostics, attribute_path};
use crate::error::{PluginError, ProviderError};
use crate::plan::plan_resource_change;
use crate::proto::{
    self, DynamicValue, apply_resource_change, configure_provider, get_metadata,
    get_provider_schema, import_resource_state, plan_resource_change as plan_rpc, read_data_source,
    read_resource, stop_provider, upgrade_resource_state, validate_data_resource_config,
    validate_provider_config, validate_resource_config,
};
use crate::provider::ProviderService;
use crate::resource::DynamicResource;
use crate::schema::Schema;
use crate::value::{Value, conform, from_msgpack, to_msgpack};

/// Serves one provider over the plugin protocol
pub struct PluginServer<P: ProviderService> {
    provider: P,
    resources: HashMap<&'static str, Box<dyn DynamicResource<P::Data>>>,
    data_sources: HashMap<&'static str, Box<dyn DynamicDataSource<P::Data>>>,
    data: RwLock<Option<Arc<P::Data>>>,
}

impl<P: ProviderService> PluginServer<P> {
    pub fn new(provider: P) -> Self {
        let resources = provider
            .resources()
            .into_iter()
            .map(|r| (r.type_name(), r))
            .collect();
        let data_sources = provider
            .data_sources()
            .into_iter()
            .map(|d| (d.type_name(), d))
            .collect();

        Self {
            provider,
            resources,
            data_sources,
            data: RwLock::new(None),
        }
    }

    fn resource(&self, type_name: &str) -> Result<&dyn DynamicResource<P::Data>, ProviderError> {
        self.resources
            .get(type_name)
            .map(|r| r.as_ref())
            .ok_or_else(|| {
                ProviderError::new(
                    "Unknown resource type",
                    format!("the provider does not support resource type {type_name}"),
                )
            })
    }

    fn data_source(
        &self,
        type_name: &str,
    ) -> Result<&dyn DynamicDataSource<P::Data>, ProviderError> {
        self.data_sources
            .get(type_name)
            .map(|d| d.as_ref())
            .ok_or_else(|| {
                ProviderError::new(
                    "Unknown data source type",
                    format!("the provider does not support data source type {type_name}"),
                )
            })
    }

    /// Data produced by `ConfigureProvider`
    async fn configured(&self) -> Result<Arc<P::Data>, ProviderError> {
        self.data.read().await.clone().ok_or_else(|| {
            ProviderError::new(
                "Provider not configured",
                "ConfigureProvider must succeed before resources can be managed",
            )
        })
    }

    async fn read(&self, request: read_resource::Request) -> Result<Value, ProviderError> {
        let resource = self.resource(&request.type_name)?;
        let current = decode(request.current_state.as_ref())?;
        if current.is_null() {
            return Ok(Value::Null);
        }

        let data = self.configured().await?;
        match resource.read(&data, &current).await? {
            Some(state) => Ok(state),
            None => {
                info!(
                    type_name = %request.type_name,
                    "Resource no longer exists, removing from state"
                );
                Ok(Value::Null)
            }
        }
    }

    async fn apply(
        &self,
        resource: &dyn DynamicResource<P::Data>,
        prior: &Value,
        planned: &Value,
    ) -> Result<Value, ProviderError> {
        let data = self.configured().await?;

        if planned.is_null() {
            resource.delete(&data, prior).await?;
            Ok(Value::Null)
        } else if prior.is_null() {
            resource.create(&data, planned).await
        } else {
            resource.update(&data, prior, planned).await
        }
    }
}

fn decode(value: Option<&DynamicValue>) -> Result<Value, PluginError> {
    match value {
        Some(v) if !v.msgpack.is_empty() => from_msgpack(&v.msgpack),
        Some(v) if !v.json.is_empty() => Ok(Value::from_json(serde_json::from_slice(&v.json)?)),
        _ => Ok(Value::Null),
    }
}

fn encode(value: &Value, schema: &Schema) -> Result<DynamicValue, PluginError> {
    Ok(DynamicValue {
        msgpack: to_msgpack(value, &schema.value_type())?,
        json: Vec::new(),
    })
}

fn diagnostics_of(err: impl Into<ProviderError>) -> Vec<proto::Diagnostic> {
    Diagnostics::from(err.into()).into_proto()
}

#[tonic::async_trait]
impl<P: ProviderService> proto::provider_server::Provider for PluginServer<P> {
    async fn get_metadata(
        &self,
        _request: Request<get_metadata::Request>,
    ) -> Result<Response<get_metadata::Response>, Status> {
        let mut resources: Vec<_> = self
            .resources
            .keys()
            .map(|name| get_metadata::ResourceMetadata {
                type_name: name.to_string(),
            })
            .collect();
        resources.sort_by(|a, b| a.type_name.cmp(&b.type_name));

        let mut data_sources: Vec<_> = self
            .data_sources
            .keys()
            .map(|name| get_metadata::DataSourceMetadata {
                type_name: name.to_string(),
            })
            .collect();
        data_sources.sort_by(|a, b| a.type_name.cmp(&b.type_name));

        Ok(Response::new(get_metadata::Response {
            server_capabilities: Some(server_capabilities()),
            diagnostics: Vec::new(),
            data_sources,
            resources,
        }))
    }

    async fn get_provider_schema(
        &self,
        _request: Request<get_provider_schema::Request>,
    ) -> Result<Response<get_provider_schema::Response>, Status> {
        let resource_schemas = self
            .resources
            .iter()
            .map(|(name, r)| (name.to_string(), r.schema().to_proto()))
            .collect();
        let data_source_schemas = self
            .data_sources
            .iter()
            .map(|(name, d)| (name.to_string(), d.schema().to_proto()))
            .collect();

        Ok(Response::new(get_provider_schema::Response {
            provider: Some(self.provider.schema().to_proto()),
            resource_schemas,
            data_source_schemas,
            diagnostics: Vec::new(),
            provider_meta: Some(Schema::default().to_proto()),
            server_capabilities: Some(server_capabilities()),
        }))
    }

    async fn validate_provider_config(
        &self,
        request: Request<validate_provider_config::Request>,
    ) -> Result<Response<validate_provider_config::Response>, Status> {
        let request = request.into_inner();
        let diagnostics = match decode(request.config.as_ref()) {
            Ok(config) => {
                let mut diags = Diagnostics::new();
                self.provider.schema().validate(&config, &mut diags);
                self.provider.validate(&config, &mut diags);
                diags.into_proto()
            }
            Err(e) => diagnostics_of(e),
        };
        Ok(Response::new(validate_provider_config::Response { diagnostics }))
    }

    async fn validate_resource_config(
        &self,
        request: Request<validate_resource_config::Request>,
    ) -> Result<Response<validate_resource_config::Response>, Status> {
        let request = request.into_inner();
        let result = self.resource(&request.type_name).and_then(|resource| {
            let config = decode(request.config.as_ref())?;
            let mut diags = Diagnostics::new();
            resource.validate(&config, &mut diags);
            Ok(diags)
        });

        let diagnostics = match result {
            Ok(diags) => diags.into_proto(),
            Err(e) => diagnostics_of(e),
        };
        Ok(Response::new(validate_resource_config::Response { diagnostics }))
    }

    async fn validate_data_resource_config(
        &self,
        request: Request<validate_data_resource_config::Request>,
    ) -> Result<Response<validate_data_resource_config::Response>, Status> {
        let request = request.into_inner();
        let result = self.data_source(&request.type_name).and_then(|data_source| {
            let config = decode(request.config.as_ref())?;
            let mut diags = Diagnostics::new();
            data_source.validate(&config, &mut diags);
            Ok(diags)
        });

        let diagnostics = match result {
            Ok(diags) => diags.into_proto(),
            Err(e) => diagnostics_of(e),
        };
        Ok(Response::new(validate_data_resource_config::Response {
            diagnostics,
        }))
    }

    async fn upgrade_resource_state(
        &self,
        request: Request<upgrade_resource_state::Request>,
    ) -> Result<Response<upgrade_resource_state::Response>, Status> {
        let request = request.into_inner();

        // Stored JSON state is re-encoded against the current schema, which
        // drops attributes that no longer exist
        let result = self.resource(&request.type_name).and_then(|resource| {
            let schema = resource.schema();
            let json = request
                .raw_state
                .as_ref()
                .map(|raw| raw.json.as_slice())
                .filter(|json| !json.is_empty())
                .ok_or_else(|| {
                    ProviderError::new(
                        "Unsupported state format",
                        "only JSON encoded state can be upgraded",
                    )
                })?;
            let state: serde_json::Value = serde_json::from_slice(json).map_err(PluginError::from)?;
            let value = conform(&Value::from_json(state), &schema.value_type());
            Ok(encode(&value, &schema)?)
        });

        let response = match result {
            Ok(upgraded) => upgrade_resource_state::Response {
                upgraded_state: Some(upgraded),
                diagnostics: Vec::new(),
            },
            Err(e) => upgrade_resource_state::Response {
                upgraded_state: None,
                diagnostics: diagnostics_of(e),
            },
        };
        Ok(Response::new(response))
    }

    async fn configure_provider(
        &self,
        request: Request<configure_provider::Request>,
    ) -> Result<Response<configure_provider::Response>, Status> {
        let request = request.into_inner();
        info!(
            terraform_version = %request.terraform_version,
            "Configuring provider"
        );

        let result = match decode(request.config.as_ref()) {
            Ok(config) => {
                self.provider
                    .configure(&request.terraform_version, &config)
                    .await
            }
            Err(e) => Err(e.into()),
        };

        let diagnostics = match result {
            Ok(data) => {
                *self.data.write().await = Some(Arc::new(data));
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "Provider configuration failed");
                diagnostics_of(e)
            }
        };
        Ok(Response::new(configure_provider::Response { diagnostics }))
    }

    async fn read_resource(
        &self,
        request: Request<read_resource::Request>,
    ) -> Result<Response<read_resource::Response>, Status> {
        let request = request.into_inner();
        let type_name = request.type_name.clone();
        let current_state = request.current_state.clone();
        let private = request.private.clone();
        debug!(type_name = %type_name, "ReadResource");

        let result = match self.read(request).await {
            Ok(state) => self
                .resource(&type_name)
                .and_then(|r| Ok(encode(&state, &r.schema())?)),
            Err(e) => Err(e),
        };

        let response = match result {
            Ok(new_state) => read_resource::Response {
                new_state: Some(new_state),
                diagnostics: Vec::new(),
                private,
            },
            // Keep the current state when the refresh fails
            Err(e) => read_resource::Response {
                new_state: current_state,
                diagnostics: diagnostics_of(e),
                private,
            },
        };
        Ok(Response::new(response))
    }

    async fn plan_resource_change(
        &self,
        request: Request<plan_rpc::Request>,
    ) -> Result<Response<plan_rpc::Response>, Status> {
        let request = request.into_inner();
        debug!(type_name = %request.type_name, "PlanResourceChange");

        let result = self.resource(&request.type_name).and_then(|resource| {
            let schema = resource.schema();
            let prior = decode(request.prior_state.as_ref())?;
            let proposed = decode(request.proposed_new_state.as_ref())?;
            let config = decode(request.config.as_ref())?;

            let planned = plan_resource_change(&schema, &prior, &proposed, &config);
            Ok((encode(&planned.state, &schema)?, planned.requires_replace))
        });

        let response = match result {
            Ok((planned_state, requires_replace)) => plan_rpc::Response {
                planned_state: Some(planned_state),
                requires_replace: requires_replace
                    .iter()
                    .map(|path| attribute_path(path))
                    .collect(),
                planned_private: request.prior_private,
                diagnostics: Vec::new(),
                legacy_type_system: false,
            },
            Err(e) => plan_rpc::Response {
                diagnostics: diagnostics_of(e),
                ..Default::default()
            },
        };
        Ok(Response::new(response))
    }

    async fn apply_resource_change(
        &self,
        request: Request<apply_resource_change::Request>,
    ) -> Result<Response<apply_resource_change::Response>, Status> {
        let request = request.into_inner();
        debug!(type_name = %request.type_name, "ApplyResourceChange");

        let resource = match self.resource(&request.type_name) {
            Ok(resource) => resource,
            Err(e) => {
                return Ok(Response::new(apply_resource_change::Response {
                    diagnostics: diagnostics_of(e),
                    ..Default::default()
                }));
            }
        };
        let schema = resource.schema();

        let decoded = decode(request.prior_state.as_ref()).and_then(|prior| {
            let planned = decode(request.planned_state.as_ref())?;
            Ok((prior, planned))
        });
        let (prior, planned) = match decoded {
            Ok(values) => values,
            Err(e) => {
                return Ok(Response::new(apply_resource_change::Response {
                    diagnostics: diagnostics_of(e),
                    ..Default::default()
                }));
            }
        };

        let (new_state, diagnostics) = match self.apply(resource, &prior, &planned).await {
            Ok(state) => {
                let mut diags = Diagnostics::new();
                if planned.is_null()
                    && let Some(detail) = resource.state_only_delete()
                {
                    diags.warning("Resource removed from state only", detail);
                }
                (state, diags.into_proto())
            }
            Err(e) => {
                warn!(
                    type_name = %request.type_name,
                    error = %e,
                    "Apply failed"
                );
                // A failed create leaves nothing behind; other failures keep the prior state
                (prior, diagnostics_of(e))
            }
        };

        let response = match encode(&new_state, &schema) {
            Ok(new_state) => apply_resource_change::Response {
                new_state: Some(new_state),
                private: request.planned_private,
                diagnostics,
                legacy_type_system: false,
            },
            Err(e) => apply_resource_change::Response {
                diagnostics: diagnostics_of(e),
                ..Default::default()
            },
        };
        Ok(Response::new(response))
    }

    async fn import_resource_state(
        &self,
        request: Request<import_resource_state::Request>,
    ) -> Result<Response<import_resource_state::Response>, Status> {
        let request = request.into_inner();
        info!(type_name = %request.type_name, id = %request.id, "Importing resource");

        let result = async {
            let resource = self.resource(&request.type_name)?;
            let data = self.configured().await?;
            let state = resource.import(&data, &request.id).await?;
            Ok::<_, ProviderError>(encode(&state, &resource.schema())?)
        }
        .await;

        let response = match result {
            Ok(state) => import_resource_state::Response {
                imported_resources: vec![import_resource_state::ImportedResource {
                    type_name: request.type_name,
                    state: Some(state),
                    private: Vec::new(),
                }],
                diagnostics: Vec::new(),
            },
            Err(e) => import_resource_state::Response {
                imported_resources: Vec::new(),
                diagnostics: diagnostics_of(e),
            },
        };
        Ok(Response::new(response))
    }

    async fn read_data_source(
        &self,
        request: Request<read_data_source::Request>,
    ) -> Result<Response<read_data_source::Response>, Status> {
        let request = request.into_inner();
        debug!(type_name = %request.type_name, "ReadDataSource");

        let result = async {
            let data_source = self.data_source(&request.type_name)?;
            let config = decode(request.config.as_ref())?;
            let data = self.configured().await?;
            let state = data_source.read(&data, &config).await?;
            Ok::<_, ProviderError>(encode(&state, &data_source.schema())?)
        }
        .await;

        let response = match result {
            Ok(state) => read_data_source::Response {
                state: Some(state),
                diagnostics: Vec::new(),
            },
            Err(e) => read_data_source::Response {
                state: None,
                diagnostics: diagnostics_of(e),
            },
        };
        Ok(Response::new(response))
    }

    async fn stop_provider(
        &self,
        _request: Request<stop_provider::Request>,
    ) -> Result<Response<stop_provider::Response>, Status> {
        info!("Stop requested, in-flight requests run to completion");
        Ok(Response::new(stop_provider::Response {
            error: String::new(),
        }))
    }
}

fn server_capabilities() -> proto::ServerCapabilities {
    proto::ServerCapabilities {
        plan_destroy: true,
        get_provider_schema_optional: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::provider_server::Provider;
    use crate::resource::Resource;
    use crate::schema::Attribute;
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default, Serialize, Deserialize)]
    struct ItemState {
        id: Option<String>,
        name: Option<String>,
    }

    /// In-memory store standing in for an appliance
    type Store = Mutex<HashMap<String, String>>;

    struct Items;

    #[async_trait]
    impl Resource for Items {
        type Data = Store;
        type State = ItemState;

        fn type_name(&self) -> &'static str {
            "test_item"
        }

        fn schema(&self) -> Schema {
            Schema::new("item")
                .attribute(Attribute::string("id").computed().use_state_for_unknown())
                .attribute(Attribute::string("name").required().requires_replace())
        }

        async fn create(&self, store: &Store, plan: ItemState) -> Result<ItemState, ProviderError> {
            let name = plan.name.unwrap_or_default();
            if name == "fail" {
                return Err(ProviderError::new("Error creating item", "rejected"));
            }
            let id = format!("id-{name}");
            store.lock().unwrap().insert(id.clone(), name.clone());
            Ok(ItemState {
                id: Some(id),
                name: Some(name),
            })
        }

        async fn read(
            &self,
            store: &Store,
            state: ItemState,
        ) -> Result<Option<ItemState>, ProviderError> {
            let id = state.id.unwrap_or_default();
            let name = store.lock().unwrap().get(&id).cloned();
            Ok(name.map(|name| ItemState {
                id: Some(id),
                name: Some(name),
            }))
        }

        async fn update(
            &self,
            _store: &Store,
            _prior: ItemState,
            plan: ItemState,
        ) -> Result<ItemState, ProviderError> {
            Ok(plan)
        }

        async fn delete(&self, store: &Store, state: ItemState) -> Result<(), ProviderError> {
            store.lock().unwrap().remove(&state.id.unwrap_or_default());
            Ok(())
        }
    }

    /// Destroying only forgets the item
    struct Pinned;

    #[async_trait]
    impl Resource for Pinned {
        type Data = Store;
        type State = ItemState;

        fn type_name(&self) -> &'static str {
            "test_pinned"
        }

        fn schema(&self) -> Schema {
            Resource::schema(&Items)
        }

        async fn create(
            &self,
            _store: &Store,
            plan: ItemState,
        ) -> Result<ItemState, ProviderError> {
            Ok(plan)
        }

        async fn read(
            &self,
            _store: &Store,
            state: ItemState,
        ) -> Result<Option<ItemState>, ProviderError> {
            Ok(Some(state))
        }

        async fn update(
            &self,
            _store: &Store,
            _prior: ItemState,
            plan: ItemState,
        ) -> Result<ItemState, ProviderError> {
            Ok(plan)
        }

        async fn delete(&self, _store: &Store, _state: ItemState) -> Result<(), ProviderError> {
            Ok(())
        }

        fn state_only_delete(&self) -> Option<&'static str> {
            Some("the item stays in the store")
        }
    }

    struct TestProvider;

    #[async_trait]
    impl ProviderService for TestProvider {
        type Data = Store;

        fn schema(&self) -> Schema {
            Schema::new("test provider").attribute(Attribute::string("endpoint").optional())
        }

        async fn configure(&self, _version: &str, _config: &Value) -> Result<Store, ProviderError> {
            Ok(Mutex::new(HashMap::new()))
        }

        fn resources(&self) -> Vec<Box<dyn DynamicResource<Store>>> {
            vec![Box::new(Items), Box::new(Pinned)]
        }

        fn data_sources(&self) -> Vec<Box<dyn DynamicDataSource<Store>>> {
            Vec::new()
        }
    }

    fn dynamic(json: serde_json::Value) -> Option<DynamicValue> {
        let schema = Resource::schema(&Items);
        Some(encode(&Value::from_json(json), &schema).unwrap())
    }

    fn state_of(value: Option<DynamicValue>) -> serde_json::Value {
        decode(value.as_ref()).unwrap().to_json()
    }

    async fn configured_server() -> PluginServer<TestProvider> {
        let server = PluginServer::new(TestProvider);
        let response = server
            .configure_provider(Request::new(configure_provider::Request {
                terraform_version: "1.9.0".to_string(),
                config: None,
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(response.diagnostics.is_empty());
        server
    }

    #[tokio::test]
    async fn test_schema_lists_resources() {
        let server = PluginServer::new(TestProvider);
        let response = server
            .get_provider_schema(Request::new(get_provider_schema::Request {}))
            .await
            .unwrap()
            .into_inner();
        assert!(response.resource_schemas.contains_key("test_item"));
        assert!(response.provider.is_some());
    }

    #[tokio::test]
    async fn test_apply_before_configure_reports_diagnostic() {
        let server = PluginServer::new(TestProvider);
        let response = server
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: "test_item".to_string(),
                prior_state: dynamic(serde_json::Value::Null),
                planned_state: dynamic(json!({"id": null, "name": "a"})),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }

    #[tokio::test]
    async fn test_create_then_read_then_destroy() {
        let server = configured_server().await;

        let created = server
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: "test_item".to_string(),
                prior_state: dynamic(serde_json::Value::Null),
                planned_state: dynamic(json!({"id": null, "name": "a"})),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(created.diagnostics.is_empty());
        assert_eq!(state_of(created.new_state), json!({"id": "id-a", "name": "a"}));

        let read = server
            .read_resource(Request::new(read_resource::Request {
                type_name: "test_item".to_string(),
                current_state: dynamic(json!({"id": "id-a", "name": "a"})),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(state_of(read.new_state), json!({"id": "id-a", "name": "a"}));

        let destroyed = server
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: "test_item".to_string(),
                prior_state: dynamic(json!({"id": "id-a", "name": "a"})),
                planned_state: dynamic(serde_json::Value::Null),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(destroyed.diagnostics.is_empty());
        assert_eq!(state_of(destroyed.new_state), serde_json::Value::Null);

        let gone = server
            .read_resource(Request::new(read_resource::Request {
                type_name: "test_item".to_string(),
                current_state: dynamic(json!({"id": "id-a", "name": "a"})),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(state_of(gone.new_state), serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_state_only_destroy_warns() {
        let server = configured_server().await;
        let response = server
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: "test_pinned".to_string(),
                prior_state: dynamic(json!({"id": "id-a", "name": "a"})),
                planned_state: dynamic(serde_json::Value::Null),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].severity,
            crate::proto::diagnostic::Severity::Warning as i32
        );
        assert_eq!(response.diagnostics[0].detail, "the item stays in the store");
        assert_eq!(state_of(response.new_state), serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_failed_create_reports_error() {
        let server = configured_server().await;
        let response = server
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: "test_item".to_string(),
                prior_state: dynamic(serde_json::Value::Null),
                planned_state: dynamic(json!({"id": null, "name": "fail"})),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.diagnostics[0].summary, "Error creating item");
        assert_eq!(state_of(response.new_state), serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_plan_replace_on_name_change() {
        let server = PluginServer::new(TestProvider);
        let response = server
            .plan_resource_change(Request::new(plan_rpc::Request {
                type_name: "test_item".to_string(),
                prior_state: dynamic(json!({"id": "id-a", "name": "a"})),
                proposed_new_state: dynamic(json!({"id": "id-a", "name": "b"})),
                config: dynamic(json!({"id": null, "name": "b"})),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(response.diagnostics.is_empty());
        assert_eq!(response.requires_replace.len(), 1);
        assert_eq!(response.requires_replace[0].steps.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_type_is_diagnosed() {
        let server = PluginServer::new(TestProvider);
        let response = server
            .validate_resource_config(Request::new(validate_resource_config::Request {
                type_name: "test_missing".to_string(),
                config: None,
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.diagnostics[0].summary, "Unknown resource type");
    }

    #[tokio::test]
    async fn test_upgrade_drops_removed_attributes() {
        let server = PluginServer::new(TestProvider);
        let response = server
            .upgrade_resource_state(Request::new(upgrade_resource_state::Request {
                type_name: "test_item".to_string(),
                version: 0,
                raw_state: Some(proto::RawState {
                    json: br#"{"id":"id-a","name":"a","legacy":"x"}"#.to_vec(),
                    flatmap: HashMap::new(),
                }),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(response.diagnostics.is_empty());
        assert_eq!(
            state_of(response.upgraded_state),
            json!({"id": "id-a", "name": "a"})
        );
    }

    #[tokio::test]
    async fn test_import_seeds_state() {
        let server = configured_server().await;
        let response = server
            .import_resource_state(Request::new(import_resource_state::Request {
                type_name: "test_item".to_string(),
                id: "id-z".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.imported_resources.len(), 1);
        assert_eq!(
            state_of(response.imported_resources[0].state.clone()),
            json!({"id": "id-z", "name": null})
        );
    }
}
