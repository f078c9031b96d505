//! Managed resource framework
//!
//! Resources implement [`Resource`] with a typed state. The server works
//! with the type-erased [`DynamicResource`] which every `Resource`
//! implements through a blanket impl.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;

use crate::diagnostics::Diagnostics;
use crate::error::ProviderError;
use crate::schema::Schema;
use crate::value::{Value, conform};

/// A Terraform managed resource with a typed state
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Shared data produced by provider configuration
    type Data: Send + Sync + 'static;
    /// Resource state; every field should tolerate null
    type State: Serialize + DeserializeOwned + Send + Sync + 'static;

    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Resource-specific configuration checks; values may still be unknown
    fn validate(&self, _config: &Value, _diags: &mut Diagnostics) {}

    async fn create(&self, data: &Self::Data, plan: Self::State)
    -> Result<Self::State, ProviderError>;

    /// `Ok(None)` means the object is gone and should leave the state
    async fn read(
        &self,
        data: &Self::Data,
        state: Self::State,
    ) -> Result<Option<Self::State>, ProviderError>;

    async fn update(
        &self,
        data: &Self::Data,
        prior: Self::State,
        plan: Self::State,
    ) -> Result<Self::State, ProviderError>;

    async fn delete(&self, data: &Self::Data, state: Self::State) -> Result<(), ProviderError>;

    /// Detail of the warning shown when destroying only forgets the object
    fn state_only_delete(&self) -> Option<&'static str> {
        None
    }

    /// Seed the state for `terraform import`; a read follows
    async fn import(&self, _data: &Self::Data, id: &str) -> Result<Self::State, ProviderError> {
        from_value(&Value::from_json(json!({ "id": id })))
    }
}

/// Type-erased resource used by the server
#[async_trait]
pub trait DynamicResource<D>: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn schema(&self) -> Schema;
    fn validate(&self, config: &Value, diags: &mut Diagnostics);
    async fn create(&self, data: &D, plan: &Value) -> Result<Value, ProviderError>;
    async fn read(&self, data: &D, state: &Value) -> Result<Option<Value>, ProviderError>;
    async fn update(&self, data: &D, prior: &Value, plan: &Value)
    -> Result<Value, ProviderError>;
    async fn delete(&self, data: &D, state: &Value) -> Result<(), ProviderError>;
    fn state_only_delete(&self) -> Option<&'static str>;
    async fn import(&self, data: &D, id: &str) -> Result<Value, ProviderError>;
}

#[async_trait]
impl<R: Resource> DynamicResource<R::Data> for R {
    fn type_name(&self) -> &'static str {
        Resource::type_name(self)
    }

    fn schema(&self) -> Schema {
        Resource::schema(self)
    }

    fn validate(&self, config: &Value, diags: &mut Diagnostics) {
        Resource::schema(self).validate(config, diags);
        Resource::validate(self, config, diags);
    }

    async fn create(&self, data: &R::Data, plan: &Value) -> Result<Value, ProviderError> {
        let state = Resource::create(self, data, from_value(plan)?).await?;
        to_value(&state, &Resource::schema(self))
    }

    async fn read(&self, data: &R::Data, state: &Value) -> Result<Option<Value>, ProviderError> {
        match Resource::read(self, data, from_value(state)?).await? {
            Some(state) => Ok(Some(to_value(&state, &Resource::schema(self))?)),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        data: &R::Data,
        prior: &Value,
        plan: &Value,
    ) -> Result<Value, ProviderError> {
        let state = Resource::update(self, data, from_value(prior)?, from_value(plan)?).await?;
        to_value(&state, &Resource::schema(self))
    }

    async fn delete(&self, data: &R::Data, state: &Value) -> Result<(), ProviderError> {
        Resource::delete(self, data, from_value(state)?).await
    }

    fn state_only_delete(&self) -> Option<&'static str> {
        Resource::state_only_delete(self)
    }

    async fn import(&self, data: &R::Data, id: &str) -> Result<Value, ProviderError> {
        let state = Resource::import(self, data, id).await?;
        to_value(&state, &Resource::schema(self))
    }
}

/// Deserialize a typed state from a value; unknowns read as null
pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T, ProviderError> {
    serde_json::from_value(value.to_json())
        .map_err(|e| ProviderError::new("Failed to decode Terraform value", e.to_string()))
}

/// Serialize a typed state into a value conforming to the schema
pub fn to_value<T: Serialize>(state: &T, schema: &Schema) -> Result<Value, ProviderError> {
    let json = serde_json::to_value(state)
        .map_err(|e| ProviderError::new("Failed to encode Terraform value", e.to_string()))?;
    Ok(conform(&Value::from_json(json), &schema.value_type()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Attribute;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct NoteState {
        id: Option<String>,
        text: Option<String>,
    }

    #[derive(Default)]
    struct Notes {
        created: AtomicUsize,
    }

    #[async_trait]
    impl Resource for Notes {
        type Data = String;
        type State = NoteState;

        fn type_name(&self) -> &'static str {
            "test_note"
        }

        fn schema(&self) -> Schema {
            Schema::new("note")
                .attribute(Attribute::string("id").computed())
                .attribute(Attribute::string("text").required())
                .attribute(Attribute::string("owner").computed())
        }

        async fn create(&self, data: &String, plan: NoteState) -> Result<NoteState, ProviderError> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(NoteState {
                id: Some(format!("{data}-1")),
                text: plan.text,
            })
        }

        async fn read(
            &self,
            _data: &String,
            state: NoteState,
        ) -> Result<Option<NoteState>, ProviderError> {
            Ok((state.id.as_deref() != Some("gone")).then_some(state))
        }

        async fn update(
            &self,
            _data: &String,
            _prior: NoteState,
            plan: NoteState,
        ) -> Result<NoteState, ProviderError> {
            Ok(plan)
        }

        async fn delete(&self, _data: &String, _state: NoteState) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dynamic_create_conforms_to_schema() {
        let resource = Notes::default();
        let dynamic: &dyn DynamicResource<String> = &resource;
        let plan = Value::from_json(json!({"id": null, "text": "hello", "owner": null}));

        let state = dynamic.create(&"n".to_string(), &plan).await.unwrap();
        assert_eq!(
            state.to_json(),
            json!({"id": "n-1", "text": "hello", "owner": null})
        );
        assert_eq!(resource.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dynamic_read_removed() {
        let resource = Notes::default();
        let state = Value::from_json(json!({"id": "gone", "text": "x"}));
        let read = DynamicResource::read(&resource, &String::new(), &state)
            .await
            .unwrap();
        assert!(read.is_none());
    }

    #[tokio::test]
    async fn test_default_import_seeds_id() {
        let resource = Notes::default();
        let state = DynamicResource::import(&resource, &String::new(), "abc")
            .await
            .unwrap();
        assert_eq!(
            state.to_json(),
            json!({"id": "abc", "text": null, "owner": null})
        );
    }

    #[test]
    fn test_from_value_treats_unknown_as_null() {
        let value = Value::Object(
            [("id".to_string(), Value::Unknown), ("text".to_string(), Value::from("t"))]
                .into_iter()
                .collect(),
        );
        let state: NoteState = from_value(&value).unwrap();
        assert_eq!(state.id, None);
        assert_eq!(state.text.as_deref(), Some("t"));
    }
}
