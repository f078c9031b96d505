//! Resource, data source and provider schemas

use std::collections::BTreeMap;

use serde_json::json;

use crate::diagnostics::Diagnostics;
use crate::proto;
use crate::value::Value;

/// Type of an attribute value, serialized as cty type JSON
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(BTreeMap<String, AttributeType>),
}

impl AttributeType {
    pub fn list_of(elem: AttributeType) -> Self {
        AttributeType::List(Box::new(elem))
    }

    pub fn set_of(elem: AttributeType) -> Self {
        AttributeType::Set(Box::new(elem))
    }

    pub fn map_of(elem: AttributeType) -> Self {
        AttributeType::Map(Box::new(elem))
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AttributeType::String => json!("string"),
            AttributeType::Number => json!("number"),
            AttributeType::Bool => json!("bool"),
            AttributeType::List(elem) => json!(["list", elem.to_json()]),
            AttributeType::Set(elem) => json!(["set", elem.to_json()]),
            AttributeType::Map(elem) => json!(["map", elem.to_json()]),
            AttributeType::Object(attrs) => {
                let attrs: serde_json::Map<String, serde_json::Value> = attrs
                    .iter()
                    .map(|(name, ty)| (name.clone(), ty.to_json()))
                    .collect();
                json!(["object", attrs])
            }
        }
    }
}

/// Nesting mode of a nested attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nesting {
    Single,
    List,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NestedAttributes {
    pub nesting: Nesting,
    pub attributes: Vec<Attribute>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub ty: AttributeType,
    pub nested: Option<NestedAttributes>,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    /// A change to this attribute destroys and recreates the resource
    pub requires_replace: bool,
    /// Keep the prior state value in plans instead of marking it unknown
    pub use_state_for_unknown: bool,
    /// Allowed values for string attributes
    pub one_of: Vec<String>,
}

impl Attribute {
    fn new(name: &str, ty: AttributeType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            nested: None,
            description: String::new(),
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            requires_replace: false,
            use_state_for_unknown: false,
            one_of: Vec::new(),
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, AttributeType::Number)
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn list(name: &str, elem: AttributeType) -> Self {
        Self::new(name, AttributeType::list_of(elem))
    }

    pub fn set(name: &str, elem: AttributeType) -> Self {
        Self::new(name, AttributeType::set_of(elem))
    }

    pub fn map(name: &str, elem: AttributeType) -> Self {
        Self::new(name, AttributeType::map_of(elem))
    }

    /// Attribute holding one object with its own attributes
    pub fn single_nested(name: &str, attributes: Vec<Attribute>) -> Self {
        let ty = object_type(&attributes);
        let mut attr = Self::new(name, ty);
        attr.nested = Some(NestedAttributes {
            nesting: Nesting::Single,
            attributes,
        });
        attr
    }

    /// Attribute holding a list of objects
    pub fn list_nested(name: &str, attributes: Vec<Attribute>) -> Self {
        let ty = AttributeType::list_of(object_type(&attributes));
        let mut attr = Self::new(name, ty);
        attr.nested = Some(NestedAttributes {
            nesting: Nesting::List,
            attributes,
        });
        attr
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    pub fn use_state_for_unknown(mut self) -> Self {
        self.use_state_for_unknown = true;
        self
    }

    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.one_of = values.iter().map(|v| v.to_string()).collect();
        self
    }

    fn to_proto(&self) -> proto::schema::Attribute {
        let (ty, nested_type) = match &self.nested {
            Some(nested) => {
                let nesting = match nested.nesting {
                    Nesting::Single => proto::schema::object::NestingMode::Single,
                    Nesting::List => proto::schema::object::NestingMode::List,
                };
                let object = proto::schema::Object {
                    attributes: nested.attributes.iter().map(Attribute::to_proto).collect(),
                    nesting: nesting as i32,
                };
                (Vec::new(), Some(object))
            }
            None => (self.ty.to_json().to_string().into_bytes(), None),
        };

        proto::schema::Attribute {
            name: self.name.clone(),
            r#type: ty,
            nested_type,
            description: self.description_with_values(),
            required: self.required,
            optional: self.optional,
            computed: self.computed,
            sensitive: self.sensitive,
            description_kind: proto::StringKind::Plain as i32,
            deprecated: false,
        }
    }

    fn description_with_values(&self) -> String {
        if self.one_of.is_empty() {
            return self.description.clone();
        }
        let allowed = self.one_of.join(", ");
        if self.description.is_empty() {
            format!("One of: {allowed}.")
        } else {
            format!("{} One of: {allowed}.", self.description)
        }
    }

    fn validate(&self, value: &Value, path: &mut Vec<String>, diags: &mut Diagnostics) {
        path.push(self.name.clone());

        if !self.one_of.is_empty()
            && let Value::String(s) = value
            && !self.one_of.iter().any(|allowed| allowed == s)
        {
            diags.attribute_error(
                path.clone(),
                "Invalid attribute value",
                format!(
                    "{} must be one of [{}], got {s:?}",
                    self.name,
                    self.one_of.join(", ")
                ),
            );
        }

        if let Some(nested) = &self.nested {
            match value {
                Value::Object(_) => validate_attributes(&nested.attributes, value, path, diags),
                Value::List(items) => {
                    for item in items {
                        validate_attributes(&nested.attributes, item, path, diags);
                    }
                }
                _ => {}
            }
        }

        path.pop();
    }
}

fn object_type(attributes: &[Attribute]) -> AttributeType {
    AttributeType::Object(
        attributes
            .iter()
            .map(|a| (a.name.clone(), a.ty.clone()))
            .collect(),
    )
}

fn validate_attributes(
    attributes: &[Attribute],
    value: &Value,
    path: &mut Vec<String>,
    diags: &mut Diagnostics,
) {
    if !matches!(value, Value::Object(_)) {
        return;
    }
    for attr in attributes {
        let v = value.get(&attr.name).unwrap_or(&Value::Null);
        if attr.required && v.is_null() {
            let mut attr_path = path.clone();
            attr_path.push(attr.name.clone());
            diags.attribute_error(
                attr_path,
                "Missing required argument",
                format!("the argument {} is required", attr.name),
            );
            continue;
        }
        attr.validate(v, path, diags);
    }
}

/// Every state is written at this version; upgrades only conform attributes
const SCHEMA_VERSION: i64 = 0;

/// Schema of a provider, resource or data source
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    pub description: String,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Object type of a whole value described by this schema
    pub fn value_type(&self) -> AttributeType {
        object_type(&self.attributes)
    }

    /// Check allowed values; absence and type checks are left to Terraform
    pub fn validate(&self, config: &Value, diags: &mut Diagnostics) {
        let mut path = Vec::new();
        validate_attributes(&self.attributes, config, &mut path, diags);
    }

    pub fn to_proto(&self) -> proto::Schema {
        proto::Schema {
            version: SCHEMA_VERSION,
            block: Some(proto::schema::Block {
                version: SCHEMA_VERSION,
                attributes: self.attributes.iter().map(Attribute::to_proto).collect(),
                description: self.description.clone(),
                description_kind: proto::StringKind::Plain as i32,
                deprecated: false,
            }),
        }
    }
}
