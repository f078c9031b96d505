//! Dynamic attribute values and their msgpack wire encoding
//!
//! Terraform exchanges object values as msgpack documents. Unknown values
//! travel as a msgpack extension. Encoding is driven by the schema type so
//! objects always carry exactly the declared attributes.

use std::collections::BTreeMap;

use crate::error::PluginError;
use crate::schema::AttributeType;

/// A dynamically typed attribute value
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    /// Not yet known during planning
    Unknown,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    /// Lists and sets
    List(Vec<Value>),
    /// Objects and maps
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// True when neither this value nor any nested value is unknown
    pub fn is_fully_known(&self) -> bool {
        match self {
            Value::Unknown => false,
            Value::List(items) => items.iter().all(Value::is_fully_known),
            Value::Object(map) => map.values().all(Value::is_fully_known),
            _ => true,
        }
    }

    /// Attribute lookup on an object value; absent for everything else
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(name),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to JSON; unknown values become null
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Unknown => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode a msgpack document sent by Terraform
pub fn from_msgpack(bytes: &[u8]) -> Result<Value, PluginError> {
    let mut reader = bytes;
    let raw = rmpv::decode::read_value(&mut reader)
        .map_err(|e| PluginError::Decode(e.to_string()))?;
    from_rmpv(raw)
}

fn from_rmpv(raw: rmpv::Value) -> Result<Value, PluginError> {
    let value = match raw {
        rmpv::Value::Nil => Value::Null,
        rmpv::Value::Boolean(b) => Value::Bool(b),
        rmpv::Value::Integer(i) => {
            if let Some(n) = i.as_i64() {
                Value::Number(n.into())
            } else if let Some(n) = i.as_u64() {
                Value::Number(n.into())
            } else {
                return Err(PluginError::Decode(format!("integer out of range: {i:?}")));
            }
        }
        rmpv::Value::F32(f) => number_from_f64(f64::from(f))?,
        rmpv::Value::F64(f) => number_from_f64(f)?,
        rmpv::Value::String(s) => match s.into_str() {
            Some(s) => Value::String(s),
            None => return Err(PluginError::Decode("string is not valid UTF-8".to_string())),
        },
        rmpv::Value::Binary(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        rmpv::Value::Array(items) => Value::List(
            items
                .into_iter()
                .map(from_rmpv)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        rmpv::Value::Map(entries) => {
            let mut map = BTreeMap::new();
            for (key, value) in entries {
                let key = match key {
                    rmpv::Value::String(s) => s.into_str().ok_or_else(|| {
                        PluginError::Decode("map key is not valid UTF-8".to_string())
                    })?,
                    other => {
                        return Err(PluginError::Decode(format!(
                            "map key must be a string, got {other}"
                        )));
                    }
                };
                map.insert(key, from_rmpv(value)?);
            }
            Value::Object(map)
        }
        // Unknown values are the only extension Terraform sends
        rmpv::Value::Ext(_, _) => Value::Unknown,
    };
    Ok(value)
}

fn number_from_f64(f: f64) -> Result<Value, PluginError> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        return Ok(Value::Number((f as i64).into()));
    }
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| PluginError::Decode(format!("number is not finite: {f}")))
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode a value as msgpack according to its type
pub fn to_msgpack(value: &Value, ty: &AttributeType) -> Result<Vec<u8>, PluginError> {
    let raw = to_rmpv(value, ty)?;
    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, &raw).map_err(|e| PluginError::Encode(e.to_string()))?;
    Ok(buf)
}

fn mismatch(ty: &AttributeType, value: &Value) -> PluginError {
    PluginError::TypeMismatch {
        expected: ty.to_json().to_string(),
        found: format!("{value:?}"),
    }
}

fn to_rmpv(value: &Value, ty: &AttributeType) -> Result<rmpv::Value, PluginError> {
    let raw = match (value, ty) {
        (Value::Null, _) => rmpv::Value::Nil,
        (Value::Unknown, _) => rmpv::Value::Ext(0, vec![0]),

        (Value::Bool(b), AttributeType::Bool) => rmpv::Value::Boolean(*b),
        (Value::String(s), AttributeType::Bool) => match s.as_str() {
            "true" => rmpv::Value::Boolean(true),
            "false" => rmpv::Value::Boolean(false),
            _ => return Err(mismatch(ty, value)),
        },

        (Value::Number(n), AttributeType::Number) => number_to_rmpv(n),
        (Value::String(s), AttributeType::Number) => {
            let n: serde_json::Number = s.parse().map_err(|_| mismatch(ty, value))?;
            number_to_rmpv(&n)
        }

        (Value::String(s), AttributeType::String) => rmpv::Value::String(s.clone().into()),
        (Value::Bool(b), AttributeType::String) => rmpv::Value::String(b.to_string().into()),
        (Value::Number(n), AttributeType::String) => rmpv::Value::String(n.to_string().into()),

        (Value::List(items), AttributeType::List(elem) | AttributeType::Set(elem)) => {
            rmpv::Value::Array(
                items
                    .iter()
                    .map(|item| to_rmpv(item, elem))
                    .collect::<Result<Vec<_>, _>>()?,
            )
        }

        (Value::Object(map), AttributeType::Map(elem)) => rmpv::Value::Map(
            map.iter()
                .map(|(k, v)| Ok((rmpv::Value::String(k.clone().into()), to_rmpv(v, elem)?)))
                .collect::<Result<Vec<_>, PluginError>>()?,
        ),

        (Value::Object(map), AttributeType::Object(attrs)) => rmpv::Value::Map(
            attrs
                .iter()
                .map(|(name, attr_ty)| {
                    let v = map.get(name).unwrap_or(&Value::Null);
                    Ok((rmpv::Value::String(name.clone().into()), to_rmpv(v, attr_ty)?))
                })
                .collect::<Result<Vec<_>, PluginError>>()?,
        ),

        _ => return Err(mismatch(ty, value)),
    };
    Ok(raw)
}

fn number_to_rmpv(n: &serde_json::Number) -> rmpv::Value {
    if let Some(i) = n.as_i64() {
        rmpv::Value::from(i)
    } else if let Some(u) = n.as_u64() {
        rmpv::Value::from(u)
    } else {
        rmpv::Value::F64(n.as_f64().unwrap_or_default())
    }
}

/// Make a value conform to a type: objects get exactly the declared
/// attributes and missing ones become null
pub fn conform(value: &Value, ty: &AttributeType) -> Value {
    match (value, ty) {
        (Value::Object(map), AttributeType::Object(attrs)) => Value::Object(
            attrs
                .iter()
                .map(|(name, attr_ty)| {
                    let v = map.get(name).unwrap_or(&Value::Null);
                    (name.clone(), conform(v, attr_ty))
                })
                .collect(),
        ),
        (Value::Object(map), AttributeType::Map(elem)) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), conform(v, elem)))
                .collect(),
        ),
        (Value::List(items), AttributeType::List(elem) | AttributeType::Set(elem)) => {
            Value::List(items.iter().map(|item| conform(item, elem)).collect())
        }
        _ => value.clone(),
    }
}
