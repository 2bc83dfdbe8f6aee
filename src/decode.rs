//! dynamic response decoding
//!
//! decodes a response `data` value against a [`BindingSet`] without
//! generated code. polymorphic positions pick their variant from the
//! `__typename` discriminator; object fields come back in selection order.

use crate::error::DecodeError;
use crate::synth::{BindingSet, FieldType, ResponseShape};
use serde_json::{Map, Value};

/// a decoded response value
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Null,
    /// scalar or enum value as sent
    Leaf(Value),
    List(Vec<Decoded>),
    Object(DecodedObject),
}

impl Decoded {
    pub fn as_object(&self) -> Option<&DecodedObject> {
        match self {
            Decoded::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Decoded]> {
        match self {
            Decoded::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Value> {
        match self {
            Decoded::Leaf(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Decoded::Null)
    }

    /// back to json
    pub fn to_json(&self) -> Value {
        match self {
            Decoded::Null => Value::Null,
            Decoded::Leaf(value) => value.clone(),
            Decoded::List(items) => Value::Array(items.iter().map(Decoded::to_json).collect()),
            Decoded::Object(object) => object.to_json(),
        }
    }
}

/// an object decoded with a named shape
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedObject {
    /// shape name, e.g. `GetNodeNodeUser`
    pub shape: String,
    /// concrete graphql type
    pub type_name: String,
    /// fields in selection order, keyed by response key
    pub fields: Vec<(String, Decoded)>,
}

impl DecodedObject {
    pub fn get(&self, key: &str) -> Option<&Decoded> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.to_json());
        }
        Value::Object(map)
    }
}

impl BindingSet {
    /// decode a response `data` value into the root response shape
    pub fn decode(&self, data: &Value) -> Result<DecodedObject, DecodeError> {
        let root = self.shape(&self.response).ok_or_else(|| DecodeError::TypeMismatch {
            expected: format!("shape `{}`", self.response),
            path: String::new(),
        })?;
        let object = data.as_object().ok_or_else(|| DecodeError::TypeMismatch {
            expected: "object".to_string(),
            path: String::new(),
        })?;
        self.decode_object(root, object, "")
    }

    fn decode_object(
        &self,
        shape: &ResponseShape,
        object: &Map<String, Value>,
        path: &str,
    ) -> Result<DecodedObject, DecodeError> {
        let mut fields = Vec::with_capacity(shape.fields.len());
        for field in &shape.fields {
            let field_path = join(path, &field.wire_key);
            let decoded = match object.get(&field.wire_key) {
                None if field.ty.is_optional() => Decoded::Null,
                None => return Err(DecodeError::MissingField { path: field_path }),
                Some(value) => self.decode_value(&field.ty, value, &field_path)?,
            };
            fields.push((field.wire_key.clone(), decoded));
        }
        Ok(DecodedObject {
            shape: shape.name.clone(),
            type_name: shape.type_name.clone(),
            fields,
        })
    }

    fn decode_value(&self, ty: &FieldType, value: &Value, path: &str) -> Result<Decoded, DecodeError> {
        match ty {
            FieldType::Optional(_) if value.is_null() => Ok(Decoded::Null),
            FieldType::Optional(inner) => self.decode_value(inner, value, path),
            _ if value.is_null() => Err(DecodeError::UnexpectedNull {
                path: path.to_string(),
            }),
            FieldType::List(inner) => {
                let items = value.as_array().ok_or_else(|| mismatch("list", path))?;
                items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| self.decode_value(inner, item, &join(path, &idx.to_string())))
                    .collect::<Result<_, _>>()
                    .map(Decoded::List)
            }
            FieldType::Scalar(name) => {
                check_scalar(name, value, path)?;
                Ok(Decoded::Leaf(value.clone()))
            }
            FieldType::Enum(_) => {
                if !value.is_string() {
                    return Err(mismatch("enum value", path));
                }
                Ok(Decoded::Leaf(value.clone()))
            }
            FieldType::Object(name) | FieldType::InputObject(name) => {
                let shape = self.shape(name).ok_or_else(|| mismatch(name, path))?;
                let object = value.as_object().ok_or_else(|| mismatch("object", path))?;
                self.decode_object(shape, object, path).map(Decoded::Object)
            }
            FieldType::Polymorphic(name) => {
                let poly = self.polymorphic(name).ok_or_else(|| mismatch(name, path))?;
                let object = value.as_object().ok_or_else(|| mismatch("object", path))?;
                let typename = match object.get(&poly.discriminator) {
                    None | Some(Value::Null) => {
                        return Err(DecodeError::MissingDiscriminator {
                            type_name: poly.abstract_type.clone(),
                            path: path.to_string(),
                        })
                    }
                    Some(Value::String(typename)) => typename.clone(),
                    Some(other) => other.to_string(),
                };
                let variant = poly.variant(&typename).ok_or_else(|| DecodeError::UnknownVariant {
                    type_name: poly.abstract_type.clone(),
                    typename: typename.clone(),
                    path: path.to_string(),
                })?;
                self.decode_object(&variant.shape, object, path)
                    .map(Decoded::Object)
            }
        }
    }
}

fn check_scalar(name: &str, value: &Value, path: &str) -> Result<(), DecodeError> {
    let ok = match name {
        "Int" => value.is_i64() || value.is_u64(),
        "Float" => value.is_number(),
        "String" => value.is_string(),
        "Boolean" => value.is_boolean(),
        "ID" => value.is_string() || value.is_number(),
        // custom scalars are passed through untouched
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(mismatch(name, path))
    }
}

fn mismatch(expected: &str, path: &str) -> DecodeError {
    DecodeError::TypeMismatch {
        expected: expected.to_string(),
        path: path.to_string(),
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
