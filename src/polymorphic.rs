//! runtime support for generated interface and union types
//!
//! generated enums implement [`Polymorphic`] and route their `Deserialize`
//! impl through [`deserialize_polymorphic`], which reads the `__typename`
//! discriminator and picks the matching variant.

use crate::error::{DecodeError, Error, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// wire key naming the concrete type of a polymorphic value
pub const DISCRIMINATOR: &str = "__typename";

/// a generated interface or union type
pub trait Polymorphic: Sized {
    /// interface or union the selection was made on
    const TYPE_NAME: &'static str;
    /// concrete types with a variant, in schema order
    const POSSIBLE_TYPES: &'static [&'static str];

    /// decode `value` as the variant for `typename`
    ///
    /// only called with a member of [`Self::POSSIBLE_TYPES`].
    fn decode_variant(typename: &str, value: Value) -> std::result::Result<Self, serde_json::Error>;

    /// concrete type of this value
    fn variant_name(&self) -> &'static str;
}

/// decode a polymorphic value by its discriminator
pub fn decode_polymorphic<T: Polymorphic>(value: Value) -> Result<T> {
    let typename = match value.get(DISCRIMINATOR) {
        None | Some(Value::Null) => {
            return Err(DecodeError::MissingDiscriminator {
                type_name: T::TYPE_NAME.to_string(),
                path: String::new(),
            }
            .into())
        }
        Some(Value::String(typename)) => typename.clone(),
        Some(other) => other.to_string(),
    };

    if !T::POSSIBLE_TYPES.contains(&typename.as_str()) {
        return Err(DecodeError::UnknownVariant {
            type_name: T::TYPE_NAME.to_string(),
            typename,
            path: String::new(),
        }
        .into());
    }

    T::decode_variant(&typename, value).map_err(Error::Json)
}

/// `Deserialize` body for generated polymorphic types
pub fn deserialize_polymorphic<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Polymorphic,
{
    let value = Value::deserialize(deserializer)?;
    decode_polymorphic(value).map_err(|err| match err {
        Error::Decode(err) => serde::de::Error::custom(err),
        Error::Json(err) => serde::de::Error::custom(err),
        other => serde::de::Error::custom(other),
    })
}
