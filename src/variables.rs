//! variables value model
//!
//! generated input types describe themselves as a [`Shape`] so the upload
//! packer can walk them structurally. [`Optional`] keeps "absent" and
//! "null" apart for nullable inputs.

use crate::upload::Upload;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// structural view of a variables value
#[derive(Debug, Clone)]
pub enum Shape<'a> {
    /// anything that can not hold an upload
    Leaf,
    /// a file value carried out-of-band in multipart mode
    Upload(&'a Upload),
    /// ordered sequence, entered by index
    Sequence(Vec<Shape<'a>>),
    /// record, entered by wire key
    Record(Vec<(&'a str, Shape<'a>)>),
}

/// describe a value's structure for the upload packer
pub trait ToShape {
    fn shape(&self) -> Shape<'_>;
}

/// a value usable as the variables of a request
pub trait Variables: Serialize + ToShape + Send + Sync {}

impl<T: Serialize + ToShape + Send + Sync> Variables for T {}

macro_rules! leaf_shape {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToShape for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Leaf
                }
            }
        )*
    };
}

leaf_shape!(
    (),
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    str,
    serde_json::Value,
);

impl ToShape for Upload {
    fn shape(&self) -> Shape<'_> {
        Shape::Upload(self)
    }
}

impl<T: ToShape> ToShape for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(value) => value.shape(),
            None => Shape::Leaf,
        }
    }
}

impl<T: ToShape> ToShape for Box<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: ToShape> ToShape for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(self.iter().map(ToShape::shape).collect())
    }
}

impl<T: ToShape + ?Sized> ToShape for &T {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

/// nullable input value that distinguishes "not sent" from "sent as null"
///
/// fields of this type should be annotated with
/// `#[serde(default, skip_serializing_if = "Optional::is_absent")]` so that
/// `Absent` drops the key and lets the server apply its own default.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Optional<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Optional<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Optional::Absent)
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Optional::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<T> for Optional<T> {
    fn from(value: T) -> Self {
        Optional::Value(value)
    }
}

impl<T> From<Option<T>> for Optional<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Optional::Value(value),
            None => Optional::Null,
        }
    }
}

impl<T: Serialize> Serialize for Optional<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Optional::Value(value) => value.serialize(serializer),
            Optional::Absent | Optional::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Optional<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

impl<T: ToShape> ToShape for Optional<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Optional::Value(value) => value.shape(),
            _ => Shape::Leaf,
        }
    }
}
