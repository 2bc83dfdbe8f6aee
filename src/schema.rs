//! schema model
//!
//! an immutable, owned view of an sdl document: type definitions keyed by
//! name, root operation types, and the possible-type sets of interfaces and
//! unions.

use crate::error::ValidationError;
use graphql_parser::schema::{self as sdl, Definition, TypeDefinition};
use std::collections::BTreeMap;
use std::fmt;

const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// a graphql type reference with its list/non-null wrapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// innermost named type
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.base_name(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// the type with one outer non-null wrapper removed
    pub fn nullable(&self) -> &TypeRef {
        match self {
            TypeRef::NonNull(inner) => inner,
            other => other,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{name}"),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
            TypeRef::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

impl<'a> From<&sdl::Type<'a, String>> for TypeRef {
    fn from(ty: &sdl::Type<'a, String>) -> Self {
        match ty {
            sdl::Type::NamedType(name) => TypeRef::Named(name.clone()),
            sdl::Type::ListType(inner) => TypeRef::List(Box::new(TypeRef::from(inner.as_ref()))),
            sdl::Type::NonNullType(inner) => {
                TypeRef::NonNull(Box::new(TypeRef::from(inner.as_ref())))
            }
        }
    }
}

/// kind of a named schema type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

impl TypeKind {
    /// scalars and enums
    pub fn is_leaf(self) -> bool {
        matches!(self, TypeKind::Scalar | TypeKind::Enum)
    }

    /// interfaces and unions
    pub fn is_abstract(self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Union)
    }

    /// types allowed as variable and input field types
    pub fn is_input(self) -> bool {
        matches!(self, TypeKind::Scalar | TypeKind::Enum | TypeKind::InputObject)
    }
}

/// argument or input object field
#[derive(Debug, Clone)]
pub struct InputValueDef {
    pub name: String,
    pub ty: TypeRef,
    /// declared default, kept as the schema wrote it
    pub default: Option<sdl::Value<'static, String>>,
    pub description: Option<String>,
}

/// output field of an object or interface
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    pub arguments: Vec<InputValueDef>,
    pub description: Option<String>,
}

/// one named schema type
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
    pub description: Option<String>,
    /// object and interface fields
    pub fields: Vec<FieldDef>,
    /// input object fields
    pub input_fields: Vec<InputValueDef>,
    /// enum values
    pub enum_values: Vec<String>,
    /// interfaces an object implements, or union members
    pub members: Vec<String>,
}

impl TypeDef {
    fn new(name: &str, kind: TypeKind, description: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description,
            fields: Vec::new(),
            input_fields: Vec::new(),
            enum_values: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// parsed schema
#[derive(Debug, Clone)]
pub struct Schema {
    types: BTreeMap<String, TypeDef>,
    query_type: String,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
    possible_types: BTreeMap<String, Vec<String>>,
}

impl Schema {
    /// parse sdl text
    pub fn parse(source: &str) -> Result<Self, ValidationError> {
        let document = sdl::parse_schema::<String>(source)
            .map_err(|err| ValidationError::SchemaParse(err.to_string()))?;
        Ok(Self::from_document(&document))
    }

    fn from_document(document: &sdl::Document<'_, String>) -> Self {
        let mut types = BTreeMap::new();
        let mut object_order = Vec::new();
        let mut query_type = None;
        let mut mutation_type = None;
        let mut subscription_type = None;
        let mut explicit_roots = false;

        for name in BUILTIN_SCALARS {
            types.insert(name.to_string(), TypeDef::new(name, TypeKind::Scalar, None));
        }

        for def in &document.definitions {
            match def {
                Definition::SchemaDefinition(schema) => {
                    query_type = schema.query.clone();
                    mutation_type = schema.mutation.clone();
                    subscription_type = schema.subscription.clone();
                    explicit_roots = true;
                }
                Definition::TypeDefinition(ty) => {
                    let def = convert_type(ty);
                    if def.kind == TypeKind::Object {
                        object_order.push(def.name.clone());
                    }
                    types.insert(def.name.clone(), def);
                }
                _ => continue,
            }
        }

        let mut possible_types: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for def in types.values() {
            if def.kind == TypeKind::Union {
                possible_types.insert(def.name.clone(), def.members.clone());
            }
        }
        for object in &object_order {
            if let Some(def) = types.get(object) {
                for interface in &def.members {
                    possible_types
                        .entry(interface.clone())
                        .or_default()
                        .push(object.clone());
                }
            }
        }

        let default_root =
            |name: &str| (!explicit_roots && types.contains_key(name)).then(|| name.to_string());
        let mutation_type = mutation_type.or_else(|| default_root("Mutation"));
        let subscription_type = subscription_type.or_else(|| default_root("Subscription"));

        Self {
            query_type: query_type.unwrap_or_else(|| "Query".to_string()),
            mutation_type,
            subscription_type,
            types,
            possible_types,
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// every type, built-in scalars included, in name order
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// lookup that fails with a validation error
    pub fn require(&self, name: &str) -> Result<&TypeDef, ValidationError> {
        self.get(name)
            .ok_or_else(|| ValidationError::UnknownType(name.to_string()))
    }

    pub fn kind(&self, name: &str) -> Option<TypeKind> {
        self.get(name).map(|def| def.kind)
    }

    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn subscription_type(&self) -> Option<&str> {
        self.subscription_type.as_deref()
    }

    /// concrete object types a value of `name` can have
    ///
    /// an object type's only possible type is itself.
    pub fn possible_types(&self, name: &str) -> Vec<String> {
        match self.kind(name) {
            Some(TypeKind::Object) => vec![name.to_string()],
            Some(TypeKind::Interface | TypeKind::Union) => {
                self.possible_types.get(name).cloned().unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }

    /// true if some concrete type satisfies both `a` and `b`
    pub fn overlaps(&self, a: &str, b: &str) -> bool {
        let left = self.possible_types(a);
        self.possible_types(b).iter().any(|ty| left.contains(ty))
    }

    /// true if every possible type of `inner` is a possible type of `outer`
    pub fn covers(&self, outer: &str, inner: &str) -> bool {
        let outer = self.possible_types(outer);
        self.possible_types(inner).iter().all(|ty| outer.contains(ty))
    }
}

fn convert_type(ty: &TypeDefinition<'_, String>) -> TypeDef {
    match ty {
        TypeDefinition::Scalar(scalar) => {
            TypeDef::new(&scalar.name, TypeKind::Scalar, scalar.description.clone())
        }
        TypeDefinition::Object(obj) => {
            let mut def = TypeDef::new(&obj.name, TypeKind::Object, obj.description.clone());
            def.fields = obj.fields.iter().map(convert_field).collect();
            def.members = obj.implements_interfaces.clone();
            def
        }
        TypeDefinition::Interface(iface) => {
            let mut def =
                TypeDef::new(&iface.name, TypeKind::Interface, iface.description.clone());
            def.fields = iface.fields.iter().map(convert_field).collect();
            def
        }
        TypeDefinition::Union(union_ty) => {
            let mut def =
                TypeDef::new(&union_ty.name, TypeKind::Union, union_ty.description.clone());
            def.members = union_ty.types.clone();
            def
        }
        TypeDefinition::Enum(enum_ty) => {
            let mut def = TypeDef::new(&enum_ty.name, TypeKind::Enum, enum_ty.description.clone());
            def.enum_values = enum_ty.values.iter().map(|v| v.name.clone()).collect();
            def
        }
        TypeDefinition::InputObject(input) => {
            let mut def =
                TypeDef::new(&input.name, TypeKind::InputObject, input.description.clone());
            def.input_fields = input.fields.iter().map(convert_input_value).collect();
            def
        }
    }
}

fn convert_field(field: &sdl::Field<'_, String>) -> FieldDef {
    FieldDef {
        name: field.name.clone(),
        ty: TypeRef::from(&field.field_type),
        arguments: field.arguments.iter().map(convert_input_value).collect(),
        description: field.description.clone(),
    }
}

fn convert_input_value(value: &sdl::InputValue<'_, String>) -> InputValueDef {
    InputValueDef {
        name: value.name.clone(),
        ty: TypeRef::from(&value.value_type),
        default: value.default_value.as_ref().map(to_static_value),
        description: value.description.clone(),
    }
}

/// copy a parsed value out of the document's lifetime
pub(crate) fn to_static_value(value: &sdl::Value<'_, String>) -> sdl::Value<'static, String> {
    match value {
        sdl::Value::Variable(name) => sdl::Value::Variable(name.clone()),
        sdl::Value::Int(number) => sdl::Value::Int(number.clone()),
        sdl::Value::Float(float) => sdl::Value::Float(*float),
        sdl::Value::String(text) => sdl::Value::String(text.clone()),
        sdl::Value::Boolean(flag) => sdl::Value::Boolean(*flag),
        sdl::Value::Null => sdl::Value::Null,
        sdl::Value::Enum(name) => sdl::Value::Enum(name.clone()),
        sdl::Value::List(items) => sdl::Value::List(items.iter().map(to_static_value).collect()),
        sdl::Value::Object(fields) => sdl::Value::Object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), to_static_value(value)))
                .collect(),
        ),
    }
}

/// print a value as a graphql literal
pub fn format_value<'a>(value: &sdl::Value<'a, String>) -> String {
    match value {
        sdl::Value::Variable(name) => format!("${name}"),
        sdl::Value::Int(number) => number
            .as_i64()
            .map(|n| n.to_string())
            .unwrap_or_default(),
        sdl::Value::Float(float) => format!("{float:?}"),
        sdl::Value::String(text) => {
            serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
        }
        sdl::Value::Boolean(flag) => flag.to_string(),
        sdl::Value::Null => "null".to_string(),
        sdl::Value::Enum(name) => name.clone(),
        sdl::Value::List(items) => format!(
            "[{}]",
            items.iter().map(format_value).collect::<Vec<_>>().join(", ")
        ),
        sdl::Value::Object(fields) => format!(
            "{{{}}}",
            fields
                .iter()
                .map(|(key, value)| format!("{key}: {}", format_value(value)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}
