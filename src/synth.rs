//! binding synthesizer
//!
//! turns a resolved operation into a [`BindingSet`]: the named shapes a
//! caller sees. nested selections get names derived from the response key
//! path (`GetNodeNode`, `GetNodeNodeBotOwner`), each interface or union
//! selection becomes a polymorphic shape with one variant per concrete type,
//! and the operation's variables become an input shape plus the schema input
//! objects and enums they reach.

use crate::error::ValidationError;
use crate::naming::{to_rust_field, to_rust_ident};
use crate::resolve::{
    request_discriminators, resolve, OperationKind, ResolvedField, ResolvedOperation,
    ResolvedSelection, TYPENAME,
};
use crate::schema::{format_value, Schema, TypeKind, TypeRef};
use graphql_parser::query::{parse_query, Definition, OperationDefinition};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// how a field's value is represented
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// graphql scalar, by graphql name
    Scalar(String),
    /// schema enum, see [`BindingSet::enums`]
    Enum(String),
    /// single-type response shape, see [`BindingSet::shapes`]
    Object(String),
    /// interface or union response shape, see [`BindingSet::polymorphics`]
    Polymorphic(String),
    /// schema input object, see [`BindingSet::input_objects`]
    InputObject(String),
    List(Box<FieldType>),
    /// nullable value
    Optional(Box<FieldType>),
}

impl FieldType {
    pub fn is_optional(&self) -> bool {
        matches!(self, FieldType::Optional(_))
    }

    /// innermost named type
    pub fn leaf(&self) -> &FieldType {
        match self {
            FieldType::List(inner) | FieldType::Optional(inner) => inner.leaf(),
            other => other,
        }
    }
}

/// one field of a response shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeField {
    /// rust field name
    pub name: String,
    /// response key on the wire
    pub wire_key: String,
    /// graphql field name, differs from `wire_key` when aliased
    pub graphql_name: String,
    pub ty: FieldType,
}

/// single-type response shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseShape {
    pub name: String,
    /// graphql type the shape was selected on
    pub type_name: String,
    /// fields in selection order
    pub fields: Vec<ShapeField>,
}

impl ResponseShape {
    pub fn field(&self, wire_key: &str) -> Option<&ShapeField> {
        self.fields.iter().find(|field| field.wire_key == wire_key)
    }
}

/// one concrete type of a polymorphic shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantShape {
    pub type_name: String,
    pub shape: ResponseShape,
}

/// interface or union response shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolymorphicShape {
    pub name: String,
    /// interface or union the selection was made on
    pub abstract_type: String,
    /// wire key naming the concrete type
    pub discriminator: String,
    /// fields every variant exposes with the same type
    pub common: Vec<ShapeField>,
    /// one variant per possible type, in schema order
    pub variants: Vec<VariantShape>,
}

impl PolymorphicShape {
    pub fn variant(&self, type_name: &str) -> Option<&VariantShape> {
        self.variants
            .iter()
            .find(|variant| variant.type_name == type_name)
    }
}

/// one field of an input shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    /// rust field name
    pub name: String,
    /// key on the wire
    pub wire_key: String,
    pub ty: FieldType,
    /// default literal as written in the operation or schema
    pub default: Option<String>,
}

impl InputField {
    /// nullable or defaulted inputs may be omitted
    pub fn is_optional(&self) -> bool {
        self.ty.is_optional() || self.default.is_some()
    }
}

/// operation variables or a schema input object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputShape {
    pub name: String,
    /// schema input object name; `None` for the operation's variables
    pub graphql_name: Option<String>,
    pub fields: Vec<InputField>,
}

/// schema enum used by the operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumShape {
    pub name: String,
    pub graphql_name: String,
    /// values in schema order
    pub values: Vec<String>,
}

/// everything generated for one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingSet {
    pub operation: String,
    pub kind: OperationKind,
    /// literal query text
    pub query: String,
    /// operation input type, variables in declaration order
    pub input: InputShape,
    /// schema input objects reachable from the variables, first use first
    pub input_objects: Vec<InputShape>,
    /// enums reachable from variables or the response, first use first
    pub enums: Vec<EnumShape>,
    /// name of the root response shape
    pub response: String,
    /// single-type shapes, children before parents, root last
    pub shapes: Vec<ResponseShape>,
    pub polymorphics: Vec<PolymorphicShape>,
    /// true if any variable reaches the upload scalar
    pub uploads: bool,
}

impl BindingSet {
    /// shape by name, including polymorphic variants
    pub fn shape(&self, name: &str) -> Option<&ResponseShape> {
        self.shapes
            .iter()
            .chain(
                self.polymorphics
                    .iter()
                    .flat_map(|poly| poly.variants.iter().map(|variant| &variant.shape)),
            )
            .find(|shape| shape.name == name)
    }

    pub fn polymorphic(&self, name: &str) -> Option<&PolymorphicShape> {
        self.polymorphics.iter().find(|poly| poly.name == name)
    }

    pub fn response_shape(&self) -> Option<&ResponseShape> {
        self.shape(&self.response)
    }

    pub fn input_object(&self, name: &str) -> Option<&InputShape> {
        self.input_objects.iter().find(|input| input.name == name)
    }
}

/// options for synthesis and rendering
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// schema scalar treated as a file upload
    pub upload_scalar: String,
    /// path generated code uses to reach this crate
    pub crate_path: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            upload_scalar: "Upload".to_string(),
            crate_path: "gqlbind".to_string(),
        }
    }
}

impl CodegenOptions {
    pub fn with_upload_scalar(mut self, name: impl Into<String>) -> Self {
        self.upload_scalar = name.into();
        self
    }

    pub fn with_crate_path(mut self, path: impl Into<String>) -> Self {
        self.crate_path = path.into();
        self
    }
}

/// bindings for every operation of a document that resolved cleanly
#[derive(Debug, Clone, Default)]
pub struct Generated {
    pub bindings: Vec<BindingSet>,
    /// operations that failed, by name (`<anonymous>` if unnamed)
    pub failures: Vec<(String, ValidationError)>,
}

/// resolve and synthesize every operation in `source`
///
/// a failing operation is recorded in [`Generated::failures`] and does not
/// affect the others. only a document that fails to parse is an error.
pub fn generate(
    schema: &Schema,
    source: &str,
    options: &CodegenOptions,
) -> Result<Generated, ValidationError> {
    let mut document = parse_query::<String>(source)
        .map_err(|err| ValidationError::DocumentParse(err.to_string()))?;
    request_discriminators(schema, &mut document);

    let mut generated = Generated::default();
    for definition in &document.definitions {
        let Definition::Operation(operation) = definition else {
            continue;
        };
        let label = operation_label(operation);
        match resolve(schema, &document, operation)
            .and_then(|resolved| synthesize(schema, &resolved, options))
            .and_then(|bindings| {
                let taken: BTreeSet<&str> = generated
                    .bindings
                    .iter()
                    .flat_map(operation_type_names)
                    .collect();
                let collision = operation_type_names(&bindings)
                    .find(|name| taken.contains(name))
                    .map(str::to_string);
                match collision {
                    Some(name) => Err(ValidationError::NameCollision(name)),
                    None => Ok(bindings),
                }
            })
        {
            Ok(bindings) => {
                debug!(
                    operation = %label,
                    shapes = bindings.shapes.len(),
                    polymorphics = bindings.polymorphics.len(),
                    "synthesized bindings"
                );
                generated.bindings.push(bindings);
            }
            Err(err) => {
                warn!(operation = %label, error = %err, "operation rejected");
                generated.failures.push((label, err));
            }
        }
    }

    Ok(generated)
}

/// type names owned by one operation; enums and input objects are shared
fn operation_type_names(set: &BindingSet) -> impl Iterator<Item = &str> + '_ {
    std::iter::once(set.input.name.as_str())
        .chain(set.shapes.iter().map(|shape| shape.name.as_str()))
        .chain(set.polymorphics.iter().flat_map(|poly| {
            std::iter::once(poly.name.as_str())
                .chain(poly.variants.iter().map(|variant| variant.shape.name.as_str()))
        }))
}

fn operation_label(operation: &OperationDefinition<'_, String>) -> String {
    let name = match operation {
        OperationDefinition::Query(query) => query.name.clone(),
        OperationDefinition::Mutation(mutation) => mutation.name.clone(),
        OperationDefinition::Subscription(subscription) => subscription.name.clone(),
        OperationDefinition::SelectionSet(_) => None,
    };
    name.unwrap_or_else(|| "<anonymous>".to_string())
}

/// derive the binding set for one resolved operation
pub fn synthesize(
    schema: &Schema,
    operation: &ResolvedOperation,
    options: &CodegenOptions,
) -> Result<BindingSet, ValidationError> {
    let mut synth = Synthesizer {
        schema,
        options,
        shapes: Vec::new(),
        polymorphics: Vec::new(),
        enums: Vec::new(),
        input_objects: Vec::new(),
        uploads: false,
        taken: BTreeSet::new(),
    };

    let prefix = to_rust_ident(&operation.name);
    let marker = match operation.kind {
        OperationKind::Query => format!("{prefix}Query"),
        OperationKind::Mutation => format!("{prefix}Mutation"),
    };
    synth.taken.insert(marker);
    let input = synth.variables(&prefix, operation)?;

    let response = synth.claim(format!("{prefix}Response"));
    let root = synth.object_shape(
        &response,
        &prefix,
        &operation.selection.parent_type,
        &operation.selection.fields,
    )?;
    synth.shapes.push(root);

    Ok(BindingSet {
        operation: operation.name.clone(),
        kind: operation.kind,
        query: operation.query.clone(),
        input,
        input_objects: synth.input_objects,
        enums: synth.enums,
        response,
        shapes: synth.shapes,
        polymorphics: synth.polymorphics,
        uploads: synth.uploads,
    })
}

struct Synthesizer<'s> {
    schema: &'s Schema,
    options: &'s CodegenOptions,
    shapes: Vec<ResponseShape>,
    polymorphics: Vec<PolymorphicShape>,
    enums: Vec<EnumShape>,
    input_objects: Vec<InputShape>,
    uploads: bool,
    /// generated type names already handed out
    taken: BTreeSet<String>,
}

impl<'s> Synthesizer<'s> {
    /// `base`, or `base2`, `base3`, .. if another generated type or a schema
    /// enum or input object already uses it
    fn claim(&mut self, base: String) -> String {
        let mut candidate = base.clone();
        let mut n = 2;
        while self.taken.contains(&candidate) || self.schema_type_named(&candidate) {
            candidate = format!("{base}{n}");
            n += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    fn schema_type_named(&self, rust_name: &str) -> bool {
        self.schema.types().any(|def| {
            matches!(def.kind, TypeKind::Enum | TypeKind::InputObject)
                && to_rust_ident(&def.name) == rust_name
        })
    }

    fn variables(
        &mut self,
        prefix: &str,
        operation: &ResolvedOperation,
    ) -> Result<InputShape, ValidationError> {
        let mut fields = Vec::with_capacity(operation.variables.len());
        for variable in &operation.variables {
            fields.push(InputField {
                name: to_rust_field(&variable.name),
                wire_key: variable.name.clone(),
                ty: self.input_type(&variable.ty)?,
                default: variable.default.as_ref().map(format_value),
            });
        }
        Ok(InputShape {
            name: self.claim(format!("{prefix}Variables")),
            graphql_name: None,
            fields,
        })
    }

    fn input_type(&mut self, ty: &TypeRef) -> Result<FieldType, ValidationError> {
        let name = ty.base_name();
        let named = match self.schema.require(name)?.kind {
            TypeKind::Scalar => {
                if name == self.options.upload_scalar {
                    self.uploads = true;
                }
                FieldType::Scalar(name.to_string())
            }
            TypeKind::Enum => FieldType::Enum(self.enum_shape(name)?),
            TypeKind::InputObject => FieldType::InputObject(self.input_object(name)?),
            _ => {
                return Err(ValidationError::NonInputVariable {
                    variable: name.to_string(),
                    type_name: ty.to_string(),
                })
            }
        };
        Ok(wrap(ty, named))
    }

    fn input_object(&mut self, name: &str) -> Result<String, ValidationError> {
        let rust_name = to_rust_ident(name);
        if self
            .input_objects
            .iter()
            .any(|input| input.graphql_name.as_deref() == Some(name))
        {
            return Ok(rust_name);
        }

        // registered before its fields so recursive inputs terminate
        let index = self.input_objects.len();
        self.input_objects.push(InputShape {
            name: rust_name.clone(),
            graphql_name: Some(name.to_string()),
            fields: Vec::new(),
        });

        let definition = self.schema.require(name)?;
        let mut fields = Vec::with_capacity(definition.input_fields.len());
        for field in &definition.input_fields {
            fields.push(InputField {
                name: to_rust_field(&field.name),
                wire_key: field.name.clone(),
                ty: self.input_type(&field.ty)?,
                default: field.default.as_ref().map(format_value),
            });
        }
        self.input_objects[index].fields = fields;
        Ok(rust_name)
    }

    fn enum_shape(&mut self, name: &str) -> Result<String, ValidationError> {
        let rust_name = to_rust_ident(name);
        if !self.enums.iter().any(|shape| shape.graphql_name == name) {
            let definition = self.schema.require(name)?;
            self.enums.push(EnumShape {
                name: rust_name.clone(),
                graphql_name: name.to_string(),
                values: definition.enum_values.clone(),
            });
        }
        Ok(rust_name)
    }

    /// shape named `name` whose children are named under `prefix`
    fn object_shape(
        &mut self,
        name: &str,
        prefix: &str,
        type_name: &str,
        fields: &[ResolvedField],
    ) -> Result<ResponseShape, ValidationError> {
        let mut shape_fields = Vec::with_capacity(fields.len());
        for field in fields {
            shape_fields.push(ShapeField {
                name: to_rust_field(&field.response_key),
                wire_key: field.response_key.clone(),
                graphql_name: field.name.clone(),
                ty: self.field_type(prefix, field)?,
            });
        }
        Ok(ResponseShape {
            name: name.to_string(),
            type_name: type_name.to_string(),
            fields: shape_fields,
        })
    }

    fn field_type(
        &mut self,
        prefix: &str,
        field: &ResolvedField,
    ) -> Result<FieldType, ValidationError> {
        let named = match (&field.selection, field.kind) {
            (_, TypeKind::Enum) => FieldType::Enum(self.enum_shape(field.ty.base_name())?),
            (None, _) => FieldType::Scalar(field.ty.base_name().to_string()),
            (Some(selection), _) => {
                let name = self.claim(format!("{prefix}{}", to_rust_ident(&field.response_key)));
                if selection.polymorphic {
                    if selection.variants.is_empty() {
                        return Err(ValidationError::NoPossibleTypes {
                            field: field.response_key.clone(),
                            type_name: selection.parent_type.clone(),
                        });
                    }
                    self.polymorphic(&name, selection)?;
                    FieldType::Polymorphic(name)
                } else {
                    let shape =
                        self.object_shape(&name, &name, &selection.parent_type, &selection.fields)?;
                    self.shapes.push(shape);
                    FieldType::Object(name)
                }
            }
        };
        Ok(wrap(&field.ty, named))
    }

    fn polymorphic(
        &mut self,
        name: &str,
        selection: &ResolvedSelection,
    ) -> Result<(), ValidationError> {
        let mut variants = Vec::with_capacity(selection.variants.len());
        for variant in &selection.variants {
            let shape_name = self.claim(format!("{name}{}", to_rust_ident(&variant.type_name)));
            let shape =
                self.object_shape(&shape_name, &shape_name, &variant.type_name, &variant.fields)?;
            variants.push(VariantShape {
                type_name: variant.type_name.clone(),
                shape,
            });
        }

        let common = selection
            .fields
            .iter()
            .filter_map(|field| shared_field(&variants, &field.response_key))
            .collect();

        self.polymorphics.push(PolymorphicShape {
            name: name.to_string(),
            abstract_type: selection.parent_type.clone(),
            discriminator: TYPENAME.to_string(),
            common,
            variants,
        });
        Ok(())
    }
}

/// the field under `key` if every variant carries it with one type
fn shared_field(variants: &[VariantShape], key: &str) -> Option<ShapeField> {
    let mut found: Option<&ShapeField> = None;
    for variant in variants {
        let field = variant.shape.field(key)?;
        match found {
            Some(existing) if existing.ty != field.ty => return None,
            Some(_) => {}
            None => found = Some(field),
        }
    }
    found.cloned()
}

/// apply list and nullability wrappers of `ty` around `named`
fn wrap(ty: &TypeRef, named: FieldType) -> FieldType {
    match ty {
        TypeRef::NonNull(inner) => wrap_non_null(inner, named),
        other => FieldType::Optional(Box::new(wrap_non_null(other, named))),
    }
}

fn wrap_non_null(ty: &TypeRef, named: FieldType) -> FieldType {
    match ty {
        TypeRef::List(inner) => FieldType::List(Box::new(wrap(inner, named))),
        TypeRef::NonNull(inner) => wrap_non_null(inner, named),
        TypeRef::Named(_) => named,
    }
}

/// items deduplicated by name, first occurrence kept
pub(crate) fn unique_by_name<'a, T, F>(items: impl Iterator<Item = &'a T>, name: F) -> Vec<&'a T>
where
    T: 'a,
    F: Fn(&T) -> &str,
{
    let mut seen = BTreeSet::new();
    items.filter(|item| seen.insert(name(item).to_string())).collect()
}
