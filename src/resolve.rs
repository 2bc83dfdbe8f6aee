//! type resolver
//!
//! walks an operation's selection tree against the schema and annotates
//! every selected field with its graphql type. selections under an
//! interface or union are partitioned per concrete type: fragments apply to
//! the concrete types their type condition shares with the spread location,
//! and fields that meet under the same response key are merged.

use crate::error::ValidationError;
use crate::schema::{to_static_value, Schema, TypeKind, TypeRef};
use graphql_parser::query::{
    self as ast, Definition, FragmentDefinition, OperationDefinition, Selection, SelectionSet,
    TypeCondition, Value,
};
use graphql_parser::Pos;
use std::collections::BTreeMap;

/// discriminator meta-field requested for every polymorphic selection
pub const TYPENAME: &str = "__typename";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

/// an operation whose selections are annotated with schema types
#[derive(Debug, Clone)]
pub struct ResolvedOperation {
    pub name: String,
    pub kind: OperationKind,
    /// literal query text sent to the server, fragments included
    pub query: String,
    pub variables: Vec<ResolvedVariable>,
    pub selection: ResolvedSelection,
}

#[derive(Debug, Clone)]
pub struct ResolvedVariable {
    pub name: String,
    pub ty: TypeRef,
    pub default: Option<Value<'static, String>>,
}

/// one selected field
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    /// alias if present, else the field name
    pub response_key: String,
    pub name: String,
    pub ty: TypeRef,
    /// kind of the field's named type
    pub kind: TypeKind,
    /// sub-selection for composite types
    pub selection: Option<ResolvedSelection>,
}

/// a selection set on one parent type
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSelection {
    pub parent_type: String,
    /// true for interface and union parents
    pub polymorphic: bool,
    /// fields selected for every concrete type, in selection order
    pub fields: Vec<ResolvedField>,
    /// one entry per possible type of a polymorphic parent
    pub variants: Vec<ResolvedVariant>,
}

/// selections that apply to one concrete type
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVariant {
    pub type_name: String,
    /// common fields plus the fields of every fragment matching this type
    pub fields: Vec<ResolvedField>,
}

struct Entry {
    field: ResolvedField,
    /// concrete types the field is restricted to; `None` applies to all
    on: Option<Vec<String>>,
}

/// resolve one operation of a document
pub fn resolve<'a>(
    schema: &Schema,
    document: &ast::Document<'a, String>,
    operation: &OperationDefinition<'a, String>,
) -> Result<ResolvedOperation, ValidationError> {
    let (kind, name, variable_definitions, selection_set) = match operation {
        OperationDefinition::Query(query) => (
            OperationKind::Query,
            query.name.as_ref(),
            &query.variable_definitions,
            &query.selection_set,
        ),
        OperationDefinition::Mutation(mutation) => (
            OperationKind::Mutation,
            mutation.name.as_ref(),
            &mutation.variable_definitions,
            &mutation.selection_set,
        ),
        OperationDefinition::Subscription(subscription) => {
            return Err(ValidationError::Subscription(
                subscription.name.clone().unwrap_or_default(),
            ))
        }
        OperationDefinition::SelectionSet(_) => return Err(ValidationError::AnonymousOperation),
    };
    let name = name.ok_or(ValidationError::AnonymousOperation)?.clone();

    let root = match kind {
        OperationKind::Query => schema.query_type().to_string(),
        OperationKind::Mutation => schema
            .mutation_type()
            .ok_or_else(|| ValidationError::UnknownType("Mutation".to_string()))?
            .to_string(),
    };

    let mut resolver = Resolver {
        schema,
        fragments: document
            .definitions
            .iter()
            .filter_map(|def| match def {
                Definition::Fragment(fragment) => Some((fragment.name.clone(), fragment)),
                _ => None,
            })
            .collect(),
        variables: BTreeMap::new(),
        used_fragments: Vec::new(),
        spread_stack: Vec::new(),
    };

    let mut variables = Vec::new();
    for def in variable_definitions {
        let variable = resolver.variable(def)?;
        resolver
            .variables
            .insert(variable.name.clone(), variable.clone());
        variables.push(variable);
    }

    let selection = resolver.selection_set(&root, selection_set)?;

    let mut printed = vec![Definition::Operation(operation.clone())];
    for fragment in &resolver.used_fragments {
        if let Some(def) = resolver.fragments.get(fragment) {
            printed.push(Definition::Fragment((*def).clone()));
        }
    }
    let query = ast::Document {
        definitions: printed,
    }
    .to_string();

    Ok(ResolvedOperation {
        name,
        kind,
        query,
        variables,
        selection,
    })
}

struct Resolver<'s, 'd, 'src> {
    schema: &'s Schema,
    fragments: BTreeMap<String, &'d FragmentDefinition<'src, String>>,
    variables: BTreeMap<String, ResolvedVariable>,
    used_fragments: Vec<String>,
    spread_stack: Vec<String>,
}

impl<'s, 'd, 'src> Resolver<'s, 'd, 'src> {
    fn variable(
        &self,
        def: &ast::VariableDefinition<'_, String>,
    ) -> Result<ResolvedVariable, ValidationError> {
        let ty = TypeRef::from(&def.var_type);
        let kind = self.schema.require(ty.base_name())?.kind;
        if !kind.is_input() {
            return Err(ValidationError::NonInputVariable {
                variable: def.name.clone(),
                type_name: ty.base_name().to_string(),
            });
        }

        if let Some(default) = &def.default_value {
            if !self.literal_matches(default, &ty) {
                return Err(ValidationError::DefaultValueMismatch {
                    name: format!("${}", def.name),
                    expected: ty.to_string(),
                });
            }
        }

        Ok(ResolvedVariable {
            name: def.name.clone(),
            ty,
            default: def.default_value.as_ref().map(to_static_value),
        })
    }

    fn selection_set(
        &mut self,
        parent_type: &str,
        set: &SelectionSet<'_, String>,
    ) -> Result<ResolvedSelection, ValidationError> {
        let polymorphic = self.schema.require(parent_type)?.kind.is_abstract();
        let mut entries = Vec::new();
        self.collect(parent_type, parent_type, set, None, &mut entries)?;

        let fields = merge_entries(entries.iter().filter(|entry| entry.on.is_none()))?;
        let mut variants = Vec::new();
        if polymorphic {
            for type_name in self.schema.possible_types(parent_type) {
                let fields = merge_entries(entries.iter().filter(|entry| {
                    entry
                        .on
                        .as_ref()
                        .map_or(true, |types| types.contains(&type_name))
                }))?;
                variants.push(ResolvedVariant { type_name, fields });
            }
        }

        Ok(ResolvedSelection {
            parent_type: parent_type.to_string(),
            polymorphic,
            fields,
            variants,
        })
    }

    /// gather fields in selection order, tagging each with the concrete
    /// types it applies to
    fn collect(
        &mut self,
        parent_type: &str,
        scope: &str,
        set: &SelectionSet<'_, String>,
        on: Option<Vec<String>>,
        entries: &mut Vec<Entry>,
    ) -> Result<(), ValidationError> {
        for item in &set.items {
            match item {
                Selection::Field(field) => {
                    let field = self.field(scope, field)?;
                    entries.push(Entry {
                        field,
                        on: on.clone(),
                    });
                }
                Selection::FragmentSpread(spread) => {
                    let name = &spread.fragment_name;
                    let fragment = *self
                        .fragments
                        .get(name)
                        .ok_or_else(|| ValidationError::UnknownFragment(name.clone()))?;
                    if self.spread_stack.contains(name) {
                        return Err(ValidationError::FragmentCycle(name.clone()));
                    }
                    if !self.used_fragments.contains(name) {
                        self.used_fragments.push(name.clone());
                    }
                    let TypeCondition::On(condition) = &fragment.type_condition;
                    self.spread_stack.push(name.clone());
                    let result = self.fragment(
                        parent_type,
                        scope,
                        condition,
                        &fragment.selection_set,
                        on.clone(),
                        entries,
                    );
                    self.spread_stack.pop();
                    result?;
                }
                Selection::InlineFragment(inline) => {
                    let condition = match &inline.type_condition {
                        Some(TypeCondition::On(condition)) => condition.as_str(),
                        None => scope,
                    };
                    self.fragment(
                        parent_type,
                        scope,
                        condition,
                        &inline.selection_set,
                        on.clone(),
                        entries,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn fragment(
        &mut self,
        parent_type: &str,
        scope: &str,
        condition: &str,
        set: &SelectionSet<'_, String>,
        on: Option<Vec<String>>,
        entries: &mut Vec<Entry>,
    ) -> Result<(), ValidationError> {
        let kind = self.schema.require(condition)?.kind;
        let impossible = || ValidationError::ImpossibleFragment {
            parent: scope.to_string(),
            condition: condition.to_string(),
        };
        if kind.is_leaf() || kind == TypeKind::InputObject || !self.schema.overlaps(scope, condition)
        {
            return Err(impossible());
        }

        let on = if self.schema.covers(condition, parent_type) {
            on
        } else {
            let applicable: Vec<String> = self
                .schema
                .possible_types(parent_type)
                .into_iter()
                .filter(|ty| self.schema.possible_types(condition).contains(ty))
                .filter(|ty| on.as_ref().map_or(true, |outer| outer.contains(ty)))
                .collect();
            Some(applicable)
        };

        self.collect(parent_type, condition, set, on, entries)
    }

    fn field(
        &mut self,
        scope: &str,
        field: &ast::Field<'_, String>,
    ) -> Result<ResolvedField, ValidationError> {
        let response_key = field.alias.clone().unwrap_or_else(|| field.name.clone());

        if field.name == TYPENAME {
            if !field.selection_set.items.is_empty() {
                return Err(ValidationError::LeafWithSelection {
                    field: field.name.clone(),
                    type_name: "String".to_string(),
                });
            }
            return Ok(ResolvedField {
                response_key,
                name: field.name.clone(),
                ty: TypeRef::NonNull(Box::new(TypeRef::named("String"))),
                kind: TypeKind::Scalar,
                selection: None,
            });
        }

        let def = self
            .schema
            .require(scope)?
            .field(&field.name)
            .ok_or_else(|| ValidationError::UnknownField {
                parent: scope.to_string(),
                field: field.name.clone(),
            })?
            .clone();

        for (argument, value) in &field.arguments {
            let arg_def = def
                .arguments
                .iter()
                .find(|arg| &arg.name == argument)
                .ok_or_else(|| ValidationError::UnknownArgument {
                    parent: scope.to_string(),
                    field: field.name.clone(),
                    argument: argument.clone(),
                })?;
            self.check_argument(value, &arg_def.ty, arg_def.default.is_some())?;
        }

        let base = def.ty.base_name();
        let kind = self.schema.require(base)?.kind;
        let selection = if kind.is_leaf() {
            if !field.selection_set.items.is_empty() {
                return Err(ValidationError::LeafWithSelection {
                    field: field.name.clone(),
                    type_name: base.to_string(),
                });
            }
            None
        } else {
            if field.selection_set.items.is_empty() {
                return Err(ValidationError::MissingSelection {
                    field: field.name.clone(),
                    type_name: base.to_string(),
                });
            }
            Some(self.selection_set(base, &field.selection_set)?)
        };

        Ok(ResolvedField {
            response_key,
            name: def.name,
            ty: def.ty,
            kind,
            selection,
        })
    }

    fn check_argument(
        &self,
        value: &Value<'_, String>,
        expected: &TypeRef,
        has_default: bool,
    ) -> Result<(), ValidationError> {
        match value {
            Value::Variable(name) => {
                let variable = self
                    .variables
                    .get(name)
                    .ok_or_else(|| ValidationError::UndefinedVariable(name.clone()))?;
                let allowed = variable_usage_allowed(
                    &variable.ty,
                    variable.default.is_some() || has_default,
                    expected,
                );
                if !allowed {
                    return Err(ValidationError::VariableTypeMismatch {
                        variable: name.clone(),
                        declared: variable.ty.to_string(),
                        expected: expected.to_string(),
                    });
                }
                Ok(())
            }
            Value::List(items) => {
                let inner = match expected.nullable() {
                    TypeRef::List(inner) => inner.as_ref(),
                    other => other,
                };
                for item in items {
                    self.check_argument(item, inner, false)?;
                }
                Ok(())
            }
            Value::Object(fields) => {
                let type_name = expected.base_name();
                let Some(def) = self.schema.get(type_name) else {
                    return Ok(());
                };
                if def.kind != TypeKind::InputObject {
                    return Ok(());
                }
                for (key, value) in fields {
                    let field = def
                        .input_fields
                        .iter()
                        .find(|field| &field.name == key)
                        .ok_or_else(|| ValidationError::UnknownField {
                            parent: type_name.to_string(),
                            field: key.clone(),
                        })?;
                    self.check_argument(value, &field.ty, field.default.is_some())?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// true if a constant literal is a valid value of `ty`
    fn literal_matches(&self, value: &Value<'_, String>, ty: &TypeRef) -> bool {
        match (value, ty) {
            (Value::Null, ty) => !ty.is_non_null(),
            (Value::Variable(_), _) => false,
            (value, TypeRef::NonNull(inner)) => self.literal_matches(value, inner),
            (Value::List(items), TypeRef::List(inner)) => {
                items.iter().all(|item| self.literal_matches(item, inner))
            }
            (value, TypeRef::List(inner)) => self.literal_matches(value, inner),
            (value, TypeRef::Named(name)) => match self.schema.get(name) {
                Some(def) => match def.kind {
                    TypeKind::Scalar => scalar_literal_matches(name, value),
                    TypeKind::Enum => {
                        matches!(value, Value::Enum(v) if def.enum_values.contains(v))
                    }
                    TypeKind::InputObject => {
                        let Value::Object(fields) = value else {
                            return false;
                        };
                        let known = fields.iter().all(|(key, value)| {
                            def.input_fields
                                .iter()
                                .find(|field| &field.name == key)
                                .is_some_and(|field| self.literal_matches(value, &field.ty))
                        });
                        let required_present = def.input_fields.iter().all(|field| {
                            !field.ty.is_non_null()
                                || field.default.is_some()
                                || fields.contains_key(&field.name)
                        });
                        known && required_present
                    }
                    _ => false,
                },
                None => false,
            },
        }
    }
}

fn scalar_literal_matches(name: &str, value: &Value<'_, String>) -> bool {
    match name {
        "Int" => matches!(value, Value::Int(_)),
        "Float" => matches!(value, Value::Int(_) | Value::Float(_)),
        "String" => matches!(value, Value::String(_)),
        "Boolean" => matches!(value, Value::Boolean(_)),
        "ID" => matches!(value, Value::String(_) | Value::Int(_)),
        // custom scalars accept any literal
        _ => true,
    }
}

/// graphql's variable-in-allowed-position rule
fn variable_usage_allowed(variable: &TypeRef, has_default: bool, location: &TypeRef) -> bool {
    match (variable, location) {
        (TypeRef::NonNull(_), _) => type_compatible(variable, location),
        (_, TypeRef::NonNull(inner)) => has_default && type_compatible(variable, inner),
        _ => type_compatible(variable, location),
    }
}

fn type_compatible(variable: &TypeRef, location: &TypeRef) -> bool {
    match (variable, location) {
        (TypeRef::NonNull(v), TypeRef::NonNull(l)) => type_compatible(v, l),
        (TypeRef::NonNull(v), l) => type_compatible(v, l),
        (_, TypeRef::NonNull(_)) => false,
        (TypeRef::List(v), TypeRef::List(l)) => type_compatible(v, l),
        (TypeRef::Named(v), TypeRef::Named(l)) => v == l,
        _ => false,
    }
}

fn merge_entries<'e>(
    entries: impl Iterator<Item = &'e Entry>,
) -> Result<Vec<ResolvedField>, ValidationError> {
    let mut fields: Vec<ResolvedField> = Vec::new();
    for entry in entries {
        merge_field(&mut fields, entry.field.clone())?;
    }
    Ok(fields)
}

fn merge_field(
    fields: &mut Vec<ResolvedField>,
    field: ResolvedField,
) -> Result<(), ValidationError> {
    let Some(existing) = fields
        .iter_mut()
        .find(|existing| existing.response_key == field.response_key)
    else {
        fields.push(field);
        return Ok(());
    };

    let conflict = |reason: String| ValidationError::FieldConflict {
        key: field.response_key.clone(),
        reason,
    };
    if existing.name != field.name {
        return Err(conflict(format!(
            "`{}` and `{}` are different fields",
            existing.name, field.name
        )));
    }
    if existing.ty != field.ty {
        return Err(conflict(format!(
            "types `{}` and `{}` differ",
            existing.ty, field.ty
        )));
    }

    match (&mut existing.selection, field.selection) {
        (Some(into), Some(from)) => merge_selection(into, from),
        _ => Ok(()),
    }
}

fn merge_selection(
    into: &mut ResolvedSelection,
    from: ResolvedSelection,
) -> Result<(), ValidationError> {
    for field in from.fields {
        merge_field(&mut into.fields, field)?;
    }
    for variant in from.variants {
        match into
            .variants
            .iter_mut()
            .find(|existing| existing.type_name == variant.type_name)
        {
            Some(existing) => {
                for field in variant.fields {
                    merge_field(&mut existing.fields, field)?;
                }
            }
            None => into.variants.push(variant),
        }
    }
    Ok(())
}

/// make every polymorphic selection set in the document request
/// `__typename`, so decoded values always carry their discriminator
pub fn request_discriminators(schema: &Schema, document: &mut ast::Document<'_, String>) {
    for def in &mut document.definitions {
        match def {
            Definition::Operation(operation) => {
                let (root, set) = match operation {
                    OperationDefinition::Query(query) => {
                        (schema.query_type(), &mut query.selection_set)
                    }
                    OperationDefinition::Mutation(mutation) => match schema.mutation_type() {
                        Some(root) => (root, &mut mutation.selection_set),
                        None => continue,
                    },
                    OperationDefinition::SelectionSet(set) => (schema.query_type(), set),
                    OperationDefinition::Subscription(_) => continue,
                };
                add_typename(schema, root, set, true);
            }
            Definition::Fragment(fragment) => {
                let TypeCondition::On(condition) = &fragment.type_condition;
                let condition = condition.clone();
                add_typename(schema, &condition, &mut fragment.selection_set, true);
            }
        }
    }
}

fn add_typename(schema: &Schema, scope: &str, set: &mut SelectionSet<'_, String>, owned: bool) {
    let is_abstract = schema.kind(scope).is_some_and(TypeKind::is_abstract);
    let has_typename = set.items.iter().any(|item| {
        matches!(item, Selection::Field(field) if field.name == TYPENAME && field.alias.is_none())
    });
    if owned && is_abstract && !has_typename {
        set.items.insert(0, Selection::Field(typename_field(set.span.0)));
    }

    for item in &mut set.items {
        match item {
            Selection::Field(field) if !field.selection_set.items.is_empty() => {
                let child = schema
                    .get(scope)
                    .and_then(|def| def.field(&field.name))
                    .map(|def| def.ty.base_name().to_string());
                if let Some(child) = child {
                    add_typename(schema, &child, &mut field.selection_set, true);
                }
            }
            Selection::InlineFragment(inline) => {
                let condition = match &inline.type_condition {
                    Some(TypeCondition::On(condition)) => condition.clone(),
                    None => scope.to_string(),
                };
                add_typename(schema, &condition, &mut inline.selection_set, false);
            }
            _ => {}
        }
    }
}

fn typename_field<'a>(position: Pos) -> ast::Field<'a, String> {
    ast::Field {
        position,
        alias: None,
        name: TYPENAME.to_string(),
        arguments: Vec::new(),
        directives: Vec::new(),
        selection_set: SelectionSet {
            span: (position, position),
            items: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_parser::query::parse_query;

    pub(crate) const SDL: &str = r#"
        type Query {
            node(id: ID!): Node
            nodes(ids: [ID!]!): [Node]!
            search(text: String!, limit: Int = 10): [SearchResult!]!
            me: User!
        }
        type Mutation { rename(id: ID!, name: String): User }
        interface Node { id: ID! }
        interface Owned { owner: User }
        type User implements Node { id: ID! name: String friends: [User!]! }
        type Bot implements Node & Owned { id: ID! owner: User model: String }
        type Post implements Node & Owned { id: ID! owner: User title: String! }
        union SearchResult = User | Bot
        enum Role { ADMIN MEMBER }
        input Filter { role: Role = MEMBER limit: Int! }
    "#;

    fn resolve_first(source: &str) -> Result<ResolvedOperation, ValidationError> {
        let schema = Schema::parse(SDL).unwrap();
        let mut document = parse_query::<String>(source).unwrap();
        request_discriminators(&schema, &mut document);
        let operation = document
            .definitions
            .iter()
            .find_map(|def| match def {
                Definition::Operation(op) => Some(op),
                _ => None,
            })
            .unwrap();
        resolve(&schema, &document, operation)
    }

    fn keys(fields: &[ResolvedField]) -> Vec<&str> {
        fields.iter().map(|f| f.response_key.as_str()).collect()
    }

    #[test]
    fn test_interface_partitioning() {
        let op = resolve_first(
            "query GetNode($id: ID!) { node(id: $id) { id ... on User { name } ... on Bot { owner { name } } } }",
        )
        .unwrap();
        assert_eq!(op.name, "GetNode");
        let node = &op.selection.fields[0];
        assert_eq!(node.response_key, "node");
        let selection = node.selection.as_ref().unwrap();
        assert!(selection.polymorphic);
        assert_eq!(keys(&selection.fields), vec!["__typename", "id"]);

        let variants: Vec<_> = selection
            .variants
            .iter()
            .map(|v| (v.type_name.as_str(), keys(&v.fields)))
            .collect();
        assert_eq!(
            variants,
            vec![
                ("User", vec!["__typename", "id", "name"]),
                ("Bot", vec!["__typename", "id", "owner"]),
                ("Post", vec!["__typename", "id"]),
            ]
        );
        assert!(op.query.contains("__typename"));
    }

    #[test]
    fn test_interface_fragment_applies_to_implementors() {
        let op = resolve_first(
            "query Q { node(id: \"1\") { ... on Owned { owner { name } } ... on Post { title } } }",
        )
        .unwrap();
        let selection = op.selection.fields[0].selection.as_ref().unwrap();
        let variants: Vec<_> = selection
            .variants
            .iter()
            .map(|v| (v.type_name.as_str(), keys(&v.fields)))
            .collect();
        assert_eq!(
            variants,
            vec![
                ("User", vec!["__typename"]),
                ("Bot", vec!["__typename", "owner"]),
                ("Post", vec!["__typename", "owner", "title"]),
            ]
        );
    }

    #[test]
    fn test_named_fragments_merge() {
        let op = resolve_first(
            r#"
            query Q { me { ...A ...B id } }
            fragment A on User { id friends { id } }
            fragment B on User { friends { name } }
            "#,
        )
        .unwrap();
        let me = op.selection.fields[0].selection.as_ref().unwrap();
        assert!(!me.polymorphic);
        assert_eq!(keys(&me.fields), vec!["id", "friends"]);
        let friends = me.fields[1].selection.as_ref().unwrap();
        assert_eq!(keys(&friends.fields), vec!["id", "name"]);
        assert!(op.query.contains("fragment A on User"));
        assert!(op.query.contains("fragment B on User"));
    }

    #[test]
    fn test_aliases_are_response_keys() {
        let op = resolve_first("query Q { me { handle: name id } }").unwrap();
        let me = op.selection.fields[0].selection.as_ref().unwrap();
        assert_eq!(keys(&me.fields), vec!["handle", "id"]);
        assert_eq!(me.fields[0].name, "name");
    }

    #[test]
    fn test_unknown_field() {
        let err = resolve_first("query Q { me { nope } }").unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownField {
                parent: "User".to_string(),
                field: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_union_fields_need_fragments() {
        let err = resolve_first("query Q { search(text: \"a\") { id } }").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownField { .. }));
    }

    #[test]
    fn test_impossible_fragment() {
        let err = resolve_first("query Q { me { ... on Bot { model } } }").unwrap_err();
        assert!(matches!(err, ValidationError::ImpossibleFragment { .. }));

        let err =
            resolve_first("query Q { search(text: \"a\") { ... on Post { title } } }").unwrap_err();
        assert!(matches!(err, ValidationError::ImpossibleFragment { .. }));
    }

    #[test]
    fn test_variable_type_mismatch() {
        let err = resolve_first("query Q($id: String!) { node(id: $id) { id } }").unwrap_err();
        assert!(matches!(err, ValidationError::VariableTypeMismatch { .. }));

        let err = resolve_first("query Q($id: ID) { node(id: $id) { id } }").unwrap_err();
        assert!(matches!(err, ValidationError::VariableTypeMismatch { .. }));

        // nullable variable with a default may fill a non-null position
        assert!(resolve_first("query Q($id: ID = \"1\") { node(id: $id) { id } }").is_ok());
        // non-null variable may fill a nullable position
        assert!(resolve_first("query Q($n: Int!) { search(text: \"a\", limit: $n) { __typename } }").is_ok());
    }

    #[test]
    fn test_undefined_variable() {
        let err = resolve_first("query Q { node(id: $id) { id } }").unwrap_err();
        assert_eq!(err, ValidationError::UndefinedVariable("id".to_string()));
    }

    #[test]
    fn test_default_value_mismatch() {
        let err = resolve_first("query Q($n: Int = \"ten\") { search(text: \"a\", limit: $n) { __typename } }")
            .unwrap_err();
        assert!(matches!(err, ValidationError::DefaultValueMismatch { .. }));

        let err = resolve_first("query Q($f: Filter = {role: OWNER, limit: 1}) { me { id } }")
            .unwrap_err();
        assert!(matches!(err, ValidationError::DefaultValueMismatch { .. }));

        let op = resolve_first("query Q($f: Filter = {limit: 1}) { me { id } }").unwrap();
        assert!(op.variables[0].default.is_some());
    }

    #[test]
    fn test_conflicting_leaf_types() {
        let err = resolve_first(
            "query Q { node(id: \"1\") { ... on Bot { x: model } ... on Post { x: title } } }",
        );
        // different fields never meet on the same concrete type
        assert!(err.is_ok());

        let err = resolve_first("query Q { me { x: name x: id } }").unwrap_err();
        assert!(matches!(err, ValidationError::FieldConflict { .. }));
    }

    #[test]
    fn test_leaf_and_composite_selection_rules() {
        let err = resolve_first("query Q { me { name { x } } }").unwrap_err();
        assert!(matches!(err, ValidationError::LeafWithSelection { .. }));
        let err = resolve_first("query Q { me }").unwrap_err();
        assert!(matches!(err, ValidationError::MissingSelection { .. }));
    }

    #[test]
    fn test_anonymous_and_subscription_rejected() {
        assert_eq!(
            resolve_first("{ me { id } }").unwrap_err(),
            ValidationError::AnonymousOperation
        );
        assert!(matches!(
            resolve_first("subscription S { me { id } }").unwrap_err(),
            ValidationError::Subscription(_)
        ));
    }

    #[test]
    fn test_fragment_cycle() {
        let err = resolve_first(
            r#"
            query Q { me { ...A } }
            fragment A on User { friends { ...A } }
            "#,
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::FragmentCycle("A".to_string()));
    }

    #[test]
    fn test_mutation_root() {
        let op = resolve_first("mutation Rename($id: ID!) { rename(id: $id) { id } }").unwrap();
        assert_eq!(op.kind, OperationKind::Mutation);
        assert!(op.query.trim_start().starts_with("mutation"));
    }
}
