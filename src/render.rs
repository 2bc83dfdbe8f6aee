//! rust source rendering for binding sets
//!
//! one rendered module holds every operation of one document: schema enums
//! and input objects (deduplicated), the operation's variables struct,
//! response structs, polymorphic enums, the operation constant, and an async
//! function that sends the operation through a [`crate::GraphQlClient`].

use crate::naming::{to_const_name, to_rust_field, to_rust_ident, to_variant_name};
use crate::resolve::OperationKind;
use crate::synth::{
    unique_by_name, BindingSet, CodegenOptions, EnumShape, FieldType, InputField, InputShape,
    PolymorphicShape, ResponseShape, ShapeField,
};

/// parameter names the generated request function uses itself
const RESERVED_PARAMS: &[&str] = &["client", "cancel", "request", "response"];

/// render a module for every binding set of one document
pub fn render_bindings(sets: &[BindingSet], options: &CodegenOptions) -> String {
    let mut out = String::new();
    out.push_str("//! generated by gqlbind-codegen, do not edit\n\n");
    out.push_str("#![allow(dead_code, clippy::all)]\n\n");
    out.push_str("use serde::{Deserialize, Serialize};\n");

    for shape in unique_by_name(sets.iter().flat_map(|set| &set.enums), |e| &e.name) {
        out.push('\n');
        out.push_str(&render_enum(shape, options));
    }

    for shape in unique_by_name(sets.iter().flat_map(|set| &set.input_objects), |i| &i.name) {
        out.push('\n');
        out.push_str(&render_input(shape, options, true));
    }

    for set in sets {
        out.push_str(&render_operation(set, options));
    }

    out
}

fn render_operation(set: &BindingSet, options: &CodegenOptions) -> String {
    let c = &options.crate_path;
    let prefix = to_rust_ident(&set.operation);
    let keyword = match set.kind {
        OperationKind::Query => "Query",
        OperationKind::Mutation => "Mutation",
    };
    let marker = format!("{prefix}{keyword}");
    let query_const = format!("{}_OPERATION", to_const_name(&set.operation));

    let mut out = String::new();
    out.push_str(&format!("\n// {} {}\n\n", keyword.to_lowercase(), set.operation));
    out.push_str(&render_input(&set.input, options, false));

    for poly in &set.polymorphics {
        out.push('\n');
        out.push_str(&render_polymorphic(poly, options));
        for variant in &poly.variants {
            out.push('\n');
            out.push_str(&render_shape(&variant.shape, options));
        }
    }
    for shape in &set.shapes {
        out.push('\n');
        out.push_str(&render_shape(shape, options));
    }

    out.push_str(&format!(
        "\npub const {query_const}: &str = {};\n\n",
        raw_string(&set.query)
    ));

    out.push_str(&format!("pub struct {marker};\n\n"));
    out.push_str(&format!("impl {c}::Operation for {marker} {{\n"));
    out.push_str(&format!(
        "    const NAME: &'static str = {:?};\n",
        set.operation
    ));
    out.push_str(&format!("    const QUERY: &'static str = {query_const};\n"));
    if set.uploads {
        out.push_str("    const UPLOADS: bool = true;\n");
    }
    out.push_str(&format!("    type Variables = {};\n", set.input.name));
    out.push_str(&format!("    type Response = {};\n", set.response));
    if set.input.fields.is_empty() {
        out.push_str(&format!(
            "\n    fn request(_variables: {0}) -> {c}::Request<{0}> {{\n",
            set.input.name
        ));
        out.push_str(&format!(
            "        {c}::Request::new(Self::QUERY, Self::NAME, None)\n"
        ));
        out.push_str("    }\n");
    }
    out.push_str("}\n\n");

    let params: Vec<(String, String)> = set
        .input
        .fields
        .iter()
        .map(|field| {
            let name = if RESERVED_PARAMS.contains(&field.name.as_str()) {
                format!("{}_", field.name)
            } else {
                field.name.clone()
            };
            (name, input_field_type(field, options, false))
        })
        .collect();

    out.push_str(&format!(
        "pub async fn {}<C: {c}::GraphQlClient>(\n",
        to_rust_field(&set.operation)
    ));
    out.push_str("    client: &C,\n");
    out.push_str(&format!("    cancel: &{c}::CancellationToken,\n"));
    for (name, ty) in &params {
        out.push_str(&format!("    {name}: {ty},\n"));
    }
    out.push_str(&format!(
        ") -> {c}::Result<{c}::GraphQlResponse<{}>> {{\n",
        set.response
    ));

    let fields: Vec<String> = set
        .input
        .fields
        .iter()
        .zip(&params)
        .map(|(field, (param, _))| {
            if &field.name == param {
                field.name.clone()
            } else {
                format!("{}: {param}", field.name)
            }
        })
        .collect();
    let variables = if fields.is_empty() {
        format!("{} {{}}", set.input.name)
    } else {
        format!("{} {{ {} }}", set.input.name, fields.join(", "))
    };
    out.push_str(&format!(
        "    let request = <{marker} as {c}::Operation>::request({variables});\n"
    ));
    out.push_str(&format!(
        "    let mut response = {c}::GraphQlResponse::default();\n"
    ));
    out.push_str("    client.make_request(&request, &mut response, cancel).await?;\n");
    out.push_str("    Ok(response)\n");
    out.push_str("}\n");

    out
}

fn render_enum(shape: &EnumShape, options: &CodegenOptions) -> String {
    let c = &options.crate_path;
    let mut out = String::new();
    out.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]\n");
    out.push_str(&format!("pub enum {} {{\n", shape.name));
    for value in &shape.values {
        let variant = to_variant_name(value);
        if &variant != value {
            out.push_str(&format!("    #[serde(rename = {value:?})]\n"));
        }
        out.push_str(&format!("    {variant},\n"));
    }
    out.push_str("}\n\n");

    out.push_str(&format!("impl {c}::ToShape for {} {{\n", shape.name));
    out.push_str(&format!("    fn shape(&self) -> {c}::Shape<'_> {{\n"));
    out.push_str(&format!("        {c}::Shape::Leaf\n"));
    out.push_str("    }\n");
    out.push_str("}\n");
    out
}

/// variables struct or schema input object, with its upload walk
fn render_input(shape: &InputShape, options: &CodegenOptions, schema_input: bool) -> String {
    let c = &options.crate_path;
    let mut out = String::new();
    out.push_str("#[derive(Debug, Clone, Serialize)]\n");
    out.push_str(&format!("pub struct {} {{\n", shape.name));
    for field in &shape.fields {
        if let Some(default) = &field.default {
            out.push_str(&format!("    /// default: `{default}`\n"));
        }
        let mut attrs = Vec::new();
        if bare(&field.name) != field.wire_key {
            attrs.push(format!("rename = {:?}", field.wire_key));
        }
        if field.is_optional() {
            attrs.push(format!("skip_serializing_if = \"{c}::Optional::is_absent\""));
        }
        if !attrs.is_empty() {
            out.push_str(&format!("    #[serde({})]\n", attrs.join(", ")));
        }
        out.push_str(&format!(
            "    pub {}: {},\n",
            field.name,
            input_field_type(field, options, schema_input)
        ));
    }
    out.push_str("}\n\n");

    out.push_str(&format!("impl {c}::ToShape for {} {{\n", shape.name));
    out.push_str(&format!("    fn shape(&self) -> {c}::Shape<'_> {{\n"));
    if shape.fields.is_empty() {
        out.push_str(&format!("        {c}::Shape::Record(Vec::new())\n"));
    } else {
        out.push_str(&format!("        {c}::Shape::Record(vec![\n"));
        for field in &shape.fields {
            out.push_str(&format!(
                "            ({:?}, {c}::ToShape::shape(&self.{})),\n",
                field.wire_key, field.name
            ));
        }
        out.push_str("        ])\n");
    }
    out.push_str("    }\n");
    out.push_str("}\n");
    out
}

fn render_shape(shape: &ResponseShape, options: &CodegenOptions) -> String {
    let mut out = String::new();
    out.push_str("#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]\n");
    out.push_str(&format!("pub struct {} {{\n", shape.name));
    for field in &shape.fields {
        if bare(&field.name) != field.wire_key {
            out.push_str(&format!("    #[serde(rename = {:?})]\n", field.wire_key));
        }
        out.push_str(&format!(
            "    pub {}: {},\n",
            field.name,
            response_type(&field.ty, options)
        ));
    }
    out.push_str("}\n");

    if !shape.fields.is_empty() {
        out.push_str(&format!("\nimpl {} {{\n", shape.name));
        for (idx, field) in shape.fields.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            out.push_str(&accessor_signature(field, options));
            out.push_str(&format!("        &self.{}\n", field.name));
            out.push_str("    }\n");
        }
        out.push_str("}\n");
    }
    out
}

fn render_polymorphic(poly: &PolymorphicShape, options: &CodegenOptions) -> String {
    let c = &options.crate_path;
    let variants: Vec<(String, &str, &str)> = poly
        .variants
        .iter()
        .map(|variant| {
            (
                to_rust_ident(&variant.type_name),
                variant.type_name.as_str(),
                variant.shape.name.as_str(),
            )
        })
        .collect();

    let mut out = String::new();
    out.push_str(&format!(
        "/// `{}` selection, one variant per concrete type\n",
        poly.abstract_type
    ));
    out.push_str("#[derive(Debug, Clone, PartialEq, Serialize)]\n");
    out.push_str("#[serde(untagged)]\n");
    out.push_str(&format!("pub enum {} {{\n", poly.name));
    for (variant, _, shape) in &variants {
        out.push_str(&format!("    {variant}({shape}),\n"));
    }
    out.push_str("}\n\n");

    out.push_str(&format!("impl {c}::Polymorphic for {} {{\n", poly.name));
    out.push_str(&format!(
        "    const TYPE_NAME: &'static str = {:?};\n",
        poly.abstract_type
    ));
    let possible: Vec<String> = variants
        .iter()
        .map(|(_, type_name, _)| format!("{type_name:?}"))
        .collect();
    out.push_str(&format!(
        "    const POSSIBLE_TYPES: &'static [&'static str] = &[{}];\n\n",
        possible.join(", ")
    ));
    out.push_str(
        "    fn decode_variant(typename: &str, value: serde_json::Value) -> Result<Self, serde_json::Error> {\n",
    );
    out.push_str("        match typename {\n");
    for (variant, type_name, _) in &variants {
        out.push_str(&format!(
            "            {type_name:?} => serde_json::from_value(value).map(Self::{variant}),\n"
        ));
    }
    out.push_str(
        "            other => Err(<serde_json::Error as serde::de::Error>::unknown_variant(\n",
    );
    out.push_str("                other,\n");
    out.push_str("                Self::POSSIBLE_TYPES,\n");
    out.push_str("            )),\n");
    out.push_str("        }\n");
    out.push_str("    }\n\n");
    out.push_str("    fn variant_name(&self) -> &'static str {\n");
    out.push_str("        match self {\n");
    for (variant, type_name, _) in &variants {
        out.push_str(&format!(
            "            Self::{variant}(_) => {type_name:?},\n"
        ));
    }
    out.push_str("        }\n");
    out.push_str("    }\n");
    out.push_str("}\n\n");

    out.push_str(&format!("impl<'de> Deserialize<'de> for {} {{\n", poly.name));
    out.push_str(
        "    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {\n",
    );
    out.push_str(&format!("        {c}::deserialize_polymorphic(deserializer)\n"));
    out.push_str("    }\n");
    out.push_str("}\n");

    if !poly.common.is_empty() {
        out.push_str(&format!("\nimpl {} {{\n", poly.name));
        for (idx, field) in poly.common.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            out.push_str(&accessor_signature(field, options));
            out.push_str("        match self {\n");
            for (variant, _, _) in &variants {
                out.push_str(&format!(
                    "            Self::{variant}(value) => &value.{},\n",
                    field.name
                ));
            }
            out.push_str("        }\n");
            out.push_str("    }\n");
        }
        out.push_str("}\n");
    }
    out
}

fn accessor_signature(field: &ShapeField, options: &CodegenOptions) -> String {
    format!(
        "    pub fn {}(&self) -> &{} {{\n",
        field.name,
        response_type(&field.ty, options)
    )
}

fn response_type(ty: &FieldType, options: &CodegenOptions) -> String {
    match ty {
        FieldType::Optional(inner) => format!("Option<{}>", response_type(inner, options)),
        FieldType::List(inner) => format!("Vec<{}>", response_type(inner, options)),
        FieldType::Scalar(name) => scalar_type(name, options, false),
        FieldType::Enum(name)
        | FieldType::Object(name)
        | FieldType::Polymorphic(name)
        | FieldType::InputObject(name) => name.clone(),
    }
}

/// outer nullability becomes `Optional` so absent and null stay distinct;
/// a non-null field with a default is `Optional` too so it can be left out
fn input_field_type(field: &InputField, options: &CodegenOptions, box_inputs: bool) -> String {
    match &field.ty {
        FieldType::Optional(inner) => format!(
            "{}::Optional<{}>",
            options.crate_path,
            input_type(inner, options, box_inputs)
        ),
        other if field.default.is_some() => format!(
            "{}::Optional<{}>",
            options.crate_path,
            input_type(other, options, box_inputs)
        ),
        other => input_type(other, options, box_inputs),
    }
}

/// input objects nested directly in input objects are boxed so recursive
/// schema inputs have a finite size
fn input_type(ty: &FieldType, options: &CodegenOptions, box_inputs: bool) -> String {
    match ty {
        FieldType::Optional(inner) => format!("Option<{}>", input_type(inner, options, box_inputs)),
        FieldType::List(inner) => format!("Vec<{}>", input_type(inner, options, false)),
        FieldType::Scalar(name) => scalar_type(name, options, true),
        FieldType::InputObject(name) if box_inputs => format!("Box<{name}>"),
        FieldType::Enum(name)
        | FieldType::Object(name)
        | FieldType::Polymorphic(name)
        | FieldType::InputObject(name) => name.clone(),
    }
}

fn scalar_type(name: &str, options: &CodegenOptions, input: bool) -> String {
    match name {
        "String" | "ID" => "String".to_string(),
        "Int" => "i64".to_string(),
        "Float" => "f64".to_string(),
        "Boolean" => "bool".to_string(),
        upload if input && upload == options.upload_scalar => {
            format!("{}::Upload", options.crate_path)
        }
        _ => "serde_json::Value".to_string(),
    }
}

/// field name without a raw identifier prefix
fn bare(name: &str) -> &str {
    name.strip_prefix("r#").unwrap_or(name)
}

/// rust raw string literal with enough `#`s for `text`
fn raw_string(text: &str) -> String {
    let mut hashes = 1;
    let mut run = 0;
    let mut after_quote = false;
    for ch in text.chars() {
        match ch {
            '"' => {
                after_quote = true;
                run = 0;
            }
            '#' if after_quote => {
                run += 1;
                hashes = hashes.max(run + 1);
            }
            _ => {
                after_quote = false;
                run = 0;
            }
        }
    }
    let fence = "#".repeat(hashes);
    format!("r{fence}\"{text}\"{fence}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::synth::generate;

    const SDL: &str = r#"
        scalar Upload
        scalar DateTime
        type Query { node(id: ID!): Node me: User! }
        type Mutation { attach(file: Upload!, filter: Filter): User }
        interface Node { id: ID! }
        type User implements Node { id: ID! name: String type: Role! seen: DateTime }
        type Bot implements Node { id: ID! owner: User }
        enum Role { ADMIN READ_ONLY }
        input Filter { role: Role = ADMIN next: Filter tags: [String!] limit: Int! = 10 }
    "#;

    fn render(source: &str) -> String {
        let schema = Schema::parse(SDL).unwrap();
        let options = CodegenOptions::default();
        let generated = generate(&schema, source, &options).unwrap();
        assert!(generated.failures.is_empty(), "{:?}", generated.failures);
        render_bindings(&generated.bindings, &options)
    }

    #[test]
    fn test_render_polymorphic_enum() {
        let out = render(
            "query GetNode($id: ID!) { node(id: $id) { id ... on User { name } ... on Bot { owner { name } } } }",
        );
        assert!(out.contains("pub enum GetNodeNode {\n    User(GetNodeNodeUser),\n    Bot(GetNodeNodeBot),\n}"));
        assert!(out.contains("impl gqlbind::Polymorphic for GetNodeNode {"));
        assert!(out.contains("const POSSIBLE_TYPES: &'static [&'static str] = &[\"User\", \"Bot\"];"));
        assert!(out.contains("\"Bot\" => serde_json::from_value(value).map(Self::Bot),"));
        assert!(out.contains("gqlbind::deserialize_polymorphic(deserializer)"));
        assert!(out.contains("    pub fn id(&self) -> &String {\n        match self {"));
        assert!(out.contains("    #[serde(rename = \"__typename\")]\n    pub typename: String,"));
        assert!(out.contains("pub struct GetNodeNodeBotOwner {"));
        assert!(out.contains("pub owner: Option<GetNodeNodeBotOwner>,"));
    }

    #[test]
    fn test_render_operation_function() {
        let out = render("query GetNode($id: ID!) { node(id: $id) { id } }");
        assert!(out.contains("pub const GET_NODE_OPERATION: &str = r#\"query GetNode"));
        assert!(out.contains("pub struct GetNodeQuery;"));
        assert!(out.contains("const NAME: &'static str = \"GetNode\";"));
        assert!(out.contains("type Variables = GetNodeVariables;"));
        assert!(out.contains("pub async fn get_node<C: gqlbind::GraphQlClient>(\n    client: &C,\n    cancel: &gqlbind::CancellationToken,\n    id: String,\n)"));
        assert!(out.contains("<GetNodeQuery as gqlbind::Operation>::request(GetNodeVariables { id })"));
        assert!(!out.contains("const UPLOADS"));
    }

    #[test]
    fn test_render_inputs_and_enums() {
        let out = render(
            "mutation Attach($file: Upload!, $filter: Filter) { attach(file: $file, filter: $filter) { id type seen } }",
        );
        assert!(out.contains("    #[serde(rename = \"READ_ONLY\")]\n    ReadOnly,"));
        assert!(out.contains("pub struct Filter {\n    /// default: `ADMIN`\n    #[serde(skip_serializing_if = \"gqlbind::Optional::is_absent\")]\n    pub role: gqlbind::Optional<Role>,"));
        assert!(out.contains("pub next: gqlbind::Optional<Box<Filter>>,"));
        assert!(out.contains("pub tags: gqlbind::Optional<Vec<String>>,"));
        assert!(out.contains("pub file: gqlbind::Upload,"));
        assert!(out.contains("pub filter: gqlbind::Optional<Filter>,"));
        assert!(out.contains("(\"file\", gqlbind::ToShape::shape(&self.file)),"));
        assert!(out.contains("const UPLOADS: bool = true;"));
        assert!(out.contains("pub struct AttachMutation;"));
        assert!(out.contains("    pub r#type: Role,"));
        assert!(!out.contains("rename = \"type\""));
        assert!(out.contains("pub seen: Option<serde_json::Value>,"));
        assert!(out.contains("pub fn r#type(&self) -> &Role {"));
    }

    #[test]
    fn test_render_defaulted_non_null_inputs() {
        let out = render(
            "query Page($first: Int! = 3, $filter: Filter) { node(id: \"1\") { id } me { id } }",
        );
        assert!(out.contains("    /// default: `10`\n    #[serde(skip_serializing_if = \"gqlbind::Optional::is_absent\")]\n    pub limit: gqlbind::Optional<i64>,"));
        assert!(out.contains("    /// default: `3`\n    #[serde(skip_serializing_if = \"gqlbind::Optional::is_absent\")]\n    pub first: gqlbind::Optional<i64>,"));
        assert!(out.contains("    first: gqlbind::Optional<i64>,\n"));
    }

    #[test]
    fn test_render_suffixed_shapes_once() {
        let schema = Schema::parse(
            r#"
            type Query { node: Node nodeUser: User }
            interface Node { id: ID! }
            type User implements Node { id: ID! name: String }
            type Bot implements Node { id: ID! }
            "#,
        )
        .unwrap();
        let options = CodegenOptions::default();
        let generated = generate(
            &schema,
            "query Q { node { id ... on User { name } } nodeUser { id } }",
            &options,
        )
        .unwrap();
        let out = render_bindings(&generated.bindings, &options);
        assert_eq!(out.matches("pub struct QNodeUser {").count(), 1);
        assert_eq!(out.matches("pub struct QNodeUser2 {").count(), 1);
        assert!(out.contains("pub node_user: Option<QNodeUser2>,"));
    }

    #[test]
    fn test_render_without_variables() {
        let out = render("query Me { me { id } }");
        assert!(out.contains("pub struct MeVariables {\n}"));
        assert!(out.contains("gqlbind::Shape::Record(Vec::new())"));
        assert!(out.contains("gqlbind::Request::new(Self::QUERY, Self::NAME, None)"));
        assert!(out.contains("request(MeVariables {})"));
    }

    #[test]
    fn test_enums_deduplicated_across_operations() {
        let out = render("query A { me { type } } query B { me { type } }");
        assert_eq!(out.matches("pub enum Role {").count(), 1);
    }

    #[test]
    fn test_reserved_parameter_names() {
        let schema = Schema::parse(
            "type Query { find(client: String!): String }",
        )
        .unwrap();
        let options = CodegenOptions::default().with_crate_path("crate::gql");
        let generated =
            generate(&schema, "query Find($client: String!) { find(client: $client) }", &options)
                .unwrap();
        let out = render_bindings(&generated.bindings, &options);
        assert!(out.contains("    client_: String,\n"));
        assert!(out.contains("FindVariables { client: client_ }"));
        assert!(out.contains("impl crate::gql::Operation for FindQuery"));
    }

    #[test]
    fn test_raw_string_fences() {
        assert_eq!(raw_string("a"), "r#\"a\"#");
        assert_eq!(raw_string("x(s: \"#\")"), "r##\"x(s: \"#\")\"##");
    }
}
