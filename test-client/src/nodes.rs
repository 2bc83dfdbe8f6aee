//! generated by gqlbind-codegen, do not edit

#![allow(dead_code, clippy::all)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "MEMBER")]
    Member,
}

impl gqlbind::ToShape for Role {
    fn shape(&self) -> gqlbind::Shape<'_> {
        gqlbind::Shape::Leaf
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Filter {
    /// default: `MEMBER`
    #[serde(skip_serializing_if = "gqlbind::Optional::is_absent")]
    pub role: gqlbind::Optional<Role>,
    /// default: `25`
    #[serde(skip_serializing_if = "gqlbind::Optional::is_absent")]
    pub limit: gqlbind::Optional<i64>,
}

impl gqlbind::ToShape for Filter {
    fn shape(&self) -> gqlbind::Shape<'_> {
        gqlbind::Shape::Record(vec![
            ("role", gqlbind::ToShape::shape(&self.role)),
            ("limit", gqlbind::ToShape::shape(&self.limit)),
        ])
    }
}

// query GetNode

#[derive(Debug, Clone, Serialize)]
pub struct GetNodeVariables {
    pub id: String,
}

impl gqlbind::ToShape for GetNodeVariables {
    fn shape(&self) -> gqlbind::Shape<'_> {
        gqlbind::Shape::Record(vec![
            ("id", gqlbind::ToShape::shape(&self.id)),
        ])
    }
}

/// `Node` selection, one variant per concrete type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GetNodeNode {
    User(GetNodeNodeUser),
    Bot(GetNodeNodeBot),
}

impl gqlbind::Polymorphic for GetNodeNode {
    const TYPE_NAME: &'static str = "Node";
    const POSSIBLE_TYPES: &'static [&'static str] = &["User", "Bot"];

    fn decode_variant(typename: &str, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        match typename {
            "User" => serde_json::from_value(value).map(Self::User),
            "Bot" => serde_json::from_value(value).map(Self::Bot),
            other => Err(<serde_json::Error as serde::de::Error>::unknown_variant(
                other,
                Self::POSSIBLE_TYPES,
            )),
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            Self::User(_) => "User",
            Self::Bot(_) => "Bot",
        }
    }
}

impl<'de> Deserialize<'de> for GetNodeNode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        gqlbind::deserialize_polymorphic(deserializer)
    }
}

impl GetNodeNode {
    pub fn typename(&self) -> &String {
        match self {
            Self::User(value) => &value.typename,
            Self::Bot(value) => &value.typename,
        }
    }

    pub fn id(&self) -> &String {
        match self {
            Self::User(value) => &value.id,
            Self::Bot(value) => &value.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetNodeNodeUser {
    #[serde(rename = "__typename")]
    pub typename: String,
    pub id: String,
    pub name: Option<String>,
    pub role: Role,
}

impl GetNodeNodeUser {
    pub fn typename(&self) -> &String {
        &self.typename
    }

    pub fn id(&self) -> &String {
        &self.id
    }

    pub fn name(&self) -> &Option<String> {
        &self.name
    }

    pub fn role(&self) -> &Role {
        &self.role
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetNodeNodeBot {
    #[serde(rename = "__typename")]
    pub typename: String,
    pub id: String,
    pub owner: Option<GetNodeNodeBotOwner>,
}

impl GetNodeNodeBot {
    pub fn typename(&self) -> &String {
        &self.typename
    }

    pub fn id(&self) -> &String {
        &self.id
    }

    pub fn owner(&self) -> &Option<GetNodeNodeBotOwner> {
        &self.owner
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetNodeNodeBotOwner {
    pub name: Option<String>,
}

impl GetNodeNodeBotOwner {
    pub fn name(&self) -> &Option<String> {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetNodeResponse {
    pub node: Option<GetNodeNode>,
}

impl GetNodeResponse {
    pub fn node(&self) -> &Option<GetNodeNode> {
        &self.node
    }
}

pub const GET_NODE_OPERATION: &str = r#"query GetNode($id: ID!) {
  node(id: $id) {
    __typename
    id
    ... on User {
      name
      role
    }
    ... on Bot {
      owner {
        name
      }
    }
  }
}
"#;

pub struct GetNodeQuery;

impl gqlbind::Operation for GetNodeQuery {
    const NAME: &'static str = "GetNode";
    const QUERY: &'static str = GET_NODE_OPERATION;
    type Variables = GetNodeVariables;
    type Response = GetNodeResponse;
}

pub async fn get_node<C: gqlbind::GraphQlClient>(
    client: &C,
    cancel: &gqlbind::CancellationToken,
    id: String,
) -> gqlbind::Result<gqlbind::GraphQlResponse<GetNodeResponse>> {
    let request = <GetNodeQuery as gqlbind::Operation>::request(GetNodeVariables { id });
    let mut response = gqlbind::GraphQlResponse::default();
    client.make_request(&request, &mut response, cancel).await?;
    Ok(response)
}

// mutation Attach

#[derive(Debug, Clone, Serialize)]
pub struct AttachVariables {
    pub id: String,
    pub files: Vec<gqlbind::Upload>,
}

impl gqlbind::ToShape for AttachVariables {
    fn shape(&self) -> gqlbind::Shape<'_> {
        gqlbind::Shape::Record(vec![
            ("id", gqlbind::ToShape::shape(&self.id)),
            ("files", gqlbind::ToShape::shape(&self.files)),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachAttach {
    pub id: String,
    pub model: Option<String>,
}

impl AttachAttach {
    pub fn id(&self) -> &String {
        &self.id
    }

    pub fn model(&self) -> &Option<String> {
        &self.model
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachResponse {
    pub attach: Option<AttachAttach>,
}

impl AttachResponse {
    pub fn attach(&self) -> &Option<AttachAttach> {
        &self.attach
    }
}

pub const ATTACH_OPERATION: &str = r#"mutation Attach($id: ID!, $files: [Upload!]!) {
  attach(id: $id, files: $files) {
    id
    model
  }
}
"#;

pub struct AttachMutation;

impl gqlbind::Operation for AttachMutation {
    const NAME: &'static str = "Attach";
    const QUERY: &'static str = ATTACH_OPERATION;
    const UPLOADS: bool = true;
    type Variables = AttachVariables;
    type Response = AttachResponse;
}

pub async fn attach<C: gqlbind::GraphQlClient>(
    client: &C,
    cancel: &gqlbind::CancellationToken,
    id: String,
    files: Vec<gqlbind::Upload>,
) -> gqlbind::Result<gqlbind::GraphQlResponse<AttachResponse>> {
    let request = <AttachMutation as gqlbind::Operation>::request(AttachVariables { id, files });
    let mut response = gqlbind::GraphQlResponse::default();
    client.make_request(&request, &mut response, cancel).await?;
    Ok(response)
}

// query Search

#[derive(Debug, Clone, Serialize)]
pub struct SearchVariables {
    pub text: String,
    #[serde(skip_serializing_if = "gqlbind::Optional::is_absent")]
    pub filter: gqlbind::Optional<Filter>,
}

impl gqlbind::ToShape for SearchVariables {
    fn shape(&self) -> gqlbind::Shape<'_> {
        gqlbind::Shape::Record(vec![
            ("text", gqlbind::ToShape::shape(&self.text)),
            ("filter", gqlbind::ToShape::shape(&self.filter)),
        ])
    }
}

/// `SearchResult` selection, one variant per concrete type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchSearch {
    User(SearchSearchUser),
    Bot(SearchSearchBot),
}

impl gqlbind::Polymorphic for SearchSearch {
    const TYPE_NAME: &'static str = "SearchResult";
    const POSSIBLE_TYPES: &'static [&'static str] = &["User", "Bot"];

    fn decode_variant(typename: &str, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        match typename {
            "User" => serde_json::from_value(value).map(Self::User),
            "Bot" => serde_json::from_value(value).map(Self::Bot),
            other => Err(<serde_json::Error as serde::de::Error>::unknown_variant(
                other,
                Self::POSSIBLE_TYPES,
            )),
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            Self::User(_) => "User",
            Self::Bot(_) => "Bot",
        }
    }
}

impl<'de> Deserialize<'de> for SearchSearch {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        gqlbind::deserialize_polymorphic(deserializer)
    }
}

impl SearchSearch {
    pub fn typename(&self) -> &String {
        match self {
            Self::User(value) => &value.typename,
            Self::Bot(value) => &value.typename,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSearchUser {
    #[serde(rename = "__typename")]
    pub typename: String,
    pub id: String,
    pub name: Option<String>,
}

impl SearchSearchUser {
    pub fn typename(&self) -> &String {
        &self.typename
    }

    pub fn id(&self) -> &String {
        &self.id
    }

    pub fn name(&self) -> &Option<String> {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSearchBot {
    #[serde(rename = "__typename")]
    pub typename: String,
    pub id: String,
}

impl SearchSearchBot {
    pub fn typename(&self) -> &String {
        &self.typename
    }

    pub fn id(&self) -> &String {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub search: Vec<SearchSearch>,
}

impl SearchResponse {
    pub fn search(&self) -> &Vec<SearchSearch> {
        &self.search
    }
}

pub const SEARCH_OPERATION: &str = r#"query Search($text: String!, $filter: Filter) {
  search(text: $text, filter: $filter) {
    __typename
    ... on User {
      id
      name
    }
    ... on Bot {
      id
    }
  }
}
"#;

pub struct SearchQuery;

impl gqlbind::Operation for SearchQuery {
    const NAME: &'static str = "Search";
    const QUERY: &'static str = SEARCH_OPERATION;
    type Variables = SearchVariables;
    type Response = SearchResponse;
}

pub async fn search<C: gqlbind::GraphQlClient>(
    client: &C,
    cancel: &gqlbind::CancellationToken,
    text: String,
    filter: gqlbind::Optional<Filter>,
) -> gqlbind::Result<gqlbind::GraphQlResponse<SearchResponse>> {
    let request = <SearchQuery as gqlbind::Operation>::request(SearchVariables { text, filter });
    let mut response = gqlbind::GraphQlResponse::default();
    client.make_request(&request, &mut response, cancel).await?;
    Ok(response)
}
