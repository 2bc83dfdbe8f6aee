use gqlbind::{
    CancellationToken, Client, ClientConfig, Error, GraphQlClient, GraphQlResponse, Optional,
    Request, RequestMethod, Shape, ToShape, Upload,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize)]
struct UserData {
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
    name: Option<String>,
}

fn client(server: &MockServer, method: RequestMethod) -> Client {
    Client::new(ClientConfig::new(format!("{}/graphql", server.uri())).with_method(method))
        .expect("client")
}

fn get_user() -> Request<serde_json::Value> {
    Request::new(
        "query GetUser($id: ID!) { user(id: $id) { id name } }",
        "GetUser",
        Some(json!({"id": "1"})),
    )
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn post_sends_json_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "query": "query GetUser($id: ID!) { user(id: $id) { id name } }",
            "variables": {"id": "1"},
            "operationName": "GetUser",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"user": {"id": "1", "name": "ada"}},
            "extensions": {"trace": "abc"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response: GraphQlResponse<UserData> = client(&server, RequestMethod::Post)
        .execute(&get_user())
        .await
        .unwrap();

    let user = response.data.unwrap().user.unwrap();
    assert_eq!(user.id, "1");
    assert_eq!(user.name.as_deref(), Some("ada"));
    assert_eq!(response.extensions.unwrap()["trace"], "abc");
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn get_sends_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/graphql"))
        .and(query_param(
            "query",
            "query GetUser($id: ID!) { user(id: $id) { id name } }",
        ))
        .and(query_param("operationName", "GetUser"))
        .and(query_param("variables", r#"{"id":"1"}"#))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"user": null}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response: GraphQlResponse<UserData> = client(&server, RequestMethod::Get)
        .execute(&get_user())
        .await
        .unwrap();
    assert!(response.data.unwrap().user.is_none());
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn get_rejects_mutation_without_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let request = Request::new(
        "mutation Rename($id: ID!) { rename(id: $id) { id } }",
        "Rename",
        Some(json!({"id": "1"})),
    );
    let err = client(&server, RequestMethod::Get)
        .execute::<_, serde_json::Value>(&request)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation(_)));
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn non_success_status_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .mount(&server)
        .await;

    let err = client(&server, RequestMethod::Post)
        .execute::<_, UserData>(&get_user())
        .await
        .unwrap_err();
    match err {
        Error::Transport { status, body, .. } => {
            assert_eq!(status, Some(503));
            assert_eq!(body, "try later");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn graphql_errors_fill_response_and_fail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"user": {"id": "1", "name": null}},
            "errors": [{"message": "name hidden", "path": ["user", "name"]}]
        })))
        .mount(&server)
        .await;

    let client = client(&server, RequestMethod::Post);
    let mut response = GraphQlResponse::<UserData>::default();
    let err = client
        .make_request(&get_user(), &mut response, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.graphql_errors().unwrap()[0].message, "name hidden");
    assert_eq!(response.errors.len(), 1);
    let user = response.data.unwrap().user.unwrap();
    assert_eq!(user.id, "1");
    assert!(user.name.is_none());
}

#[derive(Serialize)]
struct AttachVariables {
    files: Vec<Upload>,
    #[serde(skip_serializing_if = "Optional::is_absent")]
    cover: Optional<Upload>,
}

impl ToShape for AttachVariables {
    fn shape(&self) -> Shape<'_> {
        Shape::Record(vec![
            ("files", self.files.shape()),
            ("cover", self.cover.shape()),
        ])
    }
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn multipart_upload_deduplicates_identical_files() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"attach": true}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = Request::new(
        "mutation Attach($files: [Upload!]!, $cover: Upload) { attach(files: $files, cover: $cover) }",
        "Attach",
        Some(AttachVariables {
            files: vec![
                Upload::from_bytes("a.txt", b"same bytes".to_vec()),
                Upload::from_bytes("b.txt", b"same bytes".to_vec()),
            ],
            cover: Optional::Value(Upload::from_bytes("cover.png", b"\x89PNG\r\n\x1a\n..".to_vec())),
        }),
    )
    .with_multipart_upload();

    let response: GraphQlResponse<serde_json::Value> = client(&server, RequestMethod::Post)
        .execute(&request)
        .await
        .unwrap();
    assert_eq!(response.data.unwrap()["attach"], true);

    let received = server.received_requests().await.unwrap();
    let content_type = received[0].headers["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&received[0].body);
    assert!(body.contains("name=\"operations\""));
    assert!(body.contains(r#""variables":{"files":[null,null],"cover":null}"#));
    assert!(body.contains(
        r#"{"0":["variables.files.0","variables.files.1"],"1":["variables.cover"]}"#
    ));
    assert!(body.contains("name=\"0\"; filename=\"a.txt\""));
    assert!(body.contains("name=\"1\"; filename=\"cover.png\""));
    assert!(!body.contains("filename=\"b.txt\""));
    assert!(body.contains("image/png"));
    assert_eq!(body.matches("same bytes").count(), 1);
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn cancellation_aborts_slow_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"user": null}}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let client = client(&server, RequestMethod::Post);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = client
        .execute_with_cancel::<_, UserData>(&get_user(), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(5));
}
