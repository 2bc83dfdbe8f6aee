//! main client
//!
//! sends operations over POST json, GET query parameters, or multipart
//! upload, and decodes the standard `{data, errors, extensions}` envelope.

use crate::config::{ClientConfig, RequestMethod};
use crate::error::{Error, Result};
use crate::graphql::{GraphQlErrorList, GraphQlResponse};
use crate::multipart;
use crate::operation::Operation;
use crate::request::Request;
use crate::variables::Variables;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// executes requests built by generated bindings
///
/// on server-reported errors `response` still holds whatever data and
/// extensions came back, and the call returns [`Error::GraphQl`].
#[async_trait]
pub trait GraphQlClient: Send + Sync {
    async fn make_request<V, T>(
        &self,
        request: &Request<V>,
        response: &mut GraphQlResponse<T>,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        V: Variables,
        T: DeserializeOwned + Send;
}

/// http graphql client
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
}

impl Client {
    /// create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = config.build_http_client()?;

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// access the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// execute a raw graphql query
    pub async fn execute_raw(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
    ) -> Result<GraphQlResponse<serde_json::Value>> {
        let request = Request::new(query.to_string(), "", variables);
        self.execute(&request).await
    }

    /// send a request and deserialize into a typed response
    pub async fn execute<V, T>(&self, request: &Request<V>) -> Result<GraphQlResponse<T>>
    where
        V: Variables,
        T: DeserializeOwned + Send,
    {
        self.execute_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// like [`Client::execute`], aborting when `cancel` fires
    pub async fn execute_with_cancel<V, T>(
        &self,
        request: &Request<V>,
        cancel: &CancellationToken,
    ) -> Result<GraphQlResponse<T>>
    where
        V: Variables,
        T: DeserializeOwned + Send,
    {
        let mut response = GraphQlResponse::default();
        self.make_request(request, &mut response, cancel).await?;
        Ok(response)
    }

    /// execute a generated operation
    pub async fn execute_operation<O>(
        &self,
        variables: O::Variables,
    ) -> Result<GraphQlResponse<O::Response>>
    where
        O: Operation,
        O::Response: Send,
    {
        self.execute(&O::request(variables)).await
    }
}

#[async_trait]
impl GraphQlClient for Client {
    async fn make_request<V, T>(
        &self,
        request: &Request<V>,
        response: &mut GraphQlResponse<T>,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        V: Variables,
        T: DeserializeOwned + Send,
    {
        self.make_request_with(request, response, cancel, |http_request| async move {
            let http_response = self.http.execute(http_request).await?;
            let status = http_response.status();
            let text = match http_response.text().await {
                Ok(text) => text,
                Err(err) if !status.is_success() => format!("<unreadable: {err}>"),
                Err(err) => return Err(err.into()),
            };
            Ok((status, text))
        })
        .await
    }
}

fn parse_graphql_response<T: DeserializeOwned>(
    status: StatusCode,
    text: String,
    response: &mut GraphQlResponse<T>,
) -> Result<()> {
    if !status.is_success() {
        warn!(status = status.as_u16(), "graphql endpoint returned an error status");
        return Err(Error::Transport {
            status: Some(status.as_u16()),
            message: format!("returned error {status}: {text}"),
            body: text,
        });
    }

    let envelope: GraphQlResponse<serde_json::Value> = serde_json::from_str(&text)?;
    let data = envelope.data.filter(|data| !data.is_null());
    response.extensions = envelope.extensions;

    if envelope.errors.is_empty() {
        response.errors = GraphQlErrorList::default();
        response.data = data.map(serde_json::from_value).transpose()?;
        return Ok(());
    }

    // partial data is kept when it still fits the response type
    response.data = data
        .clone()
        .and_then(|data| serde_json::from_value(data).ok());
    response.errors = envelope.errors.clone();

    let message = envelope.errors.to_string();
    warn!(errors = envelope.errors.len(), %message, "graphql errors in response");
    Err(Error::GraphQl {
        status: Some(status.as_u16()),
        errors: envelope.errors,
        body: text,
        message,
        data,
    })
}

impl Client {
    pub(crate) async fn make_request_with<V, T, F, Fut>(
        &self,
        request: &Request<V>,
        response: &mut GraphQlResponse<T>,
        cancel: &CancellationToken,
        send: F,
    ) -> Result<()>
    where
        V: Variables,
        T: DeserializeOwned,
        F: FnOnce(reqwest::Request) -> Fut,
        Fut: Future<Output = Result<(StatusCode, String)>>,
    {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let http_request = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            built = self.build_request(request) => built?,
        };

        debug!(
            operation = %request.operation_name,
            method = %http_request.method(),
            url = %http_request.url(),
            "sending graphql request"
        );

        let (status, text) = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(operation = %request.operation_name, "graphql request cancelled");
                return Err(Error::Cancelled);
            }
            sent = send(http_request) => sent?,
        };

        parse_graphql_response(status, text, response)
    }

    async fn build_request<V: Variables>(&self, request: &Request<V>) -> Result<reqwest::Request> {
        match self.config.method {
            RequestMethod::Get => self.get_request(request),
            RequestMethod::Post if request.upload_files => self.upload_request(request).await,
            RequestMethod::Post => self.post_request(request),
        }
    }

    fn post_request<V: Variables>(&self, request: &Request<V>) -> Result<reqwest::Request> {
        let body = serde_json::to_vec(request)?;
        Ok(self
            .http
            .post(self.config.endpoint.clone())
            .headers(self.config.extra_headers.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .build()?)
    }

    fn get_request<V: Variables>(&self, request: &Request<V>) -> Result<reqwest::Request> {
        if request.is_mutation() {
            return Err(Error::UnsupportedOperation(
                "mutations cannot be sent over GET".to_string(),
            ));
        }
        if request.upload_files {
            debug!(
                operation = %request.operation_name,
                "multipart upload ignored for GET request"
            );
        }

        let mut url = self.config.endpoint.clone();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !matches!(key.as_ref(), "query" | "operationName" | "variables"))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear().extend_pairs(&kept);
            if !request.query.is_empty() {
                pairs.append_pair("query", &request.query);
            }
            if !request.operation_name.is_empty() {
                pairs.append_pair("operationName", &request.operation_name);
            }
            if let Some(variables) = &request.variables {
                pairs.append_pair("variables", &serde_json::to_string(variables)?);
            }
        }

        Ok(self
            .http
            .get(url)
            .headers(self.config.extra_headers.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .build()?)
    }

    async fn upload_request<V: Variables>(&self, request: &Request<V>) -> Result<reqwest::Request> {
        let form = multipart::pack(request).await?.into_form()?;
        Ok(self
            .http
            .post(self.config.endpoint.clone())
            .headers(self.config.extra_headers.clone())
            .multipart(form)
            .build()?)
    }
}
