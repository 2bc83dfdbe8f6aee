//! client configuration
//!
//! build a [`ClientConfig`] with the endpoint and optional overrides, then
//! pass it to [`crate::Client::new`]. there is no process-wide default
//! client; every transport setting lives on this value.

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// http method used to send operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMethod {
    /// json body, `Content-Type: application/json`
    #[default]
    Post,
    /// url query parameters; queries only
    Get,
}

/// configuration for the graphql client
#[derive(Clone)]
pub struct ClientConfig {
    /// original endpoint input
    pub(crate) raw_endpoint: String,

    /// graphql endpoint (e.g., "<https://api.example.com/graphql>")
    pub(crate) endpoint: Url,

    /// whether the provided endpoint parsed successfully
    pub(crate) endpoint_valid: bool,

    /// method used to send operations
    pub(crate) method: RequestMethod,

    /// request timeout applied to the underlying http client
    pub(crate) timeout: Option<Duration>,

    /// user agent string
    pub(crate) user_agent: String,

    /// whether to verify ssl certificates
    pub(crate) verify_ssl: bool,

    /// additional headers to send with every request
    pub(crate) extra_headers: HeaderMap,

    /// prebuilt http client (takes precedence over http_client_builder)
    pub(crate) http_client: Option<reqwest::Client>,

    /// callback to customize the http client builder before building
    pub(crate) http_client_builder:
        Option<Arc<dyn Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync>>,
}

impl ClientConfig {
    /// create a new client configuration
    ///
    /// # arguments
    ///
    /// * `endpoint` - full url of the graphql endpoint
    ///
    /// # example
    ///
    /// ```
    /// use gqlbind::ClientConfig;
    ///
    /// let config = ClientConfig::new("https://api.example.com/graphql");
    /// ```
    pub fn new(endpoint: impl AsRef<str>) -> Self {
        let raw = endpoint.as_ref();
        let trimmed = raw.trim();

        let (endpoint, endpoint_valid) = match Url::parse(trimmed)
            .or_else(|_| Url::parse(&format!("https://{}", trimmed)))
        {
            Ok(url) => (url, true),
            Err(_) => (Url::parse("https://invalid.invalid").unwrap(), false),
        };

        Self {
            raw_endpoint: raw.to_string(),
            endpoint,
            endpoint_valid,
            method: RequestMethod::Post,
            timeout: None,
            user_agent: format!("gqlbind/{} (Rust)", env!("CARGO_PKG_VERSION")),
            verify_ssl: true,
            extra_headers: HeaderMap::new(),
            http_client: None,
            http_client_builder: None,
        }
    }

    /// send operations as GET requests (mutations are rejected)
    pub fn with_method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    /// set the request timeout
    ///
    /// default: none
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// set a custom user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// disable ssl certificate verification (not recommended for production)
    ///
    /// default: enabled
    pub fn with_ssl_verification(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// add a header to every request
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.extra_headers.insert(name, value);
        self
    }

    /// add a set of headers to every request
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.extra_headers.extend(headers);
        self
    }

    /// add a bearer token authorization header
    pub fn with_bearer_token(self, token: impl AsRef<str>) -> Result<Self> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token.as_ref()))
            .map_err(|err| Error::Config(format!("invalid token header value: {err}")))?;
        Ok(self.with_header(reqwest::header::AUTHORIZATION, value))
    }

    /// access extra headers configured on this client
    pub fn extra_headers(&self) -> &HeaderMap {
        &self.extra_headers
    }

    /// endpoint operations are sent to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// method operations are sent with
    pub fn method(&self) -> RequestMethod {
        self.method
    }

    /// inject a prebuilt http client.
    ///
    /// when set, this client is used as-is and takes precedence over
    /// `with_http_client_builder`. transport configuration such as tls,
    /// timeouts, and the user agent comes from the prebuilt client; the
    /// corresponding `ClientConfig` fields are ignored. extra headers are
    /// still attached to each request.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// customize the http client builder before the client is created.
    ///
    /// the callback receives a builder that already has the user agent,
    /// timeout, and ssl settings applied. use this to add proxy config,
    /// custom tls roots, or other transport settings.
    ///
    /// ignored if `with_http_client` is also set.
    pub fn with_http_client_builder<F>(mut self, f: F) -> Self
    where
        F: Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync + 'static,
    {
        self.http_client_builder = Some(Arc::new(f));
        self
    }

    /// validate the configuration
    pub(crate) fn validate(&self) -> Result<()> {
        if !self.endpoint_valid {
            return Err(Error::Config(format!(
                "invalid endpoint: {}",
                self.raw_endpoint
            )));
        }

        if self.endpoint.scheme() != "http" && self.endpoint.scheme() != "https" {
            return Err(Error::Config(format!(
                "invalid url scheme: {}. must be http or https",
                self.endpoint.scheme()
            )));
        }

        Ok(())
    }

    /// build the http client described by this configuration
    pub(crate) fn build_http_client(&self) -> Result<reqwest::Client> {
        if let Some(client) = &self.http_client {
            return Ok(client.clone());
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .danger_accept_invalid_certs(!self.verify_ssl);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(customize) = &self.http_client_builder {
            builder = customize(builder);
        }

        Ok(builder.build()?)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("method", &self.method)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("verify_ssl", &self.verify_ssl)
            .field("extra_headers", &"<redacted>")
            .field("http_client", &self.http_client.is_some())
            .field("http_client_builder", &self.http_client_builder.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config() {
        let config = ClientConfig::new("https://api.example.com/graphql");
        assert_eq!(config.endpoint.as_str(), "https://api.example.com/graphql");
        assert_eq!(config.method, RequestMethod::Post);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_missing_scheme_defaults_to_https() {
        let config = ClientConfig::new("api.example.com/graphql");
        assert_eq!(config.endpoint.as_str(), "https://api.example.com/graphql");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_endpoint_is_invalid() {
        let config = ClientConfig::new("");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut config = ClientConfig::new("https://api.example.com/graphql");
        config.endpoint_valid = false;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validation_invalid_scheme() {
        let config = ClientConfig::new("ftp://example.com/graphql");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_builder_helpers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-test"),
            HeaderValue::from_static("value"),
        );

        let config = ClientConfig::new("https://api.example.com/graphql")
            .with_method(RequestMethod::Get)
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("gqlbind-test")
            .with_ssl_verification(false)
            .with_headers(headers.clone())
            .with_header(
                HeaderName::from_static("x-other"),
                HeaderValue::from_static("other"),
            )
            .with_bearer_token("secret")
            .unwrap();

        assert_eq!(config.method(), RequestMethod::Get);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.user_agent, "gqlbind-test");
        assert!(!config.verify_ssl);
        assert_eq!(config.extra_headers.get("x-test").unwrap(), "value");
        assert_eq!(config.extra_headers.get("x-other").unwrap(), "other");
        assert_eq!(
            config.extra_headers.get("authorization").unwrap(),
            "Bearer secret"
        );
    }

    #[test]
    fn test_invalid_token_header() {
        let err = ClientConfig::new("https://api.example.com/graphql")
            .with_bearer_token("bad\ntoken")
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_with_http_client() {
        let config = ClientConfig::new("https://api.example.com/graphql")
            .with_http_client(reqwest::Client::new());
        assert!(config.http_client.is_some());
        assert!(config.http_client_builder.is_none());
    }

    #[test]
    fn test_debug_redacts_headers() {
        let config = ClientConfig::new("https://api.example.com/graphql")
            .with_bearer_token("secret")
            .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("\"<redacted>\""));
        assert!(debug.contains("http_client: false"));
    }
}
