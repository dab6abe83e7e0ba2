//! Production rest-hook transport over a shared pooled HTTP client.

use crate::channel::transport::{RestMethod, RestRequest, RestResponse, RestTransport, TransportError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;

/// [`RestTransport`] backed by a `reqwest` client.
///
/// The client is constructed by the caller and shared across all deliveries
/// for the dispatcher's lifetime, so connection pooling spans subscriptions
/// without any process-wide singleton.
pub struct HttpRestTransport {
    client: reqwest::Client,
}

impl HttpRestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RestTransport for HttpRestTransport {
    async fn execute(&self, request: RestRequest) -> Result<RestResponse, TransportError> {
        let method = match request.method {
            RestMethod::Post => Method::POST,
            RestMethod::Put => Method::PUT,
            RestMethod::Delete => Method::DELETE,
        };

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|error| {
                TransportError::new(format!("invalid header name '{name}': {error}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|error| {
                TransportError::new(format!("invalid header value for '{name}': {error}"))
            })?;
            headers.append(header_name, header_value);
        }
        if let Some(content_type) = request.content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }

        let mut builder = self
            .client
            .request(method, request.url.as_str())
            .headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|error| TransportError::new(error.to_string()))?;

        Ok(RestResponse {
            status: response.status().as_u16(),
        })
    }
}
