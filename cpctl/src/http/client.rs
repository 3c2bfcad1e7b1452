//! HTTP client implementation

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::utils::user_agent;

/// Header carrying the control-plane API key
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// HTTP client for the control-plane API.
///
/// No per-request timeout and no retries: a failed call is returned to the
/// caller as-is.
pub struct HttpClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().user_agent(user_agent()).build()?;

        Ok(Self {
            client,
            base_url: config.host.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> (String, RequestBuilder) {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let request = self
            .client
            .request(method, &url)
            .header(API_KEY_HEADER, self.api_key.expose_secret());

        (url, request)
    }

    /// Make a GET request, expecting `200 OK`
    pub async fn get<T: DeserializeOwned>(&self, path: &str, context: &str) -> Result<T, ClientError> {
        let (url, request) = self.request(Method::GET, path);
        let response = request.send().await?;
        let response = expect_status(response, StatusCode::OK, &url, context).await?;
        read_json(response).await
    }

    /// Make a POST request with a JSON body, expecting `expected`
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        expected: StatusCode,
        context: &str,
    ) -> Result<T, ClientError> {
        let (url, request) = self.request(Method::POST, path);
        let response = request.json(body).send().await?;
        let response = expect_status(response, expected, &url, context).await?;
        read_json(response).await
    }

    /// Make a PATCH request with a JSON body, expecting `200 OK`.
    ///
    /// The response body is not inspected.
    pub async fn patch<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        context: &str,
    ) -> Result<(), ClientError> {
        let (url, request) = self.request(Method::PATCH, path);
        let response = request.json(body).send().await?;
        expect_status(response, StatusCode::OK, &url, context).await?;
        Ok(())
    }

    /// Make a DELETE request, expecting `204 No Content`
    pub async fn delete(&self, path: &str, context: &str) -> Result<(), ClientError> {
        let (url, request) = self.request(Method::DELETE, path);
        let response = request.send().await?;
        expect_status(response, StatusCode::NO_CONTENT, &url, context).await?;
        Ok(())
    }
}

async fn expect_status(
    response: Response,
    expected: StatusCode,
    url: &str,
    context: &str,
) -> Result<Response, ClientError> {
    let status = response.status();
    if status == expected {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!("HTTP request to {} failed: {} - {}", url, status, body);
    Err(ClientError::StatusError {
        context: context.to_string(),
        status,
        body,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
