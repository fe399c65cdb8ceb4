//! HTTP client implementation

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use marathon_api::ErrorResponse;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use crate::errors::GatewayError;

/// HTTP client for the Marathon REST API
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        Self::read_body("GET", response).await
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        Self::read_body("POST", response).await
    }

    /// Make a PUT request
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("PUT {}", url);

        let response = self.client.put(&url).query(query).json(body).send().await?;
        Self::read_body("PUT", response).await
    }

    async fn read_body<T: DeserializeOwned>(
        method: &str,
        response: Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("HTTP {} returned 404 for {}", method, response.url());
            return Err(GatewayError::NotFound(response.url().path().to_string()));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            // Marathon wraps most rejections in {"message": ...}
            let body = match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(rejection) => rejection.message,
                Err(_) => text,
            };
            error!("HTTP {} failed: {} - {}", method, status, body);
            return Err(GatewayError::ServerError { status, body });
        }

        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes)?;
        Ok(body)
    }
}
