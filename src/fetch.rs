//! HTTP client abstraction for making requests to the Zyvia API

use crate::error::{extract_api_message, Error};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    multipart::Form,
    Client, Method, RequestBuilder, Response,
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use url::Url;

/// Request body variants
enum Body {
    Json(Vec<u8>),
    Multipart(Form),
}

/// Helper for building and executing HTTP requests
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    query_params: Option<HashMap<String, String>>,
    body: Option<Body>,
}

impl<'a> FetchBuilder<'a> {
    /// Create a new FetchBuilder
    pub fn new(client: &'a Client, url: &str, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self {
            client,
            url: url.to_string(),
            method,
            headers,
            query_params: None,
            body: None,
        }
    }

    /// Add a header to the request
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(_) => log::warn!("Dropping header {} with invalid value", name),
        }
        self
    }

    /// Add bearer token authentication to the request
    pub fn bearer_auth(mut self, token: &str) -> Self {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                self.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => log::warn!("Access token contains characters not allowed in a header"),
        }
        self
    }

    /// Add query parameters to the request
    pub fn query(mut self, params: HashMap<String, String>) -> Self {
        self.query_params = Some(params);
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(body)?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(Body::Json(json));
        Ok(self)
    }

    /// Add a multipart form body to the request
    pub fn multipart(mut self, form: Form) -> Self {
        self.body = Some(Body::Multipart(form));
        self
    }

    /// Build the request
    fn build(self) -> Result<RequestBuilder, Error> {
        let mut url = Url::parse(&self.url)?;

        // Add query parameters if present
        if let Some(params) = &self.query_params {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in params {
                query_pairs.append_pair(key, value);
            }
        }

        let mut req = self.client.request(self.method, url.as_str());
        req = req.headers(self.headers);

        req = match self.body {
            Some(Body::Json(body)) => req.body(body),
            Some(Body::Multipart(form)) => req.multipart(form),
            None => req,
        };

        Ok(req)
    }

    /// Execute the request and return the raw response
    pub async fn execute_raw(self) -> Result<Response, Error> {
        let method = self.method.clone();
        let url = self.url.clone();
        let req = self.build()?;

        log::debug!("{} {}", method, url);
        let response = req.send().await.map_err(|err| {
            log::warn!("{} {} failed: {}", method, url, err);
            Error::Http(err)
        })?;
        log::debug!("{} {} -> {}", method, url, response.status());

        Ok(response)
    }

    /// Execute the request and return the parsed JSON body of a success response
    pub async fn execute_value(self) -> Result<serde_json::Value, Error> {
        let response = ensure_success(self.execute_raw().await?).await?;
        let text = response.text().await?;

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|err| Error::invalid_response(format!("Response is not valid JSON: {}", err)))
    }

    /// Execute the request and parse the response as JSON
    pub async fn execute<T: DeserializeOwned>(self) -> Result<T, Error> {
        let value = self.execute_value().await?;
        serde_json::from_value(value)
            .map_err(|err| Error::invalid_response(format!("Unexpected response shape: {}", err)))
    }

    /// Execute the request, discarding the body of a success response
    pub async fn execute_empty(self) -> Result<(), Error> {
        ensure_success(self.execute_raw().await?).await?;
        Ok(())
    }
}

/// Turn a non-success response into [`Error::Api`].
pub async fn ensure_success(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| extract_api_message(&value))
        .unwrap_or_default();

    Err(Error::Api {
        status: status.as_u16(),
        message,
        body,
    })
}

/// Helper for creating HTTP requests
pub struct Fetch;

impl Fetch {
    /// Create a GET request
    pub fn get<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::GET)
    }

    /// Create a POST request
    pub fn post<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::POST)
    }

    /// Create a DELETE request
    pub fn delete<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::DELETE)
    }
}
