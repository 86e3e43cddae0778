use crate::config::StoreConfig;
use crate::errors::{api_error, StoreError};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::AUTHORIZATION;
use reqwest::{Error, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Model for the API client object
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub config: StoreConfig,
    pub client: reqwest::Client,
}

/// A generic HTTP interface that leverages `reqwest`.
#[async_trait]
pub trait ApiConnector: Send + Sync {
    async fn perform_request<T>(
        &self,
        method: Method,
        path: String,
        body: Option<T>,
        query: Option<Vec<(&str, &str)>>,
    ) -> Result<Response, Error>
    where
        T: Serialize + Send;
}

#[async_trait]
impl ApiConnector for ApiClient {
    /// Issues HTTP requests against the configured host.
    ///
    /// # Arguments
    ///
    /// * `&self`
    /// * `method` - One of reqwest::Method (GET, POST, ...)
    /// * `path` - Absolute path on the host, e.g. `/api/environment`
    /// * `body` - Optional body to be sent with the request
    /// * `query` - Optional query parameters
    async fn perform_request<T>(
        &self,
        method: Method,
        path: String,
        body: Option<T>,
        query: Option<Vec<(&str, &str)>>,
    ) -> Result<Response, Error>
    where
        T: Serialize + Send,
    {
        let url = format!("{}{}", self.config.base_url(), path);
        debug!("{} {}", method, url);
        let mut req = self.client.request(method.clone(), &url);

        if let Some(token) = &self.config.access_token {
            req = req.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        if let Some(params) = query {
            req = req.query(&params);
        }

        match method {
            Method::POST | Method::PUT | Method::PATCH => {
                if let Some(b) = body {
                    req = req.json(&b);
                } else {
                    req = req.header("Content-Type", "application/json").body("{}");
                }
            }
            _ => {}
        }

        let response = req.send().await?;
        Ok(response)
    }
}

impl From<StoreConfig> for ApiClient {
    fn from(config: StoreConfig) -> Self {
        let http_client = reqwest::Client::new();
        ApiClient {
            config,
            client: http_client,
        }
    }
}

/// Reads a response body and deserializes it, turning non-2xx statuses into StoreError::Api.
pub async fn parse_response<T>(response: Response) -> Result<T, StoreError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        warn!("request failed with {}: {}", status, text);
        return Err(api_error(status.as_u16(), text));
    }
    Ok(serde_json::from_str(text.as_str())?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// A request as seen by the FakeConnector
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub method: Method,
        pub path: String,
        pub body: Option<Value>,
        pub query: Vec<(String, String)>,
    }

    /// In-memory connector that replays queued responses and records every request.
    #[derive(Clone, Default)]
    pub struct FakeConnector {
        responses: Arc<Mutex<VecDeque<(u16, String)>>>,
        requests: Arc<Mutex<Vec<RecordedRequest>>>,
    }

    impl FakeConnector {
        pub fn respond(&self, status: u16, body: impl Into<String>) -> &Self {
            self.responses
                .lock()
                .unwrap()
                .push_back((status, body.into()));
            self
        }

        pub fn respond_json(&self, body: Value) -> &Self {
            self.respond(200, body.to_string())
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn last_request(&self) -> RecordedRequest {
            self.requests().pop().expect("no request was recorded")
        }
    }

    #[async_trait]
    impl ApiConnector for FakeConnector {
        async fn perform_request<T>(
            &self,
            method: Method,
            path: String,
            body: Option<T>,
            query: Option<Vec<(&str, &str)>>,
        ) -> Result<Response, Error>
        where
            T: Serialize + Send,
        {
            self.requests.lock().unwrap().push(RecordedRequest {
                method,
                path,
                body: body.map(|b| serde_json::to_value(&b).unwrap()),
                query: query
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            });
            let (status, text) = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no response queued");
            let response = http::Response::builder()
                .status(status)
                .header("Content-Type", "application/json")
                .body(text)
                .unwrap();
            Ok(Response::from(response))
        }
    }

    #[tokio::test]
    async fn parse_response_decodes_success_body() {
        let connector = FakeConnector::default();
        connector.respond_json(json!({"message": "ok"}));
        let response = connector
            .perform_request(Method::GET, "/ping".to_string(), None::<()>, None)
            .await
            .unwrap();
        let body: Value = parse_response(response).await.unwrap();
        assert_eq!(body["message"], "ok");
    }

    #[tokio::test]
    async fn parse_response_maps_error_status() {
        let connector = FakeConnector::default();
        connector.respond(404, r#"{"message":"Environment not found"}"#);
        let response = connector
            .perform_request(Method::GET, "/api/environment/9".to_string(), None::<()>, None)
            .await
            .unwrap();
        match parse_response::<Value>(response).await {
            Err(StoreError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Environment not found");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn parse_response_rejects_unexpected_body() {
        let connector = FakeConnector::default();
        connector.respond(200, "<html></html>");
        let response = connector
            .perform_request(Method::GET, "/api/environment".to_string(), None::<()>, None)
            .await
            .unwrap();
        assert!(matches!(
            parse_response::<Value>(response).await,
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn client_is_built_from_config() {
        let client = ApiClient::from(StoreConfig {
            host: "https://bytebase.example.com/".to_string(),
            access_token: None,
        });
        assert_eq!(client.config.base_url(), "https://bytebase.example.com");
    }
}
