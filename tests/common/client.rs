//! HTTP client for end-to-end tests
//!
//! Wraps reqwest and provides one method per server endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::{RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;

/// HTTP test client holding an optional bearer token
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    #[allow(dead_code)]
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    /// Bearer token attached to every request, if any
    pub token: Option<String>,
}

#[allow(dead_code)]
impl TestClient {
    /// Creates a new unauthenticated client
    ///
    /// Use this for testing authentication flows.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// Creates a client holding a token obtained through `POST /token`
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated(base_url: String) -> Self {
        let mut client = Self::new(base_url);

        let response = client.request_token(TEST_USER).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::OK,
            "Test user authentication failed"
        );
        let body: Value = response.json().await.expect("Token response is not JSON");
        client.token = Some(
            body["token"]
                .as_str()
                .expect("Token response has no token")
                .to_string(),
        );

        client
    }

    /// Returns a copy of this client that sends the given raw token
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.to_string()),
        }
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // ========================================================================
    // Public Endpoints
    // ========================================================================

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    /// POST /token
    pub async fn request_token(&self, username: &str) -> Response {
        self.client
            .post(format!("{}/token", self.base_url))
            .form(&[("username", username), ("password", "ignored")])
            .send()
            .await
            .expect("Token request failed")
    }

    // ========================================================================
    // Show Endpoints
    // ========================================================================

    /// POST /show/
    pub async fn create_show(&self, body: &Value) -> Response {
        self.authorize(self.client.post(format!("{}/show/", self.base_url)))
            .json(body)
            .send()
            .await
            .expect("Create show request failed")
    }

    /// GET /show/{show_id}
    pub async fn get_show(&self, show_id: i64) -> Response {
        self.authorize(
            self.client
                .get(format!("{}/show/{}", self.base_url, show_id)),
        )
        .send()
        .await
        .expect("Get show request failed")
    }

    /// PUT /show/{show_id}
    pub async fn update_show(&self, show_id: i64, body: &Value) -> Response {
        self.authorize(
            self.client
                .put(format!("{}/show/{}", self.base_url, show_id)),
        )
        .json(body)
        .send()
        .await
        .expect("Update show request failed")
    }

    /// DELETE /show/{show_id}
    pub async fn delete_show(&self, show_id: i64) -> Response {
        self.authorize(
            self.client
                .delete(format!("{}/show/{}", self.base_url, show_id)),
        )
        .send()
        .await
        .expect("Delete show request failed")
    }

    /// GET /shows with the given query parameters
    pub async fn search_shows(&self, params: &[(&str, &str)]) -> Response {
        self.authorize(self.client.get(format!("{}/shows", self.base_url)))
            .query(params)
            .send()
            .await
            .expect("Search request failed")
    }

    /// GET /shows, asserting success and returning the parsed array
    pub async fn search_shows_ok(&self, params: &[(&str, &str)]) -> Vec<Value> {
        let response = self.search_shows(params).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Search response is not a JSON array")
    }

    /// GET /summary
    pub async fn get_summary(&self) -> Response {
        self.authorize(self.client.get(format!("{}/summary", self.base_url)))
            .send()
            .await
            .expect("Summary request failed")
    }
}
