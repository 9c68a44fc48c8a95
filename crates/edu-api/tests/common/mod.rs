use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use edu_api::{
    advisor::Advisor,
    config::Environment,
    review::{ReviewLifecycle, ReviewScheduler},
    router,
    state::ApiState,
};
use edu_db::{MemoryScheduledTestStore, ScheduledTestStore};
use edu_srs::BandPolicy;
use http_body_util::BodyExt;
use serde::Deserialize;
use tower::ServiceExt;

/// Test state builder: in-memory store, no advisor unless one is given
pub struct TestStateBuilder {
    store: Arc<dyn ScheduledTestStore>,
    advisor: Option<Arc<dyn Advisor>>,
    advisor_timeout: Duration,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryScheduledTestStore::new()),
            advisor: None,
            advisor_timeout: Duration::from_millis(250),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ScheduledTestStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_advisor(mut self, advisor: impl Advisor + 'static, timeout: Duration) -> Self {
        self.advisor = Some(Arc::new(advisor));
        self.advisor_timeout = timeout;
        self
    }

    pub fn build(self) -> ApiState {
        let mut scheduler = ReviewScheduler::new(BandPolicy::default());
        if let Some(advisor) = self.advisor {
            scheduler = scheduler.with_advisor(advisor, self.advisor_timeout);
        }

        ApiState::new(
            ReviewLifecycle::new(scheduler, self.store),
            Environment::Development,
        )
    }

    /// Router with all layers, ready to drive with [`TestClient`]
    pub fn app(self) -> Router {
        router::app(self.build(), None)
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper to make requests to the test app
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Send a request and get the response
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    /// Send a GET request
    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.request(request).await
    }

    /// Send a POST request with JSON body
    pub async fn post_json<T: serde::Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body");

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json_body))
            .expect("Failed to build request");

        self.request(request).await
    }

    /// Send a DELETE request
    pub async fn delete(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.request(request).await
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: axum::http::HeaderMap,
}

impl TestResponse {
    /// Get response body as string
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not valid UTF-8")
    }

    /// Parse response body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Assert status code
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Client over a fresh in-memory app
pub fn client() -> TestClient {
    TestClient::new(TestStateBuilder::new().app())
}
