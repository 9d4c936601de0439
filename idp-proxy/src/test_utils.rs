use crate::config::ProxyConfig;
use crate::create_app;
use crate::hierarchy::HierarchyConfig;
use crate::state::AppState;
use axum::body::{Body, Bytes};
use axum::Router;
use http::{header, HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use url::Url;
use wiremock::MockServer;

/// Test fixture with a mocked IDP and a private hierarchy configuration directory.
///
/// The IDP mock serves `/authorize`, `/token` and `/userinfo` under its own
/// base URL; tests mount the responses they need.
///
/// # Examples
///
/// ```rust
/// #[tokio::test]
/// async fn test_endpoint() {
///     let fixture = TestFixture::new().await;
///
///     Mock::given(matchers::method("GET"))
///         .and(matchers::path("/userinfo"))
///         .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "roles": [] })))
///         .mount(&fixture.idp_mock)
///         .await;
///
///     let response = fixture.get_with_bearer("/userinfo", "token").await;
///     response.assert_ok();
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration the app was built with
    pub config: ProxyConfig,
    /// Mock server standing in for the IDP
    pub idp_mock: MockServer,
    /// Directory holding the hierarchy configuration file
    pub config_dir: TempDir,
}

impl TestFixture {
    /// Creates a fixture with the default test configuration
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Creates a fixture after letting `customize` adjust the configuration
    pub async fn with_config(customize: impl FnOnce(&mut ProxyConfig)) -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let idp_mock = MockServer::start().await;
        let config_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = ProxyConfig::for_test_with_mocks(
            &idp_mock,
            config_dir.path().join("hierarchy_config.json"),
        );
        customize(&mut config);

        let state = AppState::for_testing(&config);
        let app = create_app(state).await;

        Self {
            app,
            config,
            idp_mock,
            config_dir,
        }
    }

    /// Initializes the test logger, repeated calls are ignored
    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    /// Writes the hierarchy configuration file directly to disk
    pub fn write_hierarchy_config(&self, config: &HierarchyConfig) {
        let content = serde_json::to_string_pretty(config).expect("Failed to serialize config");
        std::fs::write(&self.config.hierarchy.path, content).expect("Failed to write config");
    }

    /// Reads the hierarchy configuration file from disk
    pub fn read_hierarchy_config(&self) -> Option<HierarchyConfig> {
        let content = std::fs::read_to_string(&self.config.hierarchy.path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Sends a GET request without any extra headers
    pub async fn get(&self, uri: impl AsRef<str>) -> TestResponse {
        self.get_with_headers(uri, &[]).await
    }

    /// Sends a GET request with an `Authorization: Bearer` header
    pub async fn get_with_bearer(&self, uri: impl AsRef<str>, token: &str) -> TestResponse {
        let value = format!("Bearer {token}");
        self.get_with_headers(uri, &[("Authorization", value.as_str())])
            .await
    }

    /// Sends a GET request with custom headers
    pub async fn get_with_headers(
        &self,
        uri: impl AsRef<str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(Method::GET).uri(uri.as_ref());
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a POST request with an `application/x-www-form-urlencoded` body
    pub async fn post_form(&self, uri: impl AsRef<str>, body: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri.as_ref())
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a request and collects the response
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Try to parse as JSON, defaulting to null if parsing fails or empty body
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            json,
        }
    }

    /// Number of requests the IDP mock has received
    pub async fn idp_request_count(&self) -> usize {
        self.idp_mock
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}

/// Response from a test request with convenient access to status, headers and body.
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw response body
    pub body: Bytes,
    /// Response body as JSON (`Null` if absent or not JSON)
    pub json: Value,
}

impl TestResponse {
    /// Asserts that the response has the expected status code
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts that the response status is OK (200)
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// Asserts an OAuth error body with the given status and code
    pub fn assert_oauth_error(&self, status: StatusCode, error: &str) -> &Self {
        self.assert_status(status);
        assert_eq!(self.json["error"], error, "unexpected error body: {}", self.json);
        assert!(
            self.json["error_description"].is_string(),
            "missing error_description: {}",
            self.json
        );
        self
    }

    /// Value of a response header
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// The `Location` header parsed as URL
    pub fn location(&self) -> Url {
        let location = self.header("location").expect("Missing Location header");
        Url::parse(location).expect("Location is not a valid URL")
    }

    /// Query pairs of the `Location` header, in order
    pub fn location_query(&self) -> Vec<(String, String)> {
        self.location().query_pairs().into_owned().collect()
    }

    /// Converts the response body to the specified type
    pub fn json_as<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.json.clone()).expect("Failed to deserialize response JSON")
    }
}
