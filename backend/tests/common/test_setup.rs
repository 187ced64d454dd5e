use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use biblioteca::{
    server,
    sessions::BoundedMemoryStore,
    types::{AdminCredentials, AppConfig},
};
use catalog_storage::book::{BookStore, InMemoryBookStore};
use tower::ServiceExt;

use super::utils::{multipart_body, MultipartFile};

pub const ADMIN_USERNAME: &str = "bibliotecario";
pub const ADMIN_PASSWORD: &str = "clave-de-prueba";

/// Setup test environment with tracing enabled
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// A full application over an in-memory store, acting as a single browser
///
/// The session cookie returned by the service is kept and sent back on every request.
pub struct TestSetup {
    pub router: Router,
    pub store: Arc<InMemoryBookStore>,
    pub sessions: BoundedMemoryStore,
    cookie: Mutex<Option<String>>,
}

impl TestSetup {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryBookStore::new());
        Self::build(store.clone(), store, BoundedMemoryStore::default())
    }

    /// Application whose session store holds at most `capacity` sessions
    pub fn with_session_capacity(capacity: usize) -> Self {
        let store = Arc::new(InMemoryBookStore::new());
        Self::build(store.clone(), store, BoundedMemoryStore::new(capacity))
    }

    /// Application over any store; `self.store` is then a detached, empty store
    pub fn with_store(store: Arc<dyn BookStore>) -> Self {
        Self::build(
            store,
            Arc::new(InMemoryBookStore::new()),
            BoundedMemoryStore::default(),
        )
    }

    fn build(
        served: Arc<dyn BookStore>,
        store: Arc<InMemoryBookStore>,
        sessions: BoundedMemoryStore,
    ) -> Self {
        setup_test_env();

        let config = AppConfig::development(AdminCredentials::new(ADMIN_USERNAME, ADMIN_PASSWORD));

        Self {
            router: server::router_with_sessions(Arc::new(config), served, sessions.clone()),
            store,
            sessions,
            cookie: Mutex::new(None),
        }
    }

    /// Sends a request as a fresh browser, without the kept cookie
    pub async fn send_anonymous_request(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send_request(&self, builder: axum::http::request::Builder, body: Body) -> Response {
        self.send(builder, body).await
    }

    async fn send(&self, builder: axum::http::request::Builder, body: Body) -> Response {
        let builder = match self.cookie.lock().unwrap().clone() {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        };
        let request = builder.body(body).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            *self.cookie.lock().unwrap() = Some(pair);
        }

        response
    }

    pub async fn send_get_request(&self, route: &str) -> Response {
        self.send(Request::builder().uri(route).method("GET"), Body::empty())
            .await
    }

    /// Sends an url-encoded form; values are sent as given, without escaping
    pub async fn send_form_request(&self, route: &str, pairs: &[(&str, &str)]) -> Response {
        let body = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        self.send(
            Request::builder()
                .uri(route)
                .method("POST")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(body),
        )
        .await
    }

    pub async fn send_multipart_request(
        &self,
        route: &str,
        fields: &[(&str, &str)],
        file: Option<MultipartFile<'_>>,
    ) -> Response {
        let (content_type, body) = multipart_body(fields, file);

        self.send(
            Request::builder()
                .uri(route)
                .method("POST")
                .header(header::CONTENT_TYPE, content_type),
            Body::from(body),
        )
        .await
    }

    /// Logs in with the configured administrator and drops the welcome notice
    pub async fn login(&self) {
        let response = self
            .send_form_request(
                "/login",
                &[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)],
            )
            .await;
        assert_eq!(super::utils::location(&response), Some("/admin"));

        self.send_get_request("/admin").await;
    }
}
