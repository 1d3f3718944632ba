//! Shared utilities for integration testing.

use std::sync::Arc;
use todo_api::auth::capability;
use todo_api::config::ApiConfig;
use todo_api::lifecycle::Shutdown;
use todo_api::store::SqliteStore;
use todo_api::HttpServer;

/// A running server on an ephemeral port backed by an in-memory database.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(ApiConfig::default()).await
    }

    pub async fn start_with(config: ApiConfig) -> Self {
        let base_path = config.listener.base_path.clone();
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let server = HttpServer::new(config, store);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()
            .unwrap();

        Self {
            base_url: format!("http://{}{}", addr, base_path),
            client,
            shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request as `user` holding every capability.
    pub fn as_user(&self, method: reqwest::Method, path: &str, user: &str) -> reqwest::RequestBuilder {
        self.with_privileges(method, path, user, &capability::ALL.join(","))
    }

    pub fn with_privileges(
        &self,
        method: reqwest::Method,
        path: &str,
        user: &str,
        privileges: &str,
    ) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("x-user-id", user)
            .header("x-user-role", "user")
            .header("x-user-privilege", privileges)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}
