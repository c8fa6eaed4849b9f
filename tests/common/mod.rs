// Test helpers are intentionally partially used
#![allow(dead_code)]

use anyhow::{bail, Result};
use golden_signals_demo::domain::{
    MetricEvent, MetricsPtr, MetricsSink, Repository, RepositoryPtr, User,
};
use golden_signals_demo::lifecycle::{EmissionPolicy, MetricNames};
use golden_signals_demo::{build_router, create_memory_metrics, MemoryMetrics, ServerConfig};
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

// ============================================================================
// In-memory stand-ins for PostgreSQL and the metrics backend
// ============================================================================

/// `Repository` backed by a vector. Can be switched to "unreachable" to
/// exercise the 500 paths.
#[derive(Default)]
pub struct MemoryRepository {
    users: Mutex<Vec<User>>,
    unreachable: AtomicBool,
}

impl MemoryRepository {
    // ---
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn unreachable() -> Arc<Self> {
        let repo = Self::default();
        repo.unreachable.store(true, Ordering::SeqCst);
        Arc::new(repo)
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn check(&self) -> Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            bail!("connection refused");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Repository for MemoryRepository {
    // ---
    async fn ensure_schema(&self) -> Result<()> {
        self.check()
    }

    async fn ping(&self) -> Result<()> {
        self.check()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.check()?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_user(&self, username: &str, email: &str) -> Result<i32> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        let id = users.len() as i32 + 1;
        users.push(User {
            id,
            username: username.to_string(),
            email: email.to_string(),
        });
        Ok(id)
    }

    async fn count_users(&self) -> Result<i64> {
        self.check()?;
        Ok(self.users.lock().unwrap().len() as i64)
    }

    async fn username_counts(&self, limit: i64) -> Result<Vec<(String, i64)>> {
        self.check()?;
        let users = self.users.lock().unwrap();
        let mut counts: Vec<(String, i64)> = Vec::new();
        for user in users.iter() {
            match counts.iter_mut().find(|(name, _)| *name == user.username) {
                Some((_, count)) => *count += 1,
                None => counts.push((user.username.clone(), 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(limit as usize);
        Ok(counts)
    }
}

/// Sink whose transport is always down.
pub struct UnavailableSink;

impl MetricsSink for UnavailableSink {
    fn emit(&self, _: &MetricEvent) -> Result<()> {
        bail!("agent unavailable")
    }

    fn render(&self) -> String {
        String::new()
    }
}

// ============================================================================
// Test Server
// ============================================================================

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
    pub policy: Arc<EmissionPolicy>,
}

impl TestServer {
    // ---
    /// Serve the router on an ephemeral port.
    pub async fn start(repository: RepositoryPtr, sink: MetricsPtr, server: ServerConfig) -> Self {
        // --
        // Enable debug logging only when requested
        if std::env::var("TEST_DEBUG").is_ok() {
            let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        }

        let policy = Arc::new(EmissionPolicy::new(sink, "webapp", MetricNames::statsd()));
        let app = build_router(repository, Arc::clone(&policy), &server);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = Client::new();

        Self {
            addr,
            client,
            policy,
        }
    }

    /// Server with an empty in-memory database and a recording sink.
    pub async fn recording() -> (Self, Arc<MemoryMetrics>, Arc<MemoryRepository>) {
        // ---
        let sink = create_memory_metrics();
        let repository = MemoryRepository::new();
        let server = Self::start(repository.clone(), sink.clone(), ServerConfig::default()).await;
        (server, sink, repository)
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send request")
    }
}
