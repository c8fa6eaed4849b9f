use super::models::User;
use anyhow::Result;
use std::sync::Arc;

/// Abstraction over the relational store backing the `/users`,
/// `/database-query` and `/health` routes.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    // ---
    /// Create the `users` table if it does not exist yet.
    async fn ensure_schema(&self) -> Result<()>;

    /// Round-trip a trivial query to prove the store is reachable.
    async fn ping(&self) -> Result<()>;

    /// All users ordered by id.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Insert a user and return the generated id.
    async fn create_user(&self, username: &str, email: &str) -> Result<i32>;

    /// Total number of users.
    async fn count_users(&self) -> Result<i64>;

    /// Usernames with their occurrence counts, most frequent first.
    async fn username_counts(&self, limit: i64) -> Result<Vec<(String, i64)>>;
}

/// Type alias for any backend that implements Repository.
pub type RepositoryPtr = Arc<dyn Repository>;
