use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::{Repository, RepositoryPtr, User};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
        }
    }
}

pub fn create_postgres_repository(pool: PgPool) -> RepositoryPtr {
    // ---
    Arc::new(PostgresRepository::new(pool))
}

pub struct PostgresRepository {
    // ---
    pool: PgPool,
}

impl PostgresRepository {
    // ---
    pub fn new(pool: PgPool) -> Self {
        // ---
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Repository for PostgresRepository {
    // ---
    async fn ensure_schema(&self) -> Result<()> {
        // ---
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                 id SERIAL PRIMARY KEY,
                 username TEXT NOT NULL,
                 email TEXT NOT NULL
             )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        // ---
        sqlx::query("SELECT 1").execute(&self.pool).await?;

        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        // ---
        let rows = sqlx::query_as::<_, UserRow>("SELECT id, username, email FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn create_user(&self, username: &str, email: &str) -> Result<i32> {
        // ---
        let id: i32 =
            sqlx::query_scalar("INSERT INTO users (username, email) VALUES ($1, $2) RETURNING id")
                .bind(username)
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(id)
    }

    async fn count_users(&self) -> Result<i64> {
        // ---
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn username_counts(&self, limit: i64) -> Result<Vec<(String, i64)>> {
        // ---
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT u.username, COUNT(*) AS user_count
             FROM users u
             GROUP BY u.username
             ORDER BY user_count DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
