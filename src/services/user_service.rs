use sqlx::PgPool;

use crate::dto::user_dto::UserStats;
use crate::error::{Error, Result};
use crate::models::quiz_result::TopicCount;
use crate::models::user::{AuthUser, User};
use crate::services::quiz_service::completion_summary;
use crate::utils::crypto::{hash_password, verify_password};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<AuthUser> {
        let taken: Option<i32> =
            sqlx::query_scalar("SELECT id FROM users WHERE username = $1 OR email = $2 LIMIT 1")
                .bind(username)
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        if taken.is_some() {
            return Err(Error::Conflict("User already exists".to_string()));
        }

        let password_hash = hash_password(password)?;
        let user = sqlx::query_as::<_, AuthUser>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = user.id, "user registered");
        Ok(user)
    }

    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            tracing::info!(user_id = user.id, "login rejected");
            return Err(Error::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        Ok(user.into())
    }

    pub async fn find_auth_user(&self, user_id: i32) -> Result<Option<AuthUser>> {
        let user = sqlx::query_as::<_, AuthUser>("SELECT id, username, email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn update_profile(&self, user_id: i32, username: &str, email: &str) -> Result<AuthUser> {
        let user = sqlx::query_as::<_, AuthUser>(
            r#"
            UPDATE users SET username = $1, email = $2
            WHERE id = $3
            RETURNING id, username, email
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn stats(&self, user_id: i32) -> Result<UserStats> {
        let summary = completion_summary(&self.pool, user_id).await?;
        let top_topics = sqlx::query_as::<_, TopicCount>(
            r#"
            SELECT q.topic, COUNT(*) AS count
            FROM quizzes q
            JOIN quiz_results r ON q.id = r.quiz_id
            WHERE q.user_id = $1
            GROUP BY q.topic
            ORDER BY count DESC, q.topic
            LIMIT 3
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(UserStats {
            total_quizzes: summary.total_quizzes,
            completed_quizzes: summary.completed_quizzes,
            average_score: summary.average_score,
            top_topics,
        })
    }
}
