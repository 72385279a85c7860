/// Account manager implementation using runtime queries
use crate::{
    account::{ProfileCounts, SessionClaims, UserProfile, ValidatedSession},
    config::SessionConfig,
    db::{self, models::{User, UserRole}},
    error::{MiraError, MiraResult},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sqlx::SqlitePool;

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
    session: SessionConfig,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool, session: SessionConfig) -> Self {
        Self { db, session }
    }

    /// Create a new user with the default role
    pub async fn create_user(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        image: Option<&str>,
    ) -> MiraResult<User> {
        if let Some(email) = email {
            let taken: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?1")
                .bind(email)
                .fetch_optional(&self.db)
                .await?;
            if taken.is_some() {
                return Err(MiraError::Conflict("Email already registered".to_string()));
            }
        }

        let id = db::new_id();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO users (id, name, email, image, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&id)
        .bind(name)
        .bind(email)
        .bind(image)
        .bind(UserRole::User)
        .bind(db::timestamp(now))
        .execute(&self.db)
        .await?;

        tracing::info!(user_id = %id, "created user");

        self.get_user(&id).await
    }

    /// Get a user by id
    pub async fn get_user(&self, user_id: &str) -> MiraResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, image, role, created_at FROM users WHERE id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| MiraError::NotFound(format!("User not found: {}", user_id)))
    }

    pub async fn find_by_email(&self, email: &str) -> MiraResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, image, role, created_at FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| MiraError::NotFound(format!("No user with email {}", email)))
    }

    /// Make sure an admin account exists for `email`, creating it if needed
    pub async fn ensure_admin(&self, email: &str, name: Option<&str>) -> MiraResult<User> {
        let user = match self.find_by_email(email).await {
            Ok(user) => user,
            Err(MiraError::NotFound(_)) => self.create_user(name, Some(email), None).await?,
            Err(e) => return Err(e),
        };

        if !user.role.is_admin() {
            self.set_role(&user.id, UserRole::Admin).await?;
        }

        self.get_user(&user.id).await
    }

    /// Change a user's role (seed and admin tooling only)
    pub async fn set_role(&self, user_id: &str, role: UserRole) -> MiraResult<()> {
        let result = sqlx::query("UPDATE users SET role = ?1 WHERE id = ?2")
            .bind(role)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MiraError::NotFound(format!("User not found: {}", user_id)));
        }

        tracing::info!(user_id = %user_id, role = role.as_str(), "role changed");
        Ok(())
    }

    /// Sign a session token for a user
    pub fn issue_session(&self, user_id: &str) -> MiraResult<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.session.ttl_hours)).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.session.secret.as_bytes()),
        )
        .map_err(|e| MiraError::Internal(format!("Failed to sign session: {}", e)))
    }

    /// Verify a session token and resolve the caller's current role
    pub async fn validate_session(&self, token: &str) -> MiraResult<ValidatedSession> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Allow some clock skew (5 minutes)
        validation.leeway = 300;

        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.session.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!("session verification failed: {}", e);
            MiraError::Unauthorized(format!("Invalid session: {}", e))
        })?;

        let role: UserRole = sqlx::query_scalar("SELECT role FROM users WHERE id = ?1")
            .bind(&data.claims.sub)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| MiraError::Unauthorized("Session user no longer exists".to_string()))?;

        Ok(ValidatedSession {
            user_id: data.claims.sub,
            role,
        })
    }

    /// Public profile with activity counts
    pub async fn get_profile(&self, user_id: &str) -> MiraResult<UserProfile> {
        let user = self.get_user(user_id).await?;

        let comments = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&self.db);
        let comment_likes =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comment_likes WHERE user_id = ?1")
                .bind(user_id)
                .fetch_one(&self.db);
        let (comments, comment_likes) = futures::try_join!(comments, comment_likes)?;

        Ok(UserProfile {
            id: user.id,
            name: user.name,
            image: user.image,
            role: user.role,
            counts: ProfileCounts {
                comments,
                comment_likes,
            },
        })
    }
}
