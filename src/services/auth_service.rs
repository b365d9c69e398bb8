use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::auth::{generate_jwt, hash_password, verify_password, AuthError};
use crate::config::AppConfig;
use crate::database::models::{User, UserDetails, UserProfile};
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::UserRole;
use crate::validation::Validator;

use super::conflict_on_unique;

const DUPLICATE_USER: &str = "User already exists with this email or username";
const BAD_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body returned by register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

pub struct AuthService {
    pool: SqlitePool,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.db.clone(),
            config: state.config.clone(),
        }
    }

    /// Create a `user`-role account and sign a token for it
    pub async fn register(&self, input: RegisterRequest) -> Result<AuthResponse, ApiError> {
        let mut v = Validator::new();
        let username = v.min_length("username", input.username.as_deref(), 3);
        let email = v.email("email", input.email.as_deref());
        let password = v.password("password", input.password, 6);

        let (Some(username), Some(email), Some(password)) = (username, email, password) else {
            return Err(v.into_error());
        };

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ? OR username = ?")
            .bind(&email)
            .bind(&username)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(ApiError::conflict(DUPLICATE_USER));
        }

        let cost = self.config.security.bcrypt_cost;
        let hash = blocking(move || hash_password(&password, cost)).await?;

        let id = sqlx::query("INSERT INTO users (username, email, password, role) VALUES (?, ?, ?, ?)")
            .bind(&username)
            .bind(&email)
            .bind(hash)
            .bind(UserRole::User)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_USER))?
            .last_insert_rowid();

        let user = UserProfile {
            id,
            username,
            email,
            role: UserRole::User,
        };
        let token = generate_jwt(&self.config.security, &user)?;
        tracing::info!("Registered user {} ({})", user.username, user.id);

        Ok(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user,
        })
    }

    /// Check credentials and sign a fresh token
    pub async fn login(&self, input: LoginRequest) -> Result<AuthResponse, ApiError> {
        let mut v = Validator::new();
        let email = v.email("email", input.email.as_deref());
        let password = match input.password {
            Some(p) if !p.is_empty() => Some(p),
            _ => {
                v.push("password", "Password is required");
                None
            }
        };

        let (Some(email), Some(password)) = (email, password) else {
            return Err(v.into_error());
        };

        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        let Some(user) = user else {
            return Err(ApiError::unauthorized(BAD_CREDENTIALS));
        };

        let hash = user.password.clone();
        if !blocking(move || verify_password(&password, &hash)).await? {
            tracing::debug!("Password mismatch for user {}", user.id);
            return Err(ApiError::unauthorized(BAD_CREDENTIALS));
        }

        let profile = UserProfile::from(&user);
        let token = generate_jwt(&self.config.security, &profile)?;

        Ok(AuthResponse {
            message: "Login successful".to_string(),
            token,
            user: profile,
        })
    }

    pub async fn current_user(&self, id: i64) -> Result<UserDetails, ApiError> {
        sqlx::query_as("SELECT id, username, email, role, created_at FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }
}

/// bcrypt is CPU-bound; keep it off the async workers
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!("Credential task failed: {}", e);
        ApiError::internal_server_error("Failed to process credentials")
    })?;
    Ok(result?)
}
