//! Account registration and login.

use std::sync::Arc;

use serde::Serialize;

use crate::auth::jwt::{issue_token, JwtConfig};
use crate::auth::password::{hash_password, verify_password, MIN_PASSWORD_LENGTH};
use crate::models::{NewUser, PublicUser, User};
use crate::store::{StoreError, UserStore};
use crate::utils::error::{AppError, AppResult};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const USER_EXISTS: &str = "User already exists";

#[derive(Debug, Serialize)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    jwt: Arc<JwtConfig>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, jwt: Arc<JwtConfig>) -> Self {
        Self { users, jwt }
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> AppResult<Session> {
        let name = name.trim();
        let email = normalize_email(email);

        if name.is_empty() {
            return Err(AppError::ValidationError("Name is required".to_string()));
        }
        if !email.contains('@') {
            return Err(AppError::ValidationError(
                "A valid email is required".to_string(),
            ));
        }
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::ValidationError(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
            )));
        }

        let existing = self
            .users
            .find_by_email(&email)
            .await
            .map_err(AppError::storage("Error registering user"))?;
        if existing.is_some() {
            return Err(AppError::Conflict(USER_EXISTS.to_string()));
        }

        let password_hash =
            hash_password(password).map_err(|e| AppError::InternalServerError(e.to_string()))?;

        let user = self
            .users
            .create(NewUser {
                name: name.to_string(),
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration for the same email.
                StoreError::Duplicate(_) => AppError::Conflict(USER_EXISTS.to_string()),
                other => AppError::storage("Error registering user")(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        self.session_for(&user)
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        let email = normalize_email(email);

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(AppError::storage("Error logging in"))?
            .ok_or_else(|| AppError::AuthError(INVALID_CREDENTIALS.to_string()))?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        if !valid {
            return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
        }

        self.session_for(&user)
    }

    /// Profile of the token's subject. A token for a deleted account must
    /// re-authenticate.
    pub async fn profile(&self, user_id: uuid::Uuid) -> AppResult<PublicUser> {
        self.users
            .find(user_id)
            .await
            .map_err(AppError::storage("Error fetching user"))?
            .map(|user| PublicUser::from(&user))
            .ok_or_else(AppError::session_expired)
    }

    fn session_for(&self, user: &User) -> AppResult<Session> {
        let token = issue_token(user.id, &self.jwt)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        Ok(Session {
            token,
            user: PublicUser::from(user),
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
