use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthService;
use crate::config::AdminSeedConfig;
use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::models::{LoginRequest, RegisterRequest, UpdateProfileRequest, User, UserPublic};

const USER_EXISTS: &str = "User already exists";

/// A user together with a freshly issued session token
pub struct Session {
    pub user: UserPublic,
    pub token: String,
}

pub struct UserService {
    db_pool: PgPool,
    auth: Arc<AuthService>,
}

impl UserService {
    pub fn new(db_pool: PgPool, auth: Arc<AuthService>) -> Self {
        Self { db_pool, auth }
    }

    pub async fn register(&self, req: RegisterRequest) -> ApiResult<Session> {
        req.validate()?;
        let username = req.username.trim();
        let email = req.email.trim().to_lowercase();

        if users::find_conflicting_user(&self.db_pool, username, &email)
            .await?
            .is_some()
        {
            return Err(ApiError::AlreadyExists(USER_EXISTS.to_string()));
        }

        let password_hash = self.auth.hash_password(&req.password)?;
        let user = users::create_user(&self.db_pool, username, &email, &password_hash, false)
            .await
            .map_err(unique_as_conflict)?;

        tracing::info!("Registered user {}", user.id);
        self.session_for(user)
    }

    pub async fn login(&self, req: LoginRequest) -> ApiResult<Session> {
        req.validate()?;

        let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());
        let user = users::find_user_by_email(&self.db_pool, req.email.trim())
            .await?
            .ok_or_else(invalid)?;

        if !self.auth.verify_password(&req.password, &user.password_hash)? {
            tracing::warn!("Failed login for user {}", user.id);
            return Err(invalid());
        }

        self.session_for(user)
    }

    pub async fn list_users(&self) -> ApiResult<Vec<UserPublic>> {
        let users = users::list_users(&self.db_pool).await?;
        Ok(users.into_iter().map(UserPublic::from).collect())
    }

    pub async fn get_profile(&self, user_id: Uuid) -> ApiResult<UserPublic> {
        users::find_user_by_id(&self.db_pool, user_id)
            .await?
            .map(UserPublic::from)
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> ApiResult<UserPublic> {
        req.validate()?;

        let password_hash = match req.password.as_deref() {
            Some(password) => Some(self.auth.hash_password(password)?),
            None => None,
        };
        let email = req.email.as_deref().map(|e| e.trim().to_lowercase());

        users::update_user(
            &self.db_pool,
            user_id,
            req.username.as_deref().map(str::trim),
            email.as_deref(),
            password_hash.as_deref(),
        )
        .await
        .map_err(unique_as_conflict)?
        .map(UserPublic::from)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Create the configured admin account unless its email is already registered
    pub async fn seed_admin(&self, admin: &AdminSeedConfig) -> ApiResult<()> {
        let email = admin.email.trim().to_lowercase();
        if users::find_user_by_email(&self.db_pool, &email).await?.is_some() {
            tracing::debug!("Admin account {} already present", email);
            return Ok(());
        }

        let password_hash = self.auth.hash_password(&admin.password)?;
        let user = users::create_user(&self.db_pool, admin.username.trim(), &email, &password_hash, true)
            .await
            .map_err(unique_as_conflict)?;

        tracing::info!("Seeded admin account {}", user.id);
        Ok(())
    }

    fn session_for(&self, user: User) -> ApiResult<Session> {
        let token = self.auth.generate_token(user.id, &user.username, user.is_admin)?;
        Ok(Session {
            user: user.into(),
            token,
        })
    }
}

fn unique_as_conflict(err: sqlx::Error) -> ApiError {
    if shared::database::is_unique_violation(&err) {
        tracing::debug!(
            "User write hit unique constraint {:?}",
            shared::database::violated_constraint(&err)
        );
        ApiError::AlreadyExists(USER_EXISTS.to_string())
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::test_support::lazy_pool;

    fn service() -> UserService {
        UserService::new(lazy_pool(), Arc::new(AuthService::new(test_config().jwt)))
    }

    #[tokio::test]
    async fn test_register_validates_before_touching_database() {
        let err = service()
            .register(RegisterRequest {
                username: "ab".to_string(),
                email: "not-an-email".to_string(),
                password: "short".to_string(),
            })
            .await
            .err()
            .unwrap();

        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_login_validates_email() {
        let err = service()
            .login(LoginRequest {
                email: "nobody".to_string(),
                password: "whatever".to_string(),
            })
            .await
            .err()
            .unwrap();

        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_profile_rejects_short_password() {
        let err = service()
            .update_profile(
                Uuid::new_v4(),
                UpdateProfileRequest {
                    password: Some("123".to_string()),
                    ..Default::default()
                },
            )
            .await
            .err()
            .unwrap();

        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_non_unique_errors_pass_through() {
        assert!(matches!(
            unique_as_conflict(sqlx::Error::RowNotFound),
            ApiError::Database(_)
        ));
    }
}
