use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::users;

/// Current account state consulted on every authenticated request, so a
/// revoked admin flag or a deleted account takes effect before the token expires.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `None` when the account no longer exists
    async fn is_admin(&self, user_id: Uuid) -> Result<Option<bool>, sqlx::Error>;
}

pub struct PgUserDirectory {
    db_pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn is_admin(&self, user_id: Uuid) -> Result<Option<bool>, sqlx::Error> {
        Ok(users::find_user_by_id(&self.db_pool, user_id)
            .await?
            .map(|user| user.is_admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::database_pool;

    #[tokio::test]
    async fn test_role_follows_stored_account() {
        let Some(pool) = database_pool().await else {
            return;
        };
        let suffix = &Uuid::new_v4().simple().to_string()[..12];
        let user = users::create_user(
            &pool,
            &format!("dir{}", suffix),
            &format!("dir{}@example.com", suffix),
            "not-a-real-hash",
            false,
        )
        .await
        .unwrap();

        let directory = PgUserDirectory::new(pool);
        assert_eq!(directory.is_admin(user.id).await.unwrap(), Some(false));
        assert_eq!(directory.is_admin(Uuid::new_v4()).await.unwrap(), None);
    }
}
