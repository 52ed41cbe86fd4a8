use std::sync::Arc;

use crate::models::{NewUser, NewUserRecord, User, UserChanges, UserRecordChanges};
use crate::services::{ServiceError, UserRepository};
use crate::utils::{
    hash_password_blocking, verify_password_blocking, Password, PasswordHashString,
    DECOY_PASSWORD_HASH,
};

/// Owner of user records. Plaintext passwords only ever pass through here:
/// `create` always hashes, `update` rehashes only when a new password is
/// given, so an unchanged password is never hashed twice.
#[derive(Clone)]
pub struct CredentialStore {
    repo: Arc<dyn UserRepository>,
}

impl CredentialStore {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, user: NewUser) -> Result<User, ServiceError> {
        let password_hash = hash_password_blocking(user.password).await?;

        self.repo
            .insert(NewUserRecord {
                name: user.name,
                email: user.email,
                password_hash,
                role: user.role,
            })
            .await
    }

    pub async fn update(&self, id: i64, changes: UserChanges) -> Result<User, ServiceError> {
        let password_hash = match changes.password {
            Some(password) => Some(hash_password_blocking(password).await?),
            None => None,
        };

        self.repo
            .update(
                id,
                UserRecordChanges {
                    name: changes.name,
                    email: changes.email,
                    password_hash,
                    role: changes.role,
                },
            )
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        self.repo.find_by_email(email).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, ServiceError> {
        self.repo.find_by_id(id).await
    }

    pub async fn list(&self) -> Result<Vec<User>, ServiceError> {
        self.repo.list().await
    }

    /// The user if `password` matches, `None` for an unknown email or a
    /// wrong password alike. An unknown email is checked against
    /// [`DECOY_PASSWORD_HASH`] so both failures take the same time.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: Password,
    ) -> Result<Option<User>, ServiceError> {
        let user = self.repo.find_by_email(email).await?;
        let password_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => PasswordHashString::new(DECOY_PASSWORD_HASH.to_string()),
        };

        let matches = verify_password_blocking(password, password_hash).await?;
        Ok(user.filter(|_| matches))
    }

    pub async fn health_check(&self) -> Result<(), ServiceError> {
        self.repo.health_check().await
    }
}
