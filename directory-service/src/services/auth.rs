use std::sync::Arc;

use crate::{
    dtos::auth::{
        LoginRequest, LoginResponse, ProfileResponse, RefreshRequest, RefreshResponse,
        RegisterRequest, RegisterResponse, UsersResponse,
    },
    models::{NewUser, Role},
    services::{
        metrics::record_auth_event, AccessTokenClaims, CredentialStore, JwtService,
        RefreshTokenRegistry, ServiceError,
    },
    utils::Password,
};

const REGISTERED_MESSAGE: &str = "Registration successful. Please login to continue.";

/// Registration, login, refresh, logout and profile reads.
///
/// Access tokens are stateless. Refresh tokens are usable only while signed,
/// unexpired and present in the registry, so logout is a registry delete.
#[derive(Clone)]
pub struct AuthService {
    credentials: CredentialStore,
    jwt: JwtService,
    registry: Arc<dyn RefreshTokenRegistry>,
}

impl AuthService {
    pub fn new(
        credentials: CredentialStore,
        jwt: JwtService,
        registry: Arc<dyn RefreshTokenRegistry>,
    ) -> Self {
        Self {
            credentials,
            jwt,
            registry,
        }
    }

    /// Creates the account; no tokens are issued until the user logs in.
    pub async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, ServiceError> {
        if self.credentials.find_by_email(&req.email).await?.is_some() {
            record_auth_event("register", "conflict");
            return Err(ServiceError::EmailAlreadyRegistered);
        }

        // The store's unique constraint still catches a concurrent duplicate
        let user = self
            .credentials
            .create(NewUser {
                name: req.name,
                email: req.email,
                password: Password::new(req.password),
                role: Role::User,
            })
            .await
            .inspect_err(|e| {
                if matches!(e, ServiceError::EmailAlreadyRegistered) {
                    record_auth_event("register", "conflict");
                }
            })?;

        tracing::info!(user_id = user.id, "User registered");
        record_auth_event("register", "success");

        Ok(RegisterResponse {
            message: REGISTERED_MESSAGE.to_string(),
            user: user.summary(),
        })
    }

    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ServiceError> {
        let Some(user) = self
            .credentials
            .verify_credentials(&req.email, Password::new(req.password))
            .await?
        else {
            tracing::warn!("Login failed: invalid credentials");
            record_auth_event("login", "failure");
            return Err(ServiceError::InvalidCredentials);
        };

        let token = self.jwt.generate_access_token(user.id, user.role)?;
        let (refresh_token, refresh_claims) = self.jwt.generate_refresh_token(user.id)?;

        self.registry
            .put(&refresh_token, user.id, refresh_claims.expires_at())
            .await?;

        tracing::info!(user_id = user.id, "User logged in");
        record_auth_event("login", "success");

        Ok(LoginResponse {
            token,
            refresh_token,
            user: user.summary(),
        })
    }

    /// Mint a new access token. The refresh token itself is not rotated.
    pub async fn refresh(&self, req: RefreshRequest) -> Result<RefreshResponse, ServiceError> {
        let refresh_token = match req.refresh_token {
            Some(token) if !token.is_empty() => token,
            _ => return Err(ServiceError::MissingRefreshToken),
        };

        let result = self.refresh_access_token(&refresh_token).await;
        match &result {
            Ok(_) => record_auth_event("refresh", "success"),
            Err(ServiceError::InvalidRefreshToken) => {
                record_auth_event("refresh", "failure");
            }
            Err(_) => record_auth_event("refresh", "error"),
        }
        result
    }

    async fn refresh_access_token(&self, token: &str) -> Result<RefreshResponse, ServiceError> {
        let claims = self.jwt.validate_refresh_token(token).map_err(|e| {
            tracing::warn!(error = %e, "Refresh rejected: token did not verify");
            ServiceError::InvalidRefreshToken
        })?;

        match self.registry.get(token).await? {
            Some(owner) if owner == claims.sub => {}
            Some(owner) => {
                tracing::warn!(
                    user_id = claims.sub,
                    registered_to = owner,
                    "Refresh rejected: owner mismatch"
                );
                return Err(ServiceError::InvalidRefreshToken);
            }
            None => {
                tracing::warn!(user_id = claims.sub, "Refresh rejected: token not registered");
                return Err(ServiceError::InvalidRefreshToken);
            }
        }

        // Role comes from the current record, not from the login that issued the refresh token
        let user = self
            .credentials
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = claims.sub, "Refresh rejected: user no longer exists");
                ServiceError::InvalidRefreshToken
            })?;

        let token = self.jwt.generate_access_token(user.id, user.role)?;

        tracing::info!(user_id = user.id, "Access token refreshed");

        Ok(RefreshResponse { token })
    }

    /// Idempotent: unknown, expired or absent tokens still succeed.
    pub async fn logout(&self, refresh_token: Option<String>) {
        if let Some(token) = refresh_token.filter(|t| !t.is_empty()) {
            if let Err(e) = self.registry.delete(&token).await {
                tracing::error!(error = %e, "Failed to revoke refresh token on logout");
            }
        }

        tracing::info!("User logged out");
        record_auth_event("logout", "success");
    }

    /// Claims are trusted as issued, so a deleted user yields `user: null`.
    pub async fn profile(&self, claims: &AccessTokenClaims) -> Result<ProfileResponse, ServiceError> {
        let user = self.credentials.find_by_id(claims.sub).await?;

        Ok(ProfileResponse {
            user: user.map(|u| u.profile()),
        })
    }

    pub async fn list_users(&self) -> Result<UsersResponse, ServiceError> {
        let users = self.credentials.list().await?;

        Ok(UsersResponse {
            users: users.iter().map(|u| u.profile()).collect(),
        })
    }

    pub async fn health_check(&self) -> Result<(), ServiceError> {
        self.registry.health_check().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{InMemoryRegistry, MemoryDatabase};
    use chrono::Duration;

    struct Fixture {
        auth: AuthService,
        registry: Arc<InMemoryRegistry>,
        jwt: JwtService,
        credentials: CredentialStore,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(InMemoryRegistry::new());
        let jwt = JwtService::with_ttls(
            b"auth-service-test-secret-0123456789",
            Duration::minutes(15),
            Duration::days(7),
        );
        let credentials = CredentialStore::new(Arc::new(MemoryDatabase::new()));
        Fixture {
            auth: AuthService::new(credentials.clone(), jwt.clone(), registry.clone()),
            registry,
            jwt,
            credentials,
        }
    }

    fn register_req(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Jo".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
        }
    }

    fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn refresh_req(token: &str) -> RefreshRequest {
        RefreshRequest {
            refresh_token: Some(token.to_string()),
        }
    }

    #[tokio::test]
    async fn register_once_per_email() {
        let f = fixture();

        let res = f.auth.register(register_req("jo@x.com")).await.unwrap();
        assert_eq!(res.user.email, "jo@x.com");
        assert_eq!(res.message, REGISTERED_MESSAGE);

        let err = f.auth.register(register_req("jo@x.com")).await.unwrap_err();
        assert!(matches!(err, ServiceError::EmailAlreadyRegistered));
    }

    #[tokio::test]
    async fn register_issues_no_tokens() {
        let f = fixture();
        f.auth.register(register_req("jo@x.com")).await.unwrap();
        assert!(f.registry.is_empty());
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let f = fixture();
        f.auth.register(register_req("jo@x.com")).await.unwrap();

        let wrong_password = f
            .auth
            .login(login_req("jo@x.com", "wrong-pass"))
            .await
            .unwrap_err();
        let unknown_user = f
            .auth
            .login(login_req("ghost@x.com", "secret1"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, ServiceError::InvalidCredentials));
        assert!(matches!(unknown_user, ServiceError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn login_registers_refresh_token() {
        let f = fixture();
        let registered = f.auth.register(register_req("jo@x.com")).await.unwrap();

        let res = f.auth.login(login_req("jo@x.com", "secret1")).await.unwrap();

        let claims = f.jwt.validate_access_token(&res.token).unwrap();
        assert_eq!(claims.sub, registered.user.id);
        assert_eq!(claims.role, Role::User);
        assert_eq!(
            f.registry.get(&res.refresh_token).await.unwrap(),
            Some(registered.user.id)
        );
    }

    #[tokio::test]
    async fn refresh_then_logout_then_refresh_fails() {
        let f = fixture();
        f.auth.register(register_req("jo@x.com")).await.unwrap();
        let login = f.auth.login(login_req("jo@x.com", "secret1")).await.unwrap();

        let refreshed = f.auth.refresh(refresh_req(&login.refresh_token)).await.unwrap();
        assert!(f.jwt.validate_access_token(&refreshed.token).is_ok());

        f.auth.logout(Some(login.refresh_token.clone())).await;
        let err = f
            .auth
            .refresh(refresh_req(&login.refresh_token))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn refresh_rejects_missing_and_unissued_tokens() {
        let f = fixture();

        let missing = f.auth.refresh(RefreshRequest::default()).await.unwrap_err();
        assert!(matches!(missing, ServiceError::MissingRefreshToken));

        let empty = f.auth.refresh(refresh_req("")).await.unwrap_err();
        assert!(matches!(empty, ServiceError::MissingRefreshToken));

        // Correctly signed but never registered
        let (unissued, _) = f.jwt.generate_refresh_token(1).unwrap();
        let err = f.auth.refresh(refresh_req(&unissued)).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRefreshToken));

        let err = f.auth.refresh(refresh_req("garbage")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn refresh_rejects_owner_mismatch() {
        let f = fixture();
        let (token, claims) = f.jwt.generate_refresh_token(1).unwrap();
        f.registry.put(&token, 2, claims.expires_at()).await.unwrap();

        let err = f.auth.refresh(refresh_req(&token)).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn refreshed_token_carries_current_role() {
        let f = fixture();
        let registered = f.auth.register(register_req("jo@x.com")).await.unwrap();
        let login = f.auth.login(login_req("jo@x.com", "secret1")).await.unwrap();

        f.credentials
            .update(
                registered.user.id,
                crate::models::UserChanges {
                    role: Some(Role::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let refreshed = f.auth.refresh(refresh_req(&login.refresh_token)).await.unwrap();
        let claims = f.jwt.validate_access_token(&refreshed.token).unwrap();
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let f = fixture();
        f.auth.register(register_req("jo@x.com")).await.unwrap();
        let login = f.auth.login(login_req("jo@x.com", "secret1")).await.unwrap();

        f.auth.logout(Some(login.refresh_token.clone())).await;
        f.auth.logout(Some(login.refresh_token)).await;
        f.auth.logout(Some("never-issued".to_string())).await;
        f.auth.logout(None).await;

        assert!(f.registry.is_empty());
    }

    #[tokio::test]
    async fn profile_of_vanished_user_is_null() {
        let f = fixture();
        let token = f.jwt.generate_access_token(999, Role::User).unwrap();
        let claims = f.jwt.validate_access_token(&token).unwrap();

        let profile = f.auth.profile(&claims).await.unwrap();
        assert!(profile.user.is_none());
    }

    #[tokio::test]
    async fn profile_and_listing_omit_hashes() {
        let f = fixture();
        f.auth.register(register_req("jo@x.com")).await.unwrap();
        f.auth.register(register_req("al@x.com")).await.unwrap();
        let login = f.auth.login(login_req("jo@x.com", "secret1")).await.unwrap();
        let claims = f.jwt.validate_access_token(&login.token).unwrap();

        let profile = f.auth.profile(&claims).await.unwrap().user.unwrap();
        assert_eq!(profile.name, "Jo");
        assert_eq!(profile.role, Role::User);

        let users = f.auth.list_users().await.unwrap();
        assert_eq!(users.users.len(), 2);
        let json = serde_json::to_string(&users).unwrap();
        assert!(!json.contains("argon2"));
    }
}
