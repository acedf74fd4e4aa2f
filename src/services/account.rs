// Account registration, login and profile lookup

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::{LoginRequest, LoginResponse, RegisterRequest, Role, User},
    repositories::{RepositoryError, UserRepository},
    services::jwt::JwtService,
    utils::{hash_password_with_config, verify_password, ApiError, PasswordConfig},
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    jwt_service: Arc<JwtService>,
    password_config: PasswordConfig,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        jwt_service: Arc<JwtService>,
        password_config: PasswordConfig,
    ) -> Self {
        Self {
            users,
            jwt_service,
            password_config,
        }
    }

    async fn hash(&self, password: String) -> Result<String, ApiError> {
        let config = self.password_config;
        // Argon2 is CPU bound; keep it off the async workers
        tokio::task::spawn_blocking(move || hash_password_with_config(&password, &config))
            .await
            .map_err(|e| ApiError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| ApiError::Internal(e.to_string()))
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, mut request: RegisterRequest) -> Result<User, ApiError> {
        request.sanitize();
        request.validate()?;

        self.create_user(request.name, request.email, request.password, Role::User)
            .await
    }

    /// Used by registration and by seeding in tests
    pub async fn create_user(
        &self,
        name: String,
        email: String,
        password: String,
        role: Role,
    ) -> Result<User, ApiError> {
        let password_hash = self.hash(password).await?;
        let user = User::new(name, email, password_hash, role);

        match self.users.insert(user).await {
            Ok(user) => {
                info!("Registered user {} with role {}", user.id, user.role);
                Ok(user)
            },
            Err(RepositoryError::Conflict(_)) => Err(ApiError::Conflict(
                "An account with this email already exists".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ApiError> {
        request.validate()?;
        let email = request.email.trim().to_lowercase();

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("Login attempt for unknown email");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let hash = user.password_hash.clone();
        let password = request.password;
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| ApiError::Internal(format!("Verification task failed: {}", e)))?
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        if !verified {
            warn!("Login attempt with wrong password for user {}", user.id);
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self
            .jwt_service
            .generate_access_token(&user)
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        info!("User {} logged in", user.id);
        Ok(LoginResponse {
            user,
            token,
            expires_in: self.jwt_service.access_token_expiry(),
        })
    }

    #[instrument(skip(self))]
    pub async fn me(&self, user_id: Uuid) -> Result<User, ApiError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfig;
    use crate::repositories::memory::InMemoryRepository;

    fn service() -> AccountService {
        let config = AppConfig::for_test();
        AccountService::new(
            Arc::new(InMemoryRepository::<User>::new()),
            Arc::new(JwtService::new(&config.jwt)),
            PasswordConfig::light(),
        )
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Grace Hopper".to_string(),
            email: email.to_string(),
            password: "correct-horse-battery".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = service();
        let user = service
            .register(register_request(" Grace@Example.com "))
            .await
            .unwrap();
        assert_eq!(user.email, "grace@example.com");
        assert_eq!(user.role, Role::User);

        let response = service
            .login(LoginRequest {
                email: "GRACE@example.com".to_string(),
                password: "correct-horse-battery".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.user.id, user.id);
        assert_eq!(response.expires_in, 3600);
        assert!(!response.token.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let service = service();
        service.register(register_request("dup@example.com")).await.unwrap();
        let err = service
            .register(register_request("DUP@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let service = service();
        service.register(register_request("ada@example.com")).await.unwrap();

        let err = service
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), INVALID_CREDENTIALS);

        let unknown = service
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "whatever".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(unknown.to_string(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_short_password_fails_validation() {
        let service = service();
        let mut request = register_request("short@example.com");
        request.password = "short".to_string();
        assert!(matches!(
            service.register(request).await,
            Err(ApiError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_me_for_missing_user() {
        assert!(matches!(
            service().me(Uuid::new_v4()).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
