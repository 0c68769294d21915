//! User Service Module
//!
//! The `UserService` trait is the seam between the HTTP layer and user business
//! logic. `InMemoryUserService` is a process-local implementation used by the
//! binary and the integration tests.

use crate::auth::jwt::{Token, TokenProvider};
use crate::user::{
    error::UserError,
    models::{User, UserCreate, UserLogin, UserRole, UserStatus, UserUpdate},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// User business operations consumed by the HTTP endpoints
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a user and return its generated identifier
    async fn register(&self, data: UserCreate) -> Result<Uuid, UserError>;

    async fn login(&self, data: UserLogin) -> Result<Token, UserError>;

    async fn get_all_users(&self) -> Result<Vec<User>, UserError>;

    async fn update_user(&self, id: Uuid, data: UserUpdate) -> Result<(), UserError>;

    async fn delete_user(&self, id: Uuid) -> Result<(), UserError>;

    async fn get_user_by_id(&self, id: Uuid) -> Result<User, UserError>;
}

/// Number of iterations for Argon2id
const ARGON2_TIME_COST: u32 = 2;
/// Memory cost parameter (in KB)
const ARGON2_MEMORY_COST: u32 = 19456;
/// Parallelism parameter
const ARGON2_PARALLELISM: u32 = 1;

fn argon2() -> Result<Argon2<'static>, UserError> {
    let params =
        argon2::Params::new(ARGON2_MEMORY_COST, ARGON2_TIME_COST, ARGON2_PARALLELISM, None)
            .map_err(|e| UserError::Internal(format!("Invalid Argon2 parameters: {}", e)))?;
    Ok(Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params))
}

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> Result<String, UserError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a previously generated hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, UserError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| UserError::Internal(format!("Invalid password hash: {}", e)))?;
    Ok(argon2()?.verify_password(password.as_bytes(), &parsed).is_ok())
}

/// `UserService` backed by a map held in memory
pub struct InMemoryUserService {
    users: RwLock<HashMap<Uuid, User>>,
    tokens: Arc<dyn TokenProvider>,
}

impl InMemoryUserService {
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            tokens,
        }
    }
}

#[async_trait]
impl UserService for InMemoryUserService {
    async fn register(&self, data: UserCreate) -> Result<Uuid, UserError> {
        let email = data.email.trim().to_lowercase();

        // Hashed before the write lock is taken
        let password_hash = hash_password(&data.password)?;

        let mut users = self.users.write().await;
        if users.values().any(|user| user.email == email) {
            return Err(UserError::EmailTaken);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            first_name: data.first_name,
            last_name: data.last_name,
            phone: None,
            role: UserRole::User,
            status: UserStatus::Active,
            password_hash,
            created_at: now,
            updated_at: now,
        };
        let id = user.id;
        users.insert(id, user);

        log::info!("Registered user {}", id);
        Ok(id)
    }

    async fn login(&self, data: UserLogin) -> Result<Token, UserError> {
        let email = data.email.trim().to_lowercase();
        let user = {
            let users = self.users.read().await;
            users.values().find(|user| user.email == email).cloned()
        };

        let user = user.ok_or(UserError::InvalidCredentials)?;
        if !verify_password(&data.password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        self.tokens.issue(user.id)
    }

    async fn get_all_users(&self) -> Result<Vec<User>, UserError> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by_key(|user| user.created_at);
        Ok(all)
    }

    async fn update_user(&self, id: Uuid, data: UserUpdate) -> Result<(), UserError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(UserError::NotFound)?;
        user.apply(data);
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), UserError> {
        let mut users = self.users.write().await;
        users.remove(&id).map(|_| ()).ok_or(UserError::NotFound)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<User, UserError> {
        let users = self.users.read().await;
        users.get(&id).cloned().ok_or(UserError::NotFound)
    }
}
