/// Signup service - validates, hashes and persists new users
use actix_web::web;
use std::sync::Arc;

use crate::db::UserRepository;
use crate::error::{AppError, Result, EMAIL_TAKEN_MESSAGE};
use crate::models::{NewUser, SignupRequest, User};
use crate::security::password;
use crate::validation::{self, FieldViolation};

pub struct AuthService {
    users: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Register a user. All rule violations, including an already registered
    /// email, are reported together as one 422.
    pub async fn signup(&self, request: SignupRequest) -> Result<User> {
        let request = request.normalized();

        let mut violations = validation::collect(&request);
        let email_well_formed = !violations.iter().any(|v| v.field == "email");
        if email_well_formed
            && self
                .users
                .find_user_by_email(&request.email)
                .await?
                .is_some()
        {
            violations.push(FieldViolation::new("email", EMAIL_TAKEN_MESSAGE));
            violations.sort_by(|a, b| a.field.cmp(&b.field));
        }
        if !violations.is_empty() {
            return Err(AppError::invalid_input(violations));
        }

        let SignupRequest {
            email,
            name,
            password: plain_password,
        } = request;

        // Argon2 is CPU bound; keep it off the async workers
        let password_hash = web::block(move || password::hash_password(&plain_password)).await??;

        let user = self
            .users
            .create_user(NewUser {
                email,
                name,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, "user signed up");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::security::verify_password;

    fn request(email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            name: "Ada".to_string(),
            password: password.to_string(),
        }
    }

    #[actix_web::test]
    async fn stores_hashed_password() {
        let store = MemoryStore::new();
        let service = AuthService::new(Arc::new(store.clone()));

        let user = service
            .signup(request(" Ada@Example.com", "secret1"))
            .await
            .expect("signup");
        assert_eq!(user.email, "ada@example.com");
        assert_ne!(user.password_hash, "secret1");
        assert!(verify_password("secret1", &user.password_hash).unwrap());
    }

    #[actix_web::test]
    async fn duplicate_email_is_a_violation() {
        let store = MemoryStore::new();
        let service = AuthService::new(Arc::new(store.clone()));
        service
            .signup(request("ada@example.com", "secret1"))
            .await
            .expect("first signup");

        match service.signup(request("ADA@example.com", "secret2")).await {
            Err(AppError::Validation { violations, .. }) => {
                assert_eq!(
                    violations,
                    vec![FieldViolation::new("email", EMAIL_TAKEN_MESSAGE)]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[actix_web::test]
    async fn reports_every_violation() {
        let service = AuthService::new(Arc::new(MemoryStore::new()));
        match service
            .signup(SignupRequest {
                email: "not-an-email".into(),
                name: "   ".into(),
                password: "abc".into(),
            })
            .await
        {
            Err(AppError::Validation { violations, .. }) => {
                let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "name", "password"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
