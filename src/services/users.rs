//! User accounts: registration, credential checks, profile updates.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde_json::{json, Value};

use super::error::ServiceError;
use crate::db::{CreateUnique, Database};
use crate::types::{Document, Filter};

pub struct UserService {
  db: Arc<Database>,
}

impl UserService {
  pub fn new(db: Arc<Database>) -> Self {
    Self { db }
  }

  /// Register a new account. Emails are unique; passwords are stored as
  /// argon2 hashes only.
  pub async fn register(
    &self,
    name: &str,
    email: &str,
    password: &str,
  ) -> Result<Document, ServiceError> {
    if email.is_empty() || password.is_empty() {
      return Err(ServiceError::Validation(
        "please provide an email and password".into(),
      ));
    }

    let fields = json!({
      "name": name,
      "email": email,
      "password": hash_password(password)?,
      "role": "user",
      "notification_preferences": {
        "deadline_alerts": true,
        "interview_reminders": true,
      },
    });

    let uniqueness = Filter::new().eq("email", email);
    match self.db.users.create_unique(&uniqueness, fields).await? {
      CreateUnique::Created(user) => Ok(user),
      CreateUnique::Exists(_) => Err(ServiceError::UserExists),
    }
  }

  /// Check credentials and return the account. A missing user and a wrong
  /// password are indistinguishable to the caller.
  pub async fn login(&self, email: &str, password: &str) -> Result<Document, ServiceError> {
    if email.is_empty() || password.is_empty() {
      return Err(ServiceError::Validation(
        "please provide an email and password".into(),
      ));
    }

    let user = self
      .db
      .users
      .find_one(&Filter::new().eq("email", email))
      .await
      .ok_or(ServiceError::InvalidCredentials)?;

    let stored = user
      .get_str("password")
      .ok_or(ServiceError::InvalidCredentials)?;
    if !verify_password(password, stored) {
      return Err(ServiceError::InvalidCredentials);
    }
    Ok(user)
  }

  pub async fn get(&self, id: &str) -> Result<Document, ServiceError> {
    self
      .db
      .users
      .find_by_id(id)
      .await
      .ok_or(ServiceError::NotFound("user"))
  }

  /// Patch profile fields; a changed password is re-hashed before it is
  /// stored.
  pub async fn update(&self, id: &str, mut patch: Value) -> Result<Document, ServiceError> {
    if let Value::Object(fields) = &mut patch {
      if let Some(Value::String(plain)) = fields.get("password").cloned() {
        fields.insert("password".into(), Value::String(hash_password(&plain)?));
      }
    }
    self
      .db
      .users
      .update_by_id(id, patch)
      .await?
      .ok_or(ServiceError::NotFound("user"))
  }
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|err| ServiceError::PasswordHash(err.to_string()))
}

fn verify_password(password: &str, stored: &str) -> bool {
  match PasswordHash::new(stored) {
    Ok(parsed) => Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok(),
    Err(_) => false,
  }
}
