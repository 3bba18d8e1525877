use super::Database;
use anyhow::{Context, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rusqlite::{params, OptionalExtension};
use std::sync::Arc;

pub const DEMO_USER_ID: &str = "demo_user";
pub const DEMO_USER_EMAIL: &str = "demo@example.com";
pub const DEMO_USER_PASSWORD: &str = "demo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
}

pub struct UserStore {
    db: Arc<Database>,
}

impl UserStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.db.lock()?;
        let user = conn
            .query_row(
                "SELECT id, email, password_hash FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        password_hash: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    pub fn create(&self, id: &str, email: &str, password: &str) -> Result<User> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?
            .to_string();

        let conn = self.db.lock()?;
        conn.execute(
            "INSERT INTO users (id, email, password_hash) VALUES (?1, ?2, ?3)",
            params![id, email, password_hash],
        )
        .with_context(|| format!("Failed to create user {email}"))?;

        Ok(User {
            id: id.to_string(),
            email: email.to_string(),
            password_hash,
        })
    }

    /// `Ok(None)` for an unknown email or a wrong password.
    pub fn verify(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.find_by_email(email)? else {
            return Ok(None);
        };

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| anyhow::anyhow!("Stored password hash for {email} is invalid: {e}"))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(Some(user)),
            Err(_) => Ok(None),
        }
    }

    pub fn ensure_demo_user(&self) -> Result<()> {
        if self.find_by_email(DEMO_USER_EMAIL)?.is_none() {
            self.create(DEMO_USER_ID, DEMO_USER_EMAIL, DEMO_USER_PASSWORD)?;
            log::info!("Seeded demo user {}", DEMO_USER_EMAIL);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> UserStore {
        UserStore::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    #[test]
    fn test_verify_password() {
        let users = store();
        users.create("u1", "a@example.com", "hunter2").unwrap();

        assert_eq!(
            users.verify("a@example.com", "hunter2").unwrap().map(|u| u.id),
            Some("u1".to_string())
        );
        assert!(users.verify("a@example.com", "wrong").unwrap().is_none());
        assert!(users.verify("nobody@example.com", "hunter2").unwrap().is_none());
    }

    #[test]
    fn test_passwords_are_not_stored_in_clear() {
        let users = store();
        let user = users.create("u1", "a@example.com", "hunter2").unwrap();
        assert!(!user.password_hash.contains("hunter2"));
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let users = store();
        users.create("u1", "a@example.com", "x").unwrap();
        assert!(users.create("u2", "a@example.com", "y").is_err());
    }

    #[test]
    fn test_demo_user_seeding_is_idempotent() {
        let users = store();
        users.ensure_demo_user().unwrap();
        users.ensure_demo_user().unwrap();

        let demo = users.verify(DEMO_USER_EMAIL, DEMO_USER_PASSWORD).unwrap().unwrap();
        assert_eq!(demo.id, DEMO_USER_ID);
    }
}
