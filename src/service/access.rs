use crate::config::SecurityConfig;
use crate::db::UserRepository;
use crate::error::ChurchError;
use crate::types::{Operation, Role, User};
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, Version};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// An authenticated caller, as resolved from the user table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub username: String,
    pub role: Role,
    pub home_cell_group: Option<String>,
}

impl Principal {
    pub fn require(&self, op: Operation) -> Result<(), ChurchError> {
        authorize(self.role, op).inspect_err(|_| {
            debug!(username = %self.username, role = %self.role, ?op, "operation denied");
        })
    }

    /// The home cell group this principal is confined to, if any. Admins are never confined.
    pub fn scoped_group(&self) -> Option<&str> {
        match self.role {
            Role::Admin => None,
            _ => self.home_cell_group.as_deref(),
        }
    }

    pub fn ensure_in_scope(&self, home_cell_group: &str) -> Result<(), ChurchError> {
        match self.scoped_group() {
            Some(own) if own != home_cell_group => Err(ChurchError::Unauthorized),
            _ => Ok(()),
        }
    }
}

impl From<&User> for Principal {
    fn from(u: &User) -> Self {
        Self {
            username: u.username.clone(),
            role: u.role,
            home_cell_group: u.home_cell_group.clone(),
        }
    }
}

/// Static role → operation check.
pub fn authorize(role: Role, op: Operation) -> Result<(), ChurchError> {
    if role.permits(op) {
        Ok(())
    } else {
        Err(ChurchError::Unauthorized)
    }
}

/// Validates credentials against a [`UserRepository`] and hashes new passwords.
#[derive(Clone)]
pub struct AccessGate {
    users: Arc<dyn UserRepository>,
    hasher: Argon2<'static>,
    min_password_len: usize,
}

impl AccessGate {
    pub fn new(users: Arc<dyn UserRepository>, cfg: &SecurityConfig) -> Result<Self, ChurchError> {
        let params = Params::new(cfg.argon2_memory_kib, cfg.argon2_iterations, 1, None)
            .map_err(|e| ChurchError::PasswordHash(format!("invalid argon2 params: {e}")))?;
        Ok(Self {
            users,
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            min_password_len: cfg.min_password_len,
        })
    }

    pub fn users(&self) -> &Arc<dyn UserRepository> {
        &self.users
    }

    /// Check a username/password pair. Unknown users and wrong passwords
    /// both yield `AuthenticationFailed`.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Principal, ChurchError> {
        let Some(user) = self.users.find_user(username.trim()).await? else {
            debug!(username, "login for unknown user");
            return Err(ChurchError::AuthenticationFailed);
        };

        if let Err(e) = PasswordHash::new(&user.password_hash) {
            warn!(username = %user.username, error = %e, "stored password hash is unreadable");
            return Err(ChurchError::AuthenticationFailed);
        }

        // argon2 must not run on the async workers
        let hasher = self.hasher.clone();
        let stored = user.password_hash.clone();
        let candidate = password.to_owned();
        let verified = tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&stored)?;
            hasher.verify_password(candidate.as_bytes(), &parsed)
        })
        .await?;

        match verified {
            Ok(()) => Ok(Principal::from(&user)),
            Err(password_hash::Error::Password) => {
                debug!(username = %user.username, "login with wrong password");
                Err(ChurchError::AuthenticationFailed)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Re-read an existing session's user so role changes take effect immediately.
    pub async fn resolve(&self, username: &str) -> Result<Principal, ChurchError> {
        self.users
            .find_user(username)
            .await?
            .map(|u| Principal::from(&u))
            .ok_or(ChurchError::AuthenticationFailed)
    }

    pub async fn hash_password(&self, password: &str) -> Result<String, ChurchError> {
        if password.chars().count() < self.min_password_len {
            return Err(ChurchError::invalid(format!(
                "password must be at least {} characters",
                self.min_password_len
            )));
        }
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        let hashed = tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            hasher
                .hash_password(password.as_bytes(), &salt)
                .map(|h| h.to_string())
        })
        .await??;
        Ok(hashed)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory stand-in for the user table.
    #[derive(Default)]
    pub(crate) struct MemoryUsers {
        rows: Mutex<HashMap<String, User>>,
    }

    #[async_trait]
    impl UserRepository for MemoryUsers {
        async fn find_user(&self, username: &str) -> Result<Option<User>, ChurchError> {
            Ok(self.rows.lock().unwrap().get(username).cloned())
        }

        async fn insert_user(&self, user: &User) -> Result<(), ChurchError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.contains_key(&user.username) {
                return Err(ChurchError::UserExists(user.username.clone()));
            }
            rows.insert(user.username.clone(), user.clone());
            Ok(())
        }

        async fn update_user(&self, user: &User) -> Result<(), ChurchError> {
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&user.username) {
                Some(slot) => {
                    *slot = user.clone();
                    Ok(())
                }
                None => Err(ChurchError::UserNotFound(user.username.clone())),
            }
        }

        async fn list_users(&self) -> Result<Vec<User>, ChurchError> {
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }

        async fn count_users(&self) -> Result<u64, ChurchError> {
            Ok(self.rows.lock().unwrap().len() as u64)
        }
    }

    pub(crate) fn fast_security() -> SecurityConfig {
        SecurityConfig {
            min_password_len: 6,
            argon2_memory_kib: 256,
            argon2_iterations: 1,
        }
    }

    async fn gate_with(accounts: &[(&str, &str, Role)]) -> AccessGate {
        let gate = AccessGate::new(Arc::new(MemoryUsers::default()), &fast_security()).unwrap();
        for (name, pw, role) in accounts {
            let user = User {
                username: name.to_string(),
                password_hash: gate.hash_password(pw).await.unwrap(),
                role: *role,
                home_cell_group: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            gate.users().insert_user(&user).await.unwrap();
        }
        gate
    }

    #[tokio::test]
    async fn authenticate_returns_the_stored_role() {
        let gate = gate_with(&[
            ("admin", "admin123", Role::Admin),
            ("accountant", "account123", Role::Accountant),
        ])
        .await;

        let admin = gate.authenticate("admin", "admin123").await.unwrap();
        assert_eq!(admin.role, Role::Admin);
        let acct = gate.authenticate("accountant", "account123").await.unwrap();
        assert_eq!(acct.role, Role::Accountant);
    }

    #[tokio::test]
    async fn mismatches_fail_authentication() {
        let gate = gate_with(&[("admin", "admin123", Role::Admin)]).await;
        for (user, pw) in [("admin", "wrong"), ("admin", ""), ("nobody", "admin123")] {
            let err = gate.authenticate(user, pw).await.unwrap_err();
            assert!(matches!(err, ChurchError::AuthenticationFailed), "{user}/{pw}");
        }
    }

    #[tokio::test]
    async fn password_change_invalidates_old_password() {
        let gate = gate_with(&[("admin", "admin123", Role::Admin)]).await;
        let mut user = gate.users().find_user("admin").await.unwrap().unwrap();
        user.password_hash = gate.hash_password("n3w-secret").await.unwrap();
        gate.users().update_user(&user).await.unwrap();

        assert!(matches!(
            gate.authenticate("admin", "admin123").await,
            Err(ChurchError::AuthenticationFailed)
        ));
        assert_eq!(
            gate.authenticate("admin", "n3w-secret").await.unwrap().role,
            Role::Admin
        );
    }

    #[tokio::test]
    async fn resolve_fails_for_missing_user() {
        let gate = gate_with(&[]).await;
        assert!(matches!(
            gate.resolve("ghost").await,
            Err(ChurchError::AuthenticationFailed)
        ));
    }

    #[tokio::test]
    async fn short_passwords_are_rejected() {
        let gate = AccessGate::new(Arc::new(MemoryUsers::default()), &fast_security()).unwrap();
        assert!(matches!(
            gate.hash_password("abc").await,
            Err(ChurchError::InvalidInput(_))
        ));
    }

    #[test]
    fn authorize_follows_the_permission_table() {
        assert!(matches!(
            authorize(Role::Accountant, Operation::ManageUsers),
            Err(ChurchError::Unauthorized)
        ));
        assert!(authorize(Role::Admin, Operation::ManageUsers).is_ok());
    }

    #[test]
    fn scoping_confines_non_admins_to_their_group() {
        let leader = Principal {
            username: "leader".into(),
            role: Role::Member,
            home_cell_group: Some("Bethel".into()),
        };
        assert!(leader.ensure_in_scope("Bethel").is_ok());
        assert!(matches!(
            leader.ensure_in_scope("Zion"),
            Err(ChurchError::Unauthorized)
        ));

        let admin = Principal {
            role: Role::Admin,
            ..leader.clone()
        };
        assert!(admin.ensure_in_scope("Zion").is_ok());
    }
}
