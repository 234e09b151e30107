use super::ChurchService;
use super::directory::normalize_member;
use crate::config::ChurchConfig;
use crate::error::ChurchError;
use crate::types::{Member, Role, User};
use chrono::Utc;
use std::{fs, path::Path};
use tracing::{info, warn};

/// Accounts created on first start-up; their passwords must be changed after deployment.
pub const DEFAULT_ACCOUNTS: [(&str, &str, Role); 2] = [
    ("admin", "admin123", Role::Admin),
    ("accountant", "account123", Role::Accountant),
];

/// Load a JSON array of members from `path`. Invalid entries are skipped.
pub fn load_members_from_file(path: &Path) -> Result<Vec<Member>, ChurchError> {
    if !path.exists() {
        info!(path = %path.display(), "members file not found; skipping load");
        return Ok(Vec::new());
    }

    let contents = fs::read_to_string(path)?;
    let raw: Vec<Member> = serde_json::from_str(&contents)?;
    let loaded = raw
        .into_iter()
        .filter_map(|m| {
            normalize_member(m)
                .inspect_err(|e| {
                    warn!(path = %path.display(), error = %e, "skipping member entry");
                })
                .ok()
        })
        .collect();
    Ok(loaded)
}

impl ChurchService {
    /// Seed [`DEFAULT_ACCOUNTS`] when the user table is empty. Returns how many were created.
    pub async fn seed_default_users(&self) -> Result<usize, ChurchError> {
        let users = self.gate.users();
        if users.count_users().await? > 0 {
            return Ok(0);
        }
        let now = Utc::now();
        for (username, password, role) in DEFAULT_ACCOUNTS {
            let user = User {
                username: username.to_string(),
                password_hash: self.gate.hash_password(password).await?,
                role,
                home_cell_group: None,
                created_at: now,
                updated_at: now,
            };
            users.insert_user(&user).await?;
            warn!(username, role = %role, "seeded default account; change its password");
        }
        Ok(DEFAULT_ACCOUNTS.len())
    }

    /// Start-up work: default accounts and the optional members file.
    pub async fn bootstrap(&self, cfg: &ChurchConfig) -> Result<(), ChurchError> {
        if cfg.seed_default_users {
            self.seed_default_users().await?;
        }

        if let Some(path) = cfg.members_file.as_ref() {
            match load_members_from_file(path) {
                Ok(members) if !members.is_empty() => {
                    let count = self.store.upsert_members(&members).await?;
                    info!(path = %path.display(), count, "members imported from file");
                }
                Ok(_) => {
                    info!(path = %path.display(), "no members discovered");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load members file");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{principal, service};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(tag: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("church-records-{tag}-{}-{nanos}.json", std::process::id()));
        path
    }

    #[tokio::test]
    async fn default_accounts_are_seeded_once() {
        let svc = service().await;
        assert_eq!(svc.seed_default_users().await.unwrap(), 2);
        assert_eq!(svc.seed_default_users().await.unwrap(), 0);

        assert_eq!(svc.login("admin", "admin123").await.unwrap().role, Role::Admin);
        assert_eq!(
            svc.login("accountant", "account123").await.unwrap().role,
            Role::Accountant
        );
    }

    #[test]
    fn missing_members_file_is_empty() {
        let loaded = load_members_from_file(Path::new("/definitely/not/here.json")).unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn members_file_is_imported_and_invalid_rows_skipped() {
        let path = temp_file("members");
        fs::write(
            &path,
            r#"[
                {"member_id": "M1", "name": "Ama Owusu", "home_cell_group": "Bethel", "phone": "0241112222"},
                {"member_id": "", "name": "No Id", "home_cell_group": "Zion"}
            ]"#,
        )
        .unwrap();

        let svc = service().await;
        let mut cfg = ChurchConfig::default();
        cfg.seed_default_users = false;
        cfg.members_file = Some(path.clone());
        svc.bootstrap(&cfg).await.unwrap();

        let found = svc
            .search_members(&principal(Role::Member, None), "")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].phone.as_deref(), Some("0241112222"));

        let _ = fs::remove_file(&path);
    }
}
