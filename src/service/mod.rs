//! Record operations layer: every operation authorizes the caller's
//! [`Principal`] first, validates its input, then reads or writes the store.

pub mod access;
pub mod announcements;
pub mod attendance;
pub mod bootstrap;
pub mod directory;
pub mod finance;
pub mod reports;
pub mod summary;
pub mod summary_actor;
pub mod users;

pub use access::{AccessGate, Principal, authorize};
pub use summary::{AtRiskPolicy, SummaryOutcome};
pub use summary_actor::SummaryHandle;

use crate::config::Config;
use crate::db::{RecordStore, SqliteStore, UserRepository};
use crate::error::ChurchError;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub currency: String,
    pub announcement_limit: usize,
    pub recent_limit: usize,
}

impl From<&Config> for ServiceSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            currency: cfg.church.currency.clone(),
            announcement_limit: cfg.church.announcement_limit.max(1),
            recent_limit: cfg.church.recent_limit.max(1),
        }
    }
}

#[derive(Clone)]
pub struct ChurchService {
    gate: AccessGate,
    store: Arc<dyn RecordStore>,
    summary: SummaryHandle,
    settings: ServiceSettings,
}

impl ChurchService {
    /// Wire the service over injected repositories and start the summary worker.
    pub async fn new(
        users: Arc<dyn UserRepository>,
        store: Arc<dyn RecordStore>,
        cfg: &Config,
    ) -> Result<Self, ChurchError> {
        let gate = AccessGate::new(users, &cfg.security)?;
        let policy = AtRiskPolicy {
            window: cfg.church.at_risk_window,
            missed_threshold: cfg.church.at_risk_missed_threshold,
        };
        let summary = summary_actor::spawn(store.clone(), policy).await?;
        Ok(Self {
            gate,
            store,
            summary,
            settings: ServiceSettings::from(cfg),
        })
    }

    /// Open the SQLite record store named by `basic.database_url`.
    pub async fn open(cfg: &Config) -> Result<Self, ChurchError> {
        let store = Arc::new(SqliteStore::connect(&cfg.basic.database_url).await?);
        Self::new(store.clone(), store, cfg).await
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Principal, ChurchError> {
        self.gate.authenticate(username, password).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::types::{Member, Role, User};
    use chrono::Utc;

    pub(crate) fn test_config() -> Config {
        let mut cfg = Config::default();
        cfg.basic.database_url = "sqlite::memory:".to_string();
        cfg.security = access::tests::fast_security();
        cfg
    }

    pub(crate) async fn service() -> ChurchService {
        ChurchService::open(&test_config())
            .await
            .expect("open in-memory service")
    }

    pub(crate) fn principal(role: Role, group: Option<&str>) -> Principal {
        Principal {
            username: format!("{role}-user"),
            role,
            home_cell_group: group.map(str::to_string),
        }
    }

    pub(crate) fn admin() -> Principal {
        principal(Role::Admin, None)
    }

    pub(crate) fn member(id: &str, name: &str, group: &str) -> Member {
        Member {
            member_id: id.to_string(),
            name: name.to_string(),
            home_cell_group: group.to_string(),
            phone: None,
            email: None,
            gender: None,
        }
    }

    pub(crate) async fn add_user(svc: &ChurchService, name: &str, pw: &str, role: Role) {
        let user = User {
            username: name.to_string(),
            password_hash: svc.gate().hash_password(pw).await.unwrap(),
            role,
            home_cell_group: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        svc.gate().users().insert_user(&user).await.unwrap();
    }
}
