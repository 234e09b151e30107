use super::{ChurchService, Principal};
use crate::error::ChurchError;
use crate::types::{Member, Operation};
use std::collections::{BTreeSet, HashMap};
use tracing::info;

/// Case-insensitive substring match on name or home cell group.
pub fn matches_query(member: &Member, needle: &str) -> bool {
    member.name.to_lowercase().contains(needle) || member.home_cell_group.to_lowercase().contains(needle)
}

/// Trim and reject members missing an id, name or group.
pub fn normalize_member(mut m: Member) -> Result<Member, ChurchError> {
    m.member_id = m.member_id.trim().to_string();
    m.name = m.name.trim().to_string();
    m.home_cell_group = m.home_cell_group.trim().to_string();
    if m.member_id.is_empty() {
        return Err(ChurchError::invalid("member_id must not be empty"));
    }
    if m.name.is_empty() {
        return Err(ChurchError::invalid(format!("member `{}` has no name", m.member_id)));
    }
    if m.home_cell_group.is_empty() {
        return Err(ChurchError::invalid(format!(
            "member `{}` has no home cell group",
            m.member_id
        )));
    }
    m.phone = m.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
    m.email = m.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
    m.gender = m.gender.map(|g| g.trim().to_string()).filter(|g| !g.is_empty());
    Ok(m)
}

impl ChurchService {
    pub async fn search_members(
        &self,
        principal: &Principal,
        query: &str,
    ) -> Result<Vec<Member>, ChurchError> {
        principal.require(Operation::SearchMembers)?;
        let needle = query.trim().to_lowercase();
        let mut found: Vec<Member> = self
            .store
            .list_members()
            .await?
            .into_iter()
            .filter(|m| needle.is_empty() || matches_query(m, &needle))
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.member_id.cmp(&b.member_id)));
        Ok(found)
    }

    pub async fn home_cell_groups(&self, principal: &Principal) -> Result<Vec<String>, ChurchError> {
        principal.require(Operation::SearchMembers)?;
        let groups: BTreeSet<String> = self
            .store
            .list_members()
            .await?
            .into_iter()
            .map(|m| m.home_cell_group)
            .collect();
        Ok(groups.into_iter().collect())
    }

    pub async fn upsert_members(
        &self,
        principal: &Principal,
        members: Vec<Member>,
    ) -> Result<usize, ChurchError> {
        principal.require(Operation::ManageMembers)?;
        let members = members
            .into_iter()
            .map(normalize_member)
            .collect::<Result<Vec<_>, _>>()?;
        if members.is_empty() {
            return Err(ChurchError::invalid("no members supplied"));
        }
        let count = self.store.upsert_members(&members).await?;
        info!(by = %principal.username, count, "members upserted");
        Ok(count)
    }

    pub(crate) async fn member_index(&self) -> Result<HashMap<String, Member>, ChurchError> {
        Ok(self
            .store
            .list_members()
            .await?
            .into_iter()
            .map(|m| (m.member_id.clone(), m))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{admin, member, principal, service};
    use crate::types::Role;

    async fn seeded() -> ChurchService {
        let svc = service().await;
        svc.upsert_members(
            &admin(),
            vec![
                member("M1", "Ama Owusu", "Bethel"),
                member("M2", "Kofi Mensah", "Zion"),
                member("M3", "Abena Mensah", "Bethel"),
            ],
        )
        .await
        .unwrap();
        svc
    }

    #[tokio::test]
    async fn unique_substring_returns_one_member() {
        let svc = seeded().await;
        let who = principal(Role::Member, None);
        let found = svc.search_members(&who, "owusu").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].member_id, "M1");
    }

    #[tokio::test]
    async fn search_matches_group_and_sorts_by_name() {
        let svc = seeded().await;
        let who = principal(Role::Member, None);
        let names: Vec<String> = svc
            .search_members(&who, "BETHEL")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Abena Mensah", "Ama Owusu"]);

        assert!(svc.search_members(&who, "nobody").await.unwrap().is_empty());
        assert_eq!(svc.search_members(&who, "  ").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn groups_are_distinct_and_sorted() {
        let svc = seeded().await;
        let groups = svc.home_cell_groups(&admin()).await.unwrap();
        assert_eq!(groups, vec!["Bethel", "Zion"]);
    }

    #[tokio::test]
    async fn only_admins_manage_members() {
        let svc = service().await;
        let err = svc
            .upsert_members(
                &principal(Role::Accountant, None),
                vec![member("M9", "Yaw", "Zion")],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ChurchError::Unauthorized));

        let err = svc
            .upsert_members(&admin(), vec![member(" ", "Yaw", "Zion")])
            .await
            .unwrap_err();
        assert!(matches!(err, ChurchError::InvalidInput(_)));
    }
}
