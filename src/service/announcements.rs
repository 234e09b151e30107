use super::{ChurchService, Principal};
use crate::error::ChurchError;
use crate::types::requests::AnnouncementRequest;
use crate::types::{Announcement, Operation};
use chrono::Utc;
use tracing::info;

impl ChurchService {
    pub async fn post_announcement(
        &self,
        principal: &Principal,
        req: AnnouncementRequest,
    ) -> Result<Announcement, ChurchError> {
        principal.require(Operation::PostAnnouncement)?;
        let title = req.title.trim();
        let message = req.message.trim();
        if title.is_empty() || message.is_empty() {
            return Err(ChurchError::invalid("please enter both title and message"));
        }

        let mut announcement = Announcement {
            id: 0,
            title: title.to_string(),
            message: message.to_string(),
            posted_by: principal.username.clone(),
            posted_at: Utc::now(),
        };
        announcement.id = self.store.insert_announcement(&announcement).await?;
        info!(by = %principal.username, id = announcement.id, "announcement posted");
        Ok(announcement)
    }

    /// Newest first.
    pub async fn announcements(&self, principal: &Principal) -> Result<Vec<Announcement>, ChurchError> {
        principal.require(Operation::ViewAnnouncement)?;
        self.store
            .list_announcements(self.settings.announcement_limit)
            .await
    }
}
