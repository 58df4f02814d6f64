//! Session request lifecycle: creation, review decisions, deletion and the
//! dashboard counters derived from them.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{Local, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::db::{
    JsonStore, NewSessionRequest, SessionDownload, SessionRequest, SessionStats, SessionStatus,
};
use crate::storage::{StoredFile, UploadStore, PDF_MIME_TYPE};

const ENTITY: &str = "Session";

/// The calendar day `upcoming` is measured against: the server's local date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct SessionService {
    store: JsonStore<SessionRequest>,
    uploads: UploadStore,
}

impl SessionService {
    pub fn new(store: JsonStore<SessionRequest>, uploads: UploadStore) -> Self {
        Self { store, uploads }
    }

    /// Store an uploaded PDF ahead of the request that will reference it.
    pub async fn upload_pdf(&self, original_name: &str, data: &[u8]) -> ServiceResult<StoredFile> {
        Ok(self.uploads.save_pdf(original_name, data).await?)
    }

    pub async fn create(&self, input: NewSessionRequest) -> ServiceResult<SessionRequest> {
        let now = Utc::now();
        let session = SessionRequest {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            user_id: input.user_id,
            user_name: input.user_name,
            user_email: input.user_email,
            pdf_path: input.pdf_path,
            original_file_name: input.original_file_name,
            file_size: input.file_size,
            requested_date: input.requested_date,
            requested_time: input.requested_time,
            status: SessionStatus::Pending,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        };

        let mut writer = self.store.write().await?;
        writer.push(session.clone());
        writer.commit().await?;

        info!(
            session_id = %session.id,
            user_id = %session.user_id,
            requested_date = %session.requested_date,
            "Session request created"
        );
        Ok(session)
    }

    pub async fn list_all(&self) -> ServiceResult<Vec<SessionRequest>> {
        Ok(self.store.load().await?)
    }

    pub async fn list_by_user(&self, user_id: &str) -> ServiceResult<Vec<SessionRequest>> {
        let mut sessions = self.store.load().await?;
        sessions.retain(|s| s.user_id == user_id);
        Ok(sessions)
    }

    /// All requests, or only those owned by `user_id` when given.
    pub async fn list(&self, user_id: Option<&str>) -> ServiceResult<Vec<SessionRequest>> {
        match user_id {
            Some(user_id) => self.list_by_user(user_id).await,
            None => self.list_all().await,
        }
    }

    pub async fn get(&self, id: &str) -> ServiceResult<SessionRequest> {
        self.store
            .find(id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))
    }

    /// Record a review decision. An absent or empty note keeps the previous one.
    pub async fn set_status(
        &self,
        id: &str,
        status: SessionStatus,
        admin_notes: Option<String>,
    ) -> ServiceResult<SessionRequest> {
        let mut writer = self.store.write().await?;
        let session = writer.get_mut(id).ok_or(ServiceError::NotFound(ENTITY))?;

        let previous = session.status;
        session.status = status;
        if let Some(note) = admin_notes.filter(|n| !n.is_empty()) {
            session.admin_notes = Some(note);
        }
        session.updated_at = Utc::now();

        let updated = session.clone();
        writer.commit().await?;

        info!(session_id = %id, from = %previous, to = %status, "Session status updated");
        Ok(updated)
    }

    /// Remove a request together with its uploaded file. The record is
    /// committed away first; a file that cannot be removed afterwards is only
    /// logged.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let mut writer = self.store.write().await?;
        let removed = writer.remove(id).ok_or(ServiceError::NotFound(ENTITY))?;
        writer.commit().await?;

        if let Some(file_name) = removed.stored_file_name() {
            if let Err(e) = self.uploads.remove(file_name).await {
                warn!(session_id = %id, file = %file_name, error = %e, "Failed to remove upload");
            }
        }

        info!(session_id = %id, "Session request deleted");
        Ok(())
    }

    pub async fn stats(&self, user_id: Option<&str>) -> ServiceResult<SessionStats> {
        self.stats_on(user_id, today()).await
    }

    pub async fn stats_on(
        &self,
        user_id: Option<&str>,
        today: NaiveDate,
    ) -> ServiceResult<SessionStats> {
        let sessions = self.list(user_id).await?;
        Ok(SessionStats::compute(&sessions, today))
    }

    /// Approved requests from today onward, soonest first.
    pub async fn upcoming(&self, user_id: Option<&str>) -> ServiceResult<Vec<SessionRequest>> {
        self.upcoming_on(user_id, today()).await
    }

    pub async fn upcoming_on(
        &self,
        user_id: Option<&str>,
        today: NaiveDate,
    ) -> ServiceResult<Vec<SessionRequest>> {
        let mut sessions = self.list(user_id).await?;
        sessions.retain(|s| s.is_upcoming(today));
        sessions.sort_by(|a, b| {
            a.requested_date
                .cmp(&b.requested_date)
                .then_with(|| a.requested_time.cmp(&b.requested_time))
        });
        Ok(sessions)
    }

    /// The request's PDF, base64 encoded, under its original file name.
    pub async fn download(&self, id: &str) -> ServiceResult<SessionDownload> {
        let session = self.get(id).await?;
        let file_name = session
            .stored_file_name()
            .ok_or(ServiceError::NotFound("File"))?;
        let data = self
            .uploads
            .read(file_name)
            .await?
            .ok_or(ServiceError::NotFound("File"))?;

        Ok(SessionDownload {
            file_name: session.original_file_name,
            data: BASE64.encode(data),
            mime_type: PDF_MIME_TYPE,
        })
    }
}
