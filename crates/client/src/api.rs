//! Graph operations used by the web handlers.
//!
//! Handlers depend on [`GraphApi`] so tests can swap the HTTP client for an
//! in-process fake.

use async_trait::async_trait;
use graphdesk_core::{
    auth::UserProfile,
    drive::{Drive, DriveItem, SharingLink, UploadedItem},
    mail::SendMailRequest,
    pagination::Page,
};

use crate::{error::Result, GraphClient};

#[async_trait]
pub trait GraphApi: Send + Sync {
    async fn get_user_profile(&self, token: &str) -> Result<UserProfile>;

    async fn get_drives(&self, token: &str) -> Result<Vec<Drive>>;

    async fn get_drive_root(&self, token: &str, drive_id: &str) -> Result<Page<DriveItem>>;

    async fn browse_by_id(
        &self,
        token: &str,
        drive_id: &str,
        item_id: &str,
    ) -> Result<Page<DriveItem>>;

    /// Fetch the page behind a continuation link.
    async fn browse_by_url(&self, token: &str, url: &str) -> Result<Page<DriveItem>>;

    /// Returns `None` when the user has no photo.
    async fn get_profile_photo(&self, token: &str) -> Result<Option<Vec<u8>>>;

    async fn upload_file(&self, token: &str, bytes: Vec<u8>) -> Result<UploadedItem>;

    async fn get_sharing_link(&self, token: &str, item_id: &str) -> Result<SharingLink>;

    async fn send_mail(&self, token: &str, request: &SendMailRequest) -> Result<()>;
}

#[async_trait]
impl GraphApi for GraphClient {
    async fn get_user_profile(&self, token: &str) -> Result<UserProfile> {
        GraphClient::get_user_profile(self, token).await
    }

    async fn get_drives(&self, token: &str) -> Result<Vec<Drive>> {
        GraphClient::get_drives(self, token).await
    }

    async fn get_drive_root(&self, token: &str, drive_id: &str) -> Result<Page<DriveItem>> {
        GraphClient::get_drive_root(self, token, drive_id).await
    }

    async fn browse_by_id(
        &self,
        token: &str,
        drive_id: &str,
        item_id: &str,
    ) -> Result<Page<DriveItem>> {
        GraphClient::browse_by_id(self, token, drive_id, item_id).await
    }

    async fn browse_by_url(&self, token: &str, url: &str) -> Result<Page<DriveItem>> {
        GraphClient::browse_by_url(self, token, url).await
    }

    async fn get_profile_photo(&self, token: &str) -> Result<Option<Vec<u8>>> {
        GraphClient::get_profile_photo(self, token).await
    }

    async fn upload_file(&self, token: &str, bytes: Vec<u8>) -> Result<UploadedItem> {
        GraphClient::upload_file(self, token, bytes).await
    }

    async fn get_sharing_link(&self, token: &str, item_id: &str) -> Result<SharingLink> {
        GraphClient::get_sharing_link(self, token, item_id).await
    }

    async fn send_mail(&self, token: &str, request: &SendMailRequest) -> Result<()> {
        GraphClient::send_mail(self, token, request).await
    }
}
