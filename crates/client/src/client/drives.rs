//! OneDrive operations.

use graphdesk_core::{
    drive::{Drive, DriveItem, ODataCollection, SharingLink, UploadedItem},
    mail::PHOTO_FILE_NAME,
    pagination::Page,
};
use serde::Deserialize;
use serde_json::json;
use urlencoding::encode;

use super::GraphClient;
use crate::error::Result;

/// Permission returned by `createLink`.
#[derive(Debug, Deserialize)]
struct Permission {
    link: SharingLink,
}

impl GraphClient {
    /// List the drives visible to the signed-in user.
    pub async fn get_drives(&self, token: &str) -> Result<Vec<Drive>> {
        let response = self.get(token, &self.url("/beta/drives")).send().await?;
        let collection: ODataCollection<Drive> = self.handle_response(response).await?;
        Ok(collection.value)
    }

    /// First page of the children of a drive's root folder.
    pub async fn get_drive_root(&self, token: &str, drive_id: &str) -> Result<Page<DriveItem>> {
        let path = format!("/beta/drives/{}/root/children", encode(drive_id));
        self.browse_by_url(token, &self.url(&path)).await
    }

    /// First page of the children of a folder.
    pub async fn browse_by_id(
        &self,
        token: &str,
        drive_id: &str,
        item_id: &str,
    ) -> Result<Page<DriveItem>> {
        let path = format!(
            "/beta/drives/{}/items/{}/children",
            encode(drive_id),
            encode(item_id)
        );
        self.browse_by_url(token, &self.url(&path)).await
    }

    /// Fetch a page of drive items from an absolute URL, typically an
    /// `@odata.nextLink` returned by a previous page.
    pub async fn browse_by_url(&self, token: &str, url: &str) -> Result<Page<DriveItem>> {
        let response = self.get(token, url).send().await?;
        let collection: ODataCollection<DriveItem> = self.handle_response(response).await?;
        Ok(collection.into())
    }

    /// Upload the profile photo to the root of the signed-in user's drive.
    pub async fn upload_file(&self, token: &str, bytes: Vec<u8>) -> Result<UploadedItem> {
        let path = format!("/beta/me/drive/root/children/{PHOTO_FILE_NAME}/content");
        let response = self
            .client
            .put(self.url(&path))
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(bytes)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Create a view-only sharing link for an item of the signed-in user's drive.
    pub async fn get_sharing_link(&self, token: &str, item_id: &str) -> Result<SharingLink> {
        let path = format!("/beta/me/drive/items/{}/createLink", encode(item_id));
        let response = self
            .client
            .post(self.url(&path))
            .bearer_auth(token)
            .json(&json!({ "type": "view" }))
            .send()
            .await?;
        let permission: Permission = self.handle_response(response).await?;
        Ok(permission.link)
    }
}
