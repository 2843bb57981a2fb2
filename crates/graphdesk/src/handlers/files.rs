//! OneDrive folder listings.

use askama::Template;
use axum::{extract::State, response::IntoResponse};
use graphdesk_auth::CurrentUser;
use graphdesk_client::GraphApi;
use graphdesk_core::{
    drive::DriveItem,
    pagination::{walk, Page},
};
use urlencoding::encode;

use crate::{error::HandlerResult, extract::Path, render::HtmlTemplate, state::AppState};

/// One row of a folder listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub name: String,
    pub size: String,
    pub modified: String,
    /// Link to the folder's own listing, for folders.
    pub browse_href: Option<String>,
    /// Pre-authenticated download link, for files.
    pub download_url: Option<String>,
}

impl FolderEntry {
    fn from_item(item: &DriveItem, drive_id: &str) -> Self {
        let drive_id = item
            .parent_reference
            .as_ref()
            .and_then(|r| r.drive_id.as_deref())
            .unwrap_or(drive_id);

        Self {
            name: item.name.clone(),
            size: format_size(item.size),
            modified: item
                .last_modified_date_time
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            browse_href: item
                .is_folder()
                .then(|| format!("/browse/{}/{}", encode(drive_id), encode(&item.id))),
            download_url: item.file_download_url().map(str::to_string),
        }
    }
}

#[derive(Template)]
#[template(path = "folder.html")]
struct FolderTemplate {
    entries: Vec<FolderEntry>,
}

/// GET /files - Root folder of the user's first drive.
pub async fn files(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> HandlerResult {
    let token = principal.access_token.as_str();
    let drives = state.graph.get_drives(token).await?;

    let Some(drive) = drives.first() else {
        tracing::debug!("User has no drives");
        return render_folder(Vec::new(), "");
    };

    let first = state.graph.get_drive_root(token, &drive.id).await?;
    let items = walk_items(state.graph.as_ref(), token, first).await?;
    render_folder(items, &drive.id)
}

/// GET /browse/{driveId}/{itemId} - Children of a folder.
pub async fn browse(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path((drive_id, item_id)): Path<(String, String)>,
) -> HandlerResult {
    let token = principal.access_token.as_str();
    let first = state.graph.browse_by_id(token, &drive_id, &item_id).await?;
    let items = walk_items(state.graph.as_ref(), token, first).await?;
    render_folder(items, &drive_id)
}

/// Follow the `@odata.nextLink` chain of a listing.
async fn walk_items(
    graph: &dyn GraphApi,
    token: &str,
    first: Page<DriveItem>,
) -> HandlerResult<Vec<DriveItem>> {
    let items = walk(first, move |link| async move {
        graph.browse_by_url(token, &link).await
    })
    .await?;
    tracing::debug!(count = items.len(), "Listed folder");
    Ok(items)
}

fn render_folder(items: Vec<DriveItem>, drive_id: &str) -> HandlerResult {
    let entries = items
        .iter()
        .map(|item| FolderEntry::from_item(item, drive_id))
        .collect();
    let page = HtmlTemplate(FolderTemplate { entries }).render()?;
    Ok(page.into_response())
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
