//! Graph `sendMail` payloads.

use base64::Engine;
use serde::Serialize;

pub const WELCOME_SUBJECT: &str = "Welcome to Microsoft Graph development with graphdesk";

/// Name of the profile photo attached to (and uploaded for) the welcome mail.
pub const PHOTO_FILE_NAME: &str = "mypic.jpg";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMailRequest {
    pub message: MailMessage,
    pub save_to_sent_items: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailMessage {
    pub subject: String,
    pub body: MailBody,
    pub to_recipients: Vec<Recipient>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<FileAttachment>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailBody {
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email_address: RecipientAddress,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipientAddress {
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    #[serde(rename = "@odata.type")]
    pub odata_type: String,
    pub content_bytes: String,
    pub name: String,
}

/// Profile photo plus the sharing link of its uploaded copy.
#[derive(Debug, Clone)]
pub struct SharedPhoto {
    pub bytes: Vec<u8>,
    pub sharing_link: String,
}

/// Build the welcome message sent from `/sendMail`.
pub fn build_welcome_message(
    display_name: &str,
    recipient: &str,
    photo: Option<&SharedPhoto>,
) -> SendMailRequest {
    let link_paragraph = photo
        .map(|p| {
            format!(
                "<p>Here is a <a href=\"{}\">sharing link</a> to the profile photo that was just uploaded to your OneDrive.</p>",
                html_escape(&p.sharing_link)
            )
        })
        .unwrap_or_default();

    let content = format!(
        "<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\"></head>\
         <body style=\"font-family:calibri\">\
         <h2>Congratulations {name}!</h2>\
         <p>This message was sent by graphdesk through the Microsoft Graph API.</p>\
         {link_paragraph}\
         </body></html>",
        name = html_escape(display_name),
    );

    let attachments = photo
        .map(|p| FileAttachment {
            odata_type: "#microsoft.graph.fileAttachment".to_string(),
            content_bytes: base64::engine::general_purpose::STANDARD.encode(&p.bytes),
            name: PHOTO_FILE_NAME.to_string(),
        })
        .into_iter()
        .collect();

    SendMailRequest {
        message: MailMessage {
            subject: WELCOME_SUBJECT.to_string(),
            body: MailBody {
                content_type: "HTML".to_string(),
                content,
            },
            to_recipients: vec![Recipient {
                email_address: RecipientAddress {
                    address: recipient.to_string(),
                },
            }],
            attachments,
        },
        save_to_sent_items: true,
    }
}

/// Escape HTML special characters to prevent XSS.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
