//! Operations on the signed-in user (`/beta/me`).

use graphdesk_core::{auth::UserProfile, mail::SendMailRequest};
use serde::Deserialize;

use super::GraphClient;
use crate::error::{ClientError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphUser {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    mail: Option<String>,
    #[serde(default)]
    user_principal_name: Option<String>,
}

impl GraphUser {
    fn into_profile(self) -> Result<UserProfile> {
        let address = self
            .mail
            .or(self.user_principal_name)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ClientError::InvalidResponse("user has no mail address".to_string()))?;
        let display_name = self.display_name.unwrap_or_else(|| address.clone());
        Ok(UserProfile::new(display_name, address))
    }
}

impl GraphClient {
    /// Fetch the signed-in user's profile.
    pub async fn get_user_profile(&self, token: &str) -> Result<UserProfile> {
        let response = self.get(token, &self.url("/beta/me")).send().await?;
        let user: GraphUser = self.handle_response(response).await?;
        user.into_profile()
    }

    /// Fetch the profile photo. A user without a photo yields `None`.
    pub async fn get_profile_photo(&self, token: &str) -> Result<Option<Vec<u8>>> {
        let response = self
            .get(token, &self.url("/beta/me/photo/$value"))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("User has no profile photo");
            return Ok(None);
        }

        let response = self.check_status(response).await?;
        Ok(Some(response.bytes().await?.to_vec()))
    }

    /// Send a mail as the signed-in user.
    pub async fn send_mail(&self, token: &str, request: &SendMailRequest) -> Result<()> {
        let response = self
            .client
            .post(self.url("/beta/me/sendMail"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        self.check_status(response).await?;
        Ok(())
    }
}
