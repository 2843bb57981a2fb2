use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Cryptographically random session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub address: String,
}

/// Display name and mail addresses of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub display_name: String,
    pub emails: Vec<EmailAddress>,
}

impl UserProfile {
    pub fn new(display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            emails: vec![EmailAddress {
                address: email.into(),
            }],
        }
    }

    /// First known mail address, if any.
    pub fn primary_email(&self) -> Option<&str> {
        self.emails.first().map(|e| e.address.as_str())
    }
}

/// An authenticated user together with the credentials used to call the
/// resource API on their behalf.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub profile: UserProfile,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

// Tokens stay out of logs.
impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("profile", &self.profile)
            .field("access_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Claims extracted from a verified OIDC ID token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcClaims {
    /// Token issuer.
    pub issuer: String,
    /// Provider's unique user identifier.
    pub subject: String,
    /// User's email address.
    pub email: Option<String>,
    /// Login name, usually a UPN for work or school accounts.
    pub preferred_username: Option<String>,
    /// User's display name.
    pub name: Option<String>,
}

/// Result of a successful code exchange.
#[derive(Clone)]
pub struct OidcLogin {
    pub claims: OidcClaims,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// How long a started sign-in waits for its callback.
pub const AUTH_FLOW_TTL: Duration = Duration::minutes(10);

/// PKCE and nonce data stored during auth flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthFlowState {
    pub pkce_verifier: String,
    pub nonce: String,
    pub created_at: DateTime<Utc>,
}

impl AuthFlowState {
    /// Whether the flow is older than [`AUTH_FLOW_TTL`] at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > AUTH_FLOW_TTL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow_started(at: DateTime<Utc>) -> AuthFlowState {
        AuthFlowState {
            pkce_verifier: "verifier".to_string(),
            nonce: "nonce".to_string(),
            created_at: at,
        }
    }

    #[test]
    fn test_auth_flow_expiry_boundary() {
        let now = Utc::now();

        assert!(!flow_started(now).is_expired(now));
        assert!(!flow_started(now - AUTH_FLOW_TTL).is_expired(now));
        assert!(flow_started(now - AUTH_FLOW_TTL - Duration::seconds(1)).is_expired(now));
    }
}
