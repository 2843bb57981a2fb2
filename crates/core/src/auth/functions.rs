use rand::{distr::Alphanumeric, Rng};

use super::{AuthError, OidcLogin, Principal, SessionId, UserProfile};

/// Generate a cryptographically random session ID.
pub fn generate_session_id() -> SessionId {
    SessionId::new(random_token())
}

/// Generate a random state parameter for CSRF protection.
pub fn generate_state() -> String {
    random_token()
}

fn random_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Extract username from email if no name provided.
pub fn email_to_name(email: &str) -> String {
    match email.split('@').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "User".to_string(),
    }
}

/// Build the principal for a completed login.
///
/// The mail address comes from the `email` claim, falling back to
/// `preferred_username`; a login with neither is rejected.
pub fn principal_from_login(login: OidcLogin) -> Result<Principal, AuthError> {
    let OidcLogin {
        claims,
        access_token,
        refresh_token,
    } = login;

    let address = claims
        .email
        .or(claims.preferred_username)
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| AuthError::MissingClaim("email".to_string()))?;

    let display_name = claims
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email_to_name(&address));

    Ok(Principal {
        profile: UserProfile::new(display_name, address),
        access_token,
        refresh_token,
    })
}
