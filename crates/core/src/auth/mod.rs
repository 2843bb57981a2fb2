mod error;
mod functions;
mod traits;
mod types;

pub use error::AuthError;
pub use functions::{email_to_name, generate_session_id, generate_state, principal_from_login};
pub use traits::{OidcProviderClient, Result, SessionRepository};
pub use types::{
    AuthFlowState, EmailAddress, OidcClaims, OidcLogin, Principal, SessionId, UserProfile,
    AUTH_FLOW_TTL,
};
