/// Tools for starting and ending a session
///
/// This module implements session_sign_in and session_sign_out.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::domain::UserId;
use crate::services::{SessionService, TrackerError};

/// Parameters for signing in
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct SignInParams {
    /// User to sign in as (defaults to the local user)
    pub user_id: Option<String>,
}

/// Parameters for signing out
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct SignOutParams {}

pub async fn sign_in(
    sessions: &SessionService,
    default_user: UserId,
    params: SignInParams,
) -> Result<String, TrackerError> {
    let user_id = match params.user_id.as_deref() {
        Some(raw) => UserId::from_string(raw)
            .map_err(|_| TrackerError::InvalidInput(format!("Invalid user ID '{}'", raw)))?,
        None => default_user,
    };

    let session = sessions.sign_in(user_id).await?;
    Ok(format!(
        "Signed in as {} at {}. Reminders are running again.",
        session.user_id,
        session.started_at.to_rfc3339()
    ))
}

pub async fn sign_out(sessions: &SessionService, _params: SignOutParams) -> Result<String, TrackerError> {
    Ok(match sessions.sign_out().await? {
        Some(user_id) => format!("Signed out {}. All reminders were cancelled.", user_id),
        None => "Nobody was signed in.".to_string(),
    })
}
