use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::{
    AppContext,
    api::ClientError,
    models::{NewUser, RecordId, Role, SessionUser},
    routes::{DASHBOARD, LOGIN},
    session::SessionError,
};

/// AuthError
///
/// Failures of login and registration. The `Display` text is shown to the user
/// as-is, so the credential variants stay deliberately vague.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Email already registered")]
    EmailTaken,
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// hash_password
///
/// Lowercase hex SHA-256 of the password, the format stored in the `users`
/// collection.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// login
///
/// Looks the user up by email, compares password digests and persists the session.
pub async fn login(ctx: &AppContext, email: &str, password: &str) -> Result<SessionUser, AuthError> {
    let users = ctx.repo.users_by_email(email).await?;
    let user = users.first().ok_or(AuthError::InvalidCredentials)?;

    if user.password != hash_password(password) {
        tracing::info!(email, "login rejected");
        return Err(AuthError::InvalidCredentials);
    }

    let session = user.to_session();
    ctx.session.save(&session)?;
    tracing::info!(user_id = %session.id, role = %session.role, "logged in");
    Ok(session)
}

/// register
///
/// Creates an attendee account and logs it in. Ids are assigned client-side as one
/// more than the largest numeric id in the store.
pub async fn register(
    ctx: &AppContext,
    name: &str,
    email: &str,
    password: &str,
) -> Result<SessionUser, AuthError> {
    if !ctx.repo.users_by_email(email).await?.is_empty() {
        return Err(AuthError::EmailTaken);
    }

    let next_id = ctx
        .repo
        .users()
        .await?
        .iter()
        .filter_map(|u| u.id.as_number())
        .max()
        .map_or(1, |max| max + 1);

    let new_user = NewUser {
        id: RecordId::from(next_id),
        name: name.to_string(),
        email: email.to_string(),
        password: hash_password(password),
        role: Role::Attendee,
    };
    let user = ctx.repo.create_user(&new_user).await?;

    let session = user.to_session();
    ctx.session.save(&session)?;
    tracing::info!(user_id = %session.id, "registered");
    Ok(session)
}

pub fn logout(ctx: &AppContext) -> Result<(), SessionError> {
    ctx.session.clear()?;
    tracing::info!("logged out");
    Ok(())
}

/// Denied
///
/// Entry check failure: the caller must navigate to the carried fragment instead
/// of rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denied(pub &'static str);

/// require_session
///
/// First entry check of every screen behind the dashboard. The router already
/// guards the prefix, but a screen can be reached after the session vanished.
pub fn require_session(ctx: &AppContext) -> Result<SessionUser, Denied> {
    ctx.current_user().ok_or(Denied(LOGIN))
}

/// require_organizer
///
/// Role gate for the management screens and actions. The router never checks
/// roles, so this is the only thing keeping attendees out of them.
pub fn require_organizer(ctx: &AppContext) -> Result<SessionUser, Denied> {
    let user = require_session(ctx)?;
    if !user.is_organizer() {
        tracing::debug!(user_id = %user.id, "organizer-only screen refused");
        return Err(Denied(DASHBOARD));
    }
    Ok(user)
}
