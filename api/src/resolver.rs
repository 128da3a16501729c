//! Resolution of the system user.
//!
//! The system user is configured through the `SYSTEM_*` environment variables and enriched with
//! the first matching record from the remote directory. Every request resolves it afresh; nothing
//! is cached.

use crate::config::{SystemConfig, DEFAULT_GITHUB_USERNAME};
use crate::directory::{Directory, DirectoryError};
use crate::models::user::{DirectoryUser, ResolvedIdentity, SystemUser};

/// Returns the first candidate that is present and non-empty, in order.
pub fn first_non_empty<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|c| !c.is_empty())
}

/// Builds the system user from configuration.
///
/// Returns `None` when no access token is configured. A missing token is logged as a warning,
/// never treated as an error.
pub fn resolve_local_user(config: &SystemConfig) -> Option<SystemUser> {
    let github_access_token = match first_non_empty(&[config.github_access_token.as_deref()]) {
        Some(token) => token.to_string(),
        None => {
            log::warn!("SYSTEM_GITHUB_ACCESS_TOKEN is not set; the system user is unavailable");
            return None;
        }
    };

    let github_username = first_non_empty(&[config.github_username.as_deref()])
        .unwrap_or(DEFAULT_GITHUB_USERNAME)
        .to_string();
    let email = first_non_empty(&[config.email.as_deref()]).map(str::to_string);
    let name = first_non_empty(&[config.name.as_deref(), Some(github_username.as_str())])
        .unwrap_or(github_username.as_str())
        .to_string();

    Some(SystemUser {
        github_username,
        github_access_token,
        email,
        name,
    })
}

/// Whether a directory record belongs to the system user: either its metadata names the same
/// GitHub account, or it has the same email. An unset local email never matches.
fn is_match(local: &SystemUser, user: &DirectoryUser) -> bool {
    if user.github_username() == Some(local.github_username.as_str()) {
        return true;
    }
    match (&local.email, &user.email) {
        (Some(local_email), Some(email)) => local_email == email,
        _ => false,
    }
}

/// Lists the directory once and returns the first record matching `local`.
pub async fn find_directory_match(
    local: &SystemUser,
    directory: &dyn Directory,
) -> Result<Option<DirectoryUser>, DirectoryError> {
    let users = directory.list_users().await?;
    Ok(users.into_iter().find(|u| is_match(local, u)))
}

/// Finds the directory record of the system user.
///
/// Does not touch the directory at all when the system user is unavailable.
pub async fn resolve_directory_match(
    config: &SystemConfig,
    directory: &dyn Directory,
) -> Result<Option<DirectoryUser>, DirectoryError> {
    match resolve_local_user(config) {
        Some(local) => find_directory_match(&local, directory).await,
        None => Ok(None),
    }
}

/// Merges the configured identity with its directory record. Configuration wins.
pub fn resolve_identity(local: &SystemUser, matched: &DirectoryUser) -> ResolvedIdentity {
    let name = first_non_empty(&[
        Some(local.name.as_str()),
        matched.name(),
        Some(local.github_username.as_str()),
    ])
    .unwrap_or(local.github_username.as_str())
    .to_string();
    let email = first_non_empty(&[local.email.as_deref(), matched.email.as_deref()])
        .map(str::to_string);

    ResolvedIdentity {
        name,
        email,
        github_username: local.github_username.clone(),
    }
}

/// Resolves the identity served by `GET /api/system/user`.
///
/// `Ok(None)` means there is no system user to report: either it is not configured or the
/// directory holds no record for it.
pub async fn resolve_system_identity(
    config: &SystemConfig,
    directory: &dyn Directory,
) -> Result<Option<ResolvedIdentity>, DirectoryError> {
    let local = match resolve_local_user(config) {
        Some(local) => local,
        None => return Ok(None),
    };

    let matched = find_directory_match(&local, directory).await?;

    Ok(matched.map(|m| resolve_identity(&local, &m)))
}
