use crate::config::{Config, GithubConfig};
use crate::models::session::{session_expiry, Session};

use rand::{distributions::Alphanumeric, Rng};
use url::Url;

/// The only sign-in provider.
pub const PROVIDER: &str = "github";
/// Where users land after signing in, unless they asked for somewhere else.
pub const DEFAULT_CALLBACK: &str = "/dashboard";
const GITHUB_SCOPE: &str = "read:user user:email";

/// Completes a GitHub sign-in: swaps the OAuth `code` for an access token, reads the GitHub
/// profile and builds the session for it.
pub async fn login_handler(code: &str, config: &Config) -> Result<Session, LoginError> {
    let access_token = get_access_token(code, config).await.map_err(|e| {
        log::error!("error retrieving GitHub access token: {:?}", e);
        LoginError::AccessTokenNotGranted
    })?;

    let (user_info, emails) = get_user_info(&access_token, &config.github)
        .await
        .map_err(|e| {
            log::error!("error retrieving Github user info {:?}", e);
            LoginError::UserInfoNotAvailable
        })?;

    let session = build_session(user_info, emails);
    log::info!("signed in GitHub user {}", session.login);

    Ok(session)
}

/// Builds the GitHub authorize URL users are redirected to.
pub fn authorize_url(config: &Config, state: &str) -> Result<Url, LoginError> {
    let mut url = Url::parse(&format!("{}/authorize", config.github.oauth_url))?;
    url.query_pairs_mut()
        .append_pair("client_id", &config.github.client_id)
        .append_pair("redirect_uri", &config.github_redirect_uri())
        .append_pair("scope", GITHUB_SCOPE)
        .append_pair("state", state);
    Ok(url)
}

/// Random value tying an OAuth callback to the browser that started the sign-in.
pub fn random_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Accepts only same-site paths that are safe to store in a cookie. Anything else falls back
/// to [`DEFAULT_CALLBACK`].
pub fn sanitize_callback(raw: Option<&str>) -> String {
    match raw {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && path
                    .chars()
                    .all(|c| c.is_ascii_graphic() && !matches!(c, '"' | ',' | ';' | '\\')) =>
        {
            path.to_string()
        }
        _ => DEFAULT_CALLBACK.to_string(),
    }
}

#[derive(Deserialize, Debug)]
struct GithubAccessTokenResponse {
    access_token: String,
}

async fn get_access_token(code: &str, config: &Config) -> Result<String, LoginError> {
    let client = reqwest::Client::new();
    let redirect_uri = config.github_redirect_uri();

    let res = client
        .post(format!("{}/access_token", config.github.oauth_url))
        .header(reqwest::header::ACCEPT, "application/json")
        .query(&[
            ("client_id", config.github.client_id.as_str()),
            ("client_secret", config.github.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json::<GithubAccessTokenResponse>()
        .await?;

    Ok(res.access_token)
}

#[derive(Deserialize, Debug)]
pub struct GithubUserInfo {
    pub id: i64,
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct GithubEmail {
    pub email: String,
    pub primary: bool,
}

/// Prefers the primary address from `/user/emails`, then the public profile email.
pub fn build_session(user: GithubUserInfo, emails: Vec<GithubEmail>) -> Session {
    let email = emails
        .into_iter()
        .find(|e| e.primary)
        .map(|e| e.email)
        .or(user.email);

    Session {
        sub: user.id,
        login: user.login,
        name: user.name,
        email,
        image: user.avatar_url,
        exp: session_expiry(),
    }
}

async fn get_user_info(
    access_token: &str,
    github: &GithubConfig,
) -> Result<(GithubUserInfo, Vec<GithubEmail>), LoginError> {
    let client = reqwest::Client::new();

    let user = client
        .get(format!("{}/user", github.api_url))
        .header(reqwest::header::USER_AGENT, &github.user_agent)
        .header(reqwest::header::ACCEPT, "application/json")
        .header(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {}", access_token),
        )
        .send()
        .await?
        .error_for_status()?
        .json::<GithubUserInfo>()
        .await?;

    let emails = client
        .get(format!("{}/user/emails", github.api_url))
        .header(reqwest::header::USER_AGENT, &github.user_agent)
        .header(reqwest::header::ACCEPT, "application/json")
        .header(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {}", access_token),
        )
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<GithubEmail>>()
        .await?;

    Ok((user, emails))
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("GitHub communication failed: {0}")]
    GHComms(#[from] reqwest::Error),
    #[error("could not sign session: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
    #[error("could not build GitHub URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("GitHub did not grant an access token")]
    AccessTokenNotGranted,
    #[error("GitHub user info not available")]
    UserInfoNotAvailable,
    #[error("OAuth state missing or mismatched")]
    InvalidState,
}
