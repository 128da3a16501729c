use crate::handlers::login::{
    authorize_url, login_handler, random_state, sanitize_callback, LoginError, PROVIDER,
};
use crate::middlewares::session::{SessionAuth, SESSION_COOKIE};
use crate::models::session::{SessionView, SESSION_DAYS};
use crate::state::AppState;

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::{error, get, http::header, post, web, Error, HttpRequest, HttpResponse, Result};

/// Holds `{state}|{callback}` between the sign-in redirect and the OAuth callback.
pub const OAUTH_COOKIE: &str = "vibememory.oauth";

impl From<LoginError> for Error {
    fn from(e: LoginError) -> Self {
        match e {
            LoginError::InvalidState => {
                log::warn!("OAuth callback with missing or mismatched state");
                error::ErrorBadRequest("invalid OAuth state")
            }
            LoginError::AccessTokenNotGranted => {
                error::ErrorInternalServerError("unable to login with GitHub")
            }
            LoginError::UserInfoNotAvailable => error::ErrorInternalServerError(
                "unable to login with GitHub; user information not available",
            ),
            e => {
                log::error!("error when attempting to log in user: {:?}", e);
                error::ErrorInternalServerError("unable to login with GitHub")
            }
        }
    }
}

fn check_provider(provider: &str) -> Result<()> {
    if provider == PROVIDER {
        Ok(())
    } else {
        Err(error::ErrorNotFound("unknown sign-in provider"))
    }
}

fn session_cookie(value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, value)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .finish()
}

#[derive(Deserialize, Debug)]
struct SignIn {
    #[serde(rename = "callbackUrl")]
    callback_url: Option<String>,
}

#[get("/signin/{provider}")]
async fn sign_in(
    provider: web::Path<String>,
    query: web::Query<SignIn>,
    state: AppState,
) -> Result<HttpResponse> {
    check_provider(&provider)?;

    let csrf = random_state();
    let callback_path = sanitize_callback(query.callback_url.as_deref());
    let url = authorize_url(&state.config, &csrf)?;

    let pending = Cookie::build(OAUTH_COOKIE, format!("{}|{}", csrf, callback_path))
        .path("/api/auth")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::minutes(10))
        .finish();

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, url.as_str()))
        .cookie(pending)
        .finish())
}

#[derive(Deserialize, Debug)]
struct Callback {
    code: String,
    state: String,
}

/// Trades the GitHub code for a signed session token.
async fn exchange_code(code: &str, state: &AppState) -> Result<String, LoginError> {
    let signed_in = login_handler(code, &state.config).await?;
    Ok(signed_in.encode(&state.config.session_secret)?)
}

#[get("/callback/{provider}")]
async fn callback(
    req: HttpRequest,
    provider: web::Path<String>,
    query: web::Query<Callback>,
    state: AppState,
) -> Result<HttpResponse> {
    check_provider(&provider)?;

    let pending = req.cookie(OAUTH_COOKIE).ok_or(LoginError::InvalidState)?;
    let (expected, callback_url) = pending
        .value()
        .split_once('|')
        .ok_or(LoginError::InvalidState)?;
    if expected.is_empty() || expected != query.state {
        return Err(LoginError::InvalidState.into());
    }

    let clear_pending = Cookie::build(OAUTH_COOKIE, "")
        .path("/api/auth")
        .max_age(Duration::ZERO)
        .finish();

    let token = match exchange_code(&query.code, &state).await {
        Ok(token) => token,
        Err(e) => {
            let mut res = Error::from(e).error_response();
            res.add_cookie(&clear_pending)?;
            return Ok(res);
        }
    };

    let secure = state.config.public_url.starts_with("https://");

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, sanitize_callback(Some(callback_url))))
        .cookie(session_cookie(token, Duration::days(SESSION_DAYS), secure))
        .cookie(clear_pending)
        .finish())
}

#[get("/session")]
async fn session(auth: SessionAuth) -> web::Json<SessionView> {
    web::Json(SessionView::from(auth.0))
}

#[post("/signout")]
async fn sign_out(state: AppState) -> HttpResponse {
    let secure = state.config.public_url.starts_with("https://");
    HttpResponse::Ok()
        .cookie(session_cookie(String::new(), Duration::ZERO, secure))
        .finish()
}

pub fn init(cfg: &mut web::ServiceConfig) {
    cfg.service(sign_in);
    cfg.service(callback);
    cfg.service(session);
    cfg.service(sign_out);
}
