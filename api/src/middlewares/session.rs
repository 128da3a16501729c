use crate::models::session::Session;
use crate::state::AppState;

use actix_web::{dev, error, FromRequest, HttpRequest};
use futures::future::{err, ok, Ready};

/// Name of the cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "vibememory.session";

/// A decoded, unexpired session. Extracting this in a handler makes the route require a
/// signed-in user.
///
/// The token is read from the session cookie first, then from an `Authorization: Bearer`
/// header.
#[derive(Debug)]
pub struct SessionAuth(pub Session);

#[derive(Debug)]
pub enum SessionError {
    NoSession,
    InvalidToken(jsonwebtoken::errors::Error),
    /// The application state was not registered with the app.
    MissingState,
}

impl From<SessionError> for actix_web::Error {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NoSession => error::ErrorUnauthorized("not signed in"),
            SessionError::InvalidToken(e) => {
                log::debug!("rejected session token: {:?}", e);
                error::ErrorUnauthorized("invalid or expired session")
            }
            SessionError::MissingState => {
                log::error!("application state missing while decoding session");
                error::ErrorInternalServerError("unknown error")
            }
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

impl FromRequest for SessionAuth {
    type Error = SessionError;
    type Future = Ready<Result<SessionAuth, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut dev::Payload) -> Self::Future {
        let state = match req.app_data::<AppState>() {
            Some(state) => state,
            None => return err(SessionError::MissingState),
        };

        let token = req
            .cookie(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .or_else(|| bearer_token(req));

        match token {
            Some(token) => match Session::decode(&token, &state.config.session_secret) {
                Ok(session) => ok(SessionAuth(session)),
                Err(e) => err(SessionError::InvalidToken(e)),
            },
            None => err(SessionError::NoSession),
        }
    }
}
