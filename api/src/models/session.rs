use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// How long a signed-in session stays valid.
pub const SESSION_DAYS: i64 = 30;

/// The claims carried by a session token. Issued after a successful GitHub sign-in.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// GitHub user id.
    pub sub: i64,
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
    /// Avatar URL.
    pub image: Option<String>,
    pub exp: i64,
}

impl Session {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// Signs the session as an HS256 JWT.
    pub fn encode(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Decodes and validates a session token, including its expiry.
    pub fn decode(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        decode::<Session>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
    }
}

/// Expiry timestamp for a session issued now.
pub fn session_expiry() -> i64 {
    (Utc::now() + Duration::days(SESSION_DAYS)).timestamp()
}

/// The session as exposed to clients.
#[derive(Serialize, Deserialize, Debug)]
pub struct SessionView {
    pub user: SessionUser,
    pub expires: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SessionUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub login: String,
}

impl From<Session> for SessionView {
    fn from(s: Session) -> Self {
        let expires = s.expires_at().map(|t| t.to_rfc3339());
        SessionView {
            user: SessionUser {
                name: s.name,
                email: s.email,
                image: s.image,
                login: s.login,
            },
            expires,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(exp: i64) -> Session {
        Session {
            sub: 7,
            login: "alice".to_string(),
            name: Some("Alice".to_string()),
            email: Some("alice@example.com".to_string()),
            image: None,
            exp,
        }
    }

    #[test]
    fn decodes_what_it_encodes() {
        let s = session(session_expiry());
        let token = s.encode("secret").unwrap();
        assert_eq!(Session::decode(&token, "secret").unwrap(), s);
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = session(session_expiry()).encode("secret").unwrap();
        assert!(Session::decode(&token, "other").is_err());
    }

    #[test]
    fn rejects_expired_tokens() {
        let exp = (Utc::now() - Duration::hours(1)).timestamp();
        let token = session(exp).encode("secret").unwrap();
        assert!(Session::decode(&token, "secret").is_err());
    }

    #[test]
    fn view_formats_expiry_as_rfc3339() {
        let view = SessionView::from(session(0));
        assert_eq!(view.user.login, "alice");
        assert_eq!(view.expires.as_deref(), Some("1970-01-01T00:00:00+00:00"));
    }
}
