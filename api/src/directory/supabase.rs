use crate::config::SupabaseConfig;
use crate::directory::{Directory, DirectoryError};
use crate::models::user::DirectoryUser;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

/// Client for the Supabase auth admin API. Built once at startup and stored in the
/// application state.
#[derive(Clone, Debug)]
pub struct SupabaseDirectory {
    client: reqwest::Client,
    users_url: String,
}

#[derive(Deserialize, Debug)]
struct ListUsersResponse {
    #[serde(default)]
    users: Vec<DirectoryUser>,
}

impl SupabaseDirectory {
    pub fn new(config: &SupabaseConfig) -> Result<Self, DirectoryError> {
        let invalid_key =
            |_| DirectoryError::Config("service role key is not a valid header value".to_string());

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&config.service_role_key).map_err(invalid_key)?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.service_role_key))
                .map_err(invalid_key)?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            users_url: format!("{}/auth/v1/admin/users", config.url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl Directory for SupabaseDirectory {
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError> {
        let res = self
            .client
            .get(&self.users_url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let page = res.json::<ListUsersResponse>().await?;
        log::debug!("directory listed {} users", page.users.len());

        Ok(page.users)
    }
}

/// Pulls a human readable message out of a GoTrue error body. Falls back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["msg", "message", "error_description", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}
