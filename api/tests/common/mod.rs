#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use vibememory_api::config::Config;
use vibememory_api::directory::{Directory, DirectoryError};
use vibememory_api::models::user::DirectoryUser;
use vibememory_api::state::{AppStateRaw, State};

pub const SESSION_SECRET: &str = "test-session-secret";

/// A directory holding a fixed list of users.
pub struct StaticDirectory(pub Vec<DirectoryUser>);

#[async_trait]
impl Directory for StaticDirectory {
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError> {
        Ok(self.0.clone())
    }
}

/// A directory whose every call fails.
pub struct FailingDirectory;

#[async_trait]
impl Directory for FailingDirectory {
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError> {
        Err(DirectoryError::Status {
            status: 503,
            message: "upstream unavailable".to_string(),
        })
    }
}

pub fn directory_user(id: &str, email: Option<&str>, metadata: serde_json::Value) -> DirectoryUser {
    DirectoryUser {
        id: id.to_string(),
        email: email.map(str::to_string),
        user_metadata: metadata,
    }
}

/// Builds a configuration from the required variables plus `extra`.
pub fn config(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("SESSION_SECRET", SESSION_SECRET),
        ("SUPABASE_URL", "http://127.0.0.1:1"),
        ("SUPABASE_SERVICE_ROLE_KEY", "service-key"),
        ("GH_CLIENT_ID", "client-id"),
        ("GH_CLIENT_SECRET", "client-secret"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_vars(vars).unwrap()
}

pub fn state(config: Config, directory: impl Directory + 'static) -> AppStateRaw {
    State::new(config, Arc::new(directory))
}

/// Builds the application the way the server binary does, minus the middleware.
macro_rules! app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .default_service(actix_web::web::route().to(vibememory_api::handlers::not_found))
                .configure(vibememory_api::handlers::init),
        )
        .await
    };
}
