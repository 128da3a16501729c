use crate::directory::{supabase::SupabaseDirectory, DirectoryError};
use crate::normalize::normalize_model;
use crate::state::*;

use std::collections::HashMap;
use std::env;
use std::io;
use std::sync::Arc;

/// GitHub account used for the system user when `SYSTEM_GITHUB_USERNAME` is unset.
pub const DEFAULT_GITHUB_USERNAME: &str = "ustudiopd";
pub const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GH_USER_AGENT: &str = "vibememory";
const DEFAULT_GH_OAUTH_URL: &str = "https://github.com/login/oauth";
const DEFAULT_GH_API_URL: &str = "https://api.github.com";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub port: u16,
    /// Externally visible base URL, without a trailing slash. OAuth redirect URIs are built
    /// from it.
    pub public_url: String,
    /// Normalized model name.
    pub model: String,
    pub session_secret: String,
    pub system: SystemConfig,
    pub supabase: SupabaseConfig,
    pub github: GithubConfig,
}

/// Raw `SYSTEM_*` values. Defaults are applied when the system user is resolved, not here.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemConfig {
    pub github_username: Option<String>,
    pub github_access_token: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_role_key: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GithubConfig {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub oauth_url: String,
    pub api_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no {0} environment variable present")]
    Missing(&'static str),
    #[error("invalid port: {0}")]
    InvalidPort(String),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl From<ConfigError> for io::Error {
    fn from(e: ConfigError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    }
}

/// Removes a variable, treating an empty value as unset.
fn optional(env_vars: &mut HashMap<String, String>, key: &str) -> Option<String> {
    env_vars.remove(key).filter(|v| !v.trim().is_empty())
}

fn required(
    env_vars: &mut HashMap<String, String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    optional(env_vars, key).ok_or(ConfigError::Missing(key))
}

impl Config {
    pub fn parse_from_env() -> Result<Self, ConfigError> {
        // Load environment variables from a .env file. This is used for dev workflows.
        dotenv::dotenv().ok();

        Self::from_vars(env::vars().collect())
    }

    pub fn from_vars(mut env_vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = match optional(&mut env_vars, "PORT") {
            Some(p) => p.parse::<u16>().map_err(|_| ConfigError::InvalidPort(p))?,
            None => DEFAULT_PORT,
        };
        let public_url = optional(&mut env_vars, "PUBLIC_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();
        let model = normalize_model(optional(&mut env_vars, "OPENAI_MODEL").as_deref());
        let session_secret = required(&mut env_vars, "SESSION_SECRET")?;

        // Kept raw: an empty username still falls back to the default at resolution time.
        let system = SystemConfig {
            github_username: env_vars.remove("SYSTEM_GITHUB_USERNAME"),
            github_access_token: env_vars.remove("SYSTEM_GITHUB_ACCESS_TOKEN"),
            email: env_vars.remove("SYSTEM_USER_EMAIL"),
            name: env_vars.remove("SYSTEM_USER_NAME"),
        };

        let supabase = SupabaseConfig {
            url: required(&mut env_vars, "SUPABASE_URL")?,
            service_role_key: required(&mut env_vars, "SUPABASE_SERVICE_ROLE_KEY")?,
        };

        let github = GithubConfig {
            client_id: required(&mut env_vars, "GH_CLIENT_ID")?,
            client_secret: required(&mut env_vars, "GH_CLIENT_SECRET")?,
            user_agent: optional(&mut env_vars, "GH_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_GH_USER_AGENT.to_string()),
            oauth_url: optional(&mut env_vars, "GH_OAUTH_URL")
                .unwrap_or_else(|| DEFAULT_GH_OAUTH_URL.to_string()),
            api_url: optional(&mut env_vars, "GH_API_URL")
                .unwrap_or_else(|| DEFAULT_GH_API_URL.to_string()),
        };

        Ok(Config {
            port,
            public_url,
            model,
            session_secret,
            system,
            supabase,
            github,
        })
    }

    /// The URL GitHub sends users back to after they authorize the app.
    pub fn github_redirect_uri(&self) -> String {
        format!("{}/api/auth/callback/github", self.public_url)
    }

    pub fn into_state(self) -> Result<AppStateRaw, ConfigError> {
        // Secrets stay out of the log.
        log::info!(
            "config: port={} public_url={} model={} supabase={}",
            self.port,
            self.public_url,
            self.model,
            self.supabase.url
        );

        let directory = SupabaseDirectory::new(&self.supabase)?;

        Ok(Arc::new(State {
            config: self,
            directory: Arc::new(directory),
        }))
    }
}

#[derive(clap::Parser, Debug)]
#[clap(version)]
pub struct Opts {
    // The number of occurrences of the `v/verbose` flag
    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[clap(short, long, parse(from_occurrences))]
    pub verbose: u8,
}

impl Opts {
    pub fn parse_from_args() -> io::Result<(JoinHandle, Self)> {
        use clap::Parser;
        let opt: Self = Opts::parse();

        let level = match opt.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _more => LevelFilter::Trace,
        };

        let formater = BaseFormater::new()
            .local(true)
            .color(true)
            .level(4)
            .formater(format);
        let filter = BaseFilter::new()
            .starts_with(true)
            .notfound(true)
            .max_level(level)
            .chain(
                "hyper",
                if opt.verbose > 2 {
                    LevelFilter::Debug
                } else {
                    LevelFilter::Warn
                },
            );

        let handle = NonblockLogger::new()
            .filter(filter)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("bad log filter: {:?}", e)))?
            .formater(formater)
            .log_to_stdout()
            .map_err(|e| {
                io::Error::new(
                    io::ErrorKind::Other,
                    format!("failed to init nonblock_logger: {:?}", e),
                )
            })?;

        log::info!("opt: {:?}", opt);

        Ok((handle, opt))
    }
}

use nonblock_logger::{
    log::{LevelFilter, Record},
    BaseFilter, BaseFormater, FixedLevel, JoinHandle, NonblockLogger,
};

pub fn format(base: &BaseFormater, record: &Record) -> String {
    let level = FixedLevel::with_color(record.level(), base.color_get())
        .length(base.level_get())
        .into_colored()
        .into_coloredfg();

    format!(
        "[{} {}#{}:{} {}] {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        level,
        record.module_path().unwrap_or("*"),
        record.line().unwrap_or(0),
        nonblock_logger::current_thread_name(),
        record.args()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::DEFAULT_MODEL;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        let mut vars: HashMap<String, String> = [
            ("SESSION_SECRET", "s3cret"),
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service-key"),
            ("GH_CLIENT_ID", "client-id"),
            ("GH_CLIENT_SECRET", "client-secret"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in pairs {
            vars.insert(k.to_string(), v.to_string());
        }
        vars
    }

    #[test]
    fn applies_defaults() {
        let config = Config::from_vars(vars(&[])).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.public_url, "http://localhost:3000");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.system, SystemConfig::default());
        assert_eq!(config.github.oauth_url, DEFAULT_GH_OAUTH_URL);
        assert_eq!(config.github.api_url, DEFAULT_GH_API_URL);
        assert_eq!(
            config.github_redirect_uri(),
            "http://localhost:3000/api/auth/callback/github"
        );
    }

    #[test]
    fn reads_system_user_and_normalizes_model() {
        let config = Config::from_vars(vars(&[
            ("PORT", "8080"),
            ("PUBLIC_URL", "https://vibe.example.com/"),
            ("OPENAI_MODEL", " gpt\u{2011}4o "),
            ("SYSTEM_GITHUB_USERNAME", "alice"),
            ("SYSTEM_GITHUB_ACCESS_TOKEN", "ghp_token"),
            ("SYSTEM_USER_EMAIL", "alice@example.com"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.public_url, "https://vibe.example.com");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.system.github_username.as_deref(), Some("alice"));
        assert_eq!(config.system.github_access_token.as_deref(), Some("ghp_token"));
        assert_eq!(config.system.email.as_deref(), Some("alice@example.com"));
        assert_eq!(config.system.name, None);
    }

    #[test]
    fn reports_missing_required_variables() {
        let mut v = vars(&[]);
        v.remove("SUPABASE_URL");
        let err = Config::from_vars(v).unwrap_err();
        assert_eq!(err.to_string(), "no SUPABASE_URL environment variable present");

        let err = Config::from_vars(vars(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(_)));
    }
}
