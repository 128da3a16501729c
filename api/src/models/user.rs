use serde_json::Value;

/// The system account, as described by process configuration.
///
/// Only ever constructed with a non-empty access token. See
/// [`crate::resolver::resolve_local_user`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemUser {
    pub github_username: String,
    pub github_access_token: String,
    pub email: Option<String>,
    pub name: String,
}

/// A user record as returned by the remote directory (the Supabase auth admin API).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DirectoryUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form metadata. Usually an object, but the directory does not guarantee it.
    #[serde(default)]
    pub user_metadata: Value,
}

impl DirectoryUser {
    /// Returns a string value from the user metadata. Non-string values are ignored.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata.get(key).and_then(Value::as_str)
    }

    pub fn github_username(&self) -> Option<&str> {
        self.metadata_str("github_username")
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata_str("name")
    }
}

/// The client-facing identity of the system user.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedIdentity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub github_username: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_string_metadata_only() {
        let user: DirectoryUser = serde_json::from_value(json!({
            "id": "u1",
            "email": "a@example.com",
            "user_metadata": { "github_username": "alice", "name": 42 }
        }))
        .unwrap();

        assert_eq!(user.github_username(), Some("alice"));
        assert_eq!(user.name(), None);
    }

    #[test]
    fn tolerates_missing_and_null_fields() {
        let user: DirectoryUser =
            serde_json::from_value(json!({ "id": "u2", "user_metadata": null })).unwrap();

        assert_eq!(user.email, None);
        assert_eq!(user.github_username(), None);
    }

    #[test]
    fn identity_serializes_camel_case_and_skips_missing_email() {
        let identity = ResolvedIdentity {
            name: "Alice".to_string(),
            email: None,
            github_username: "alice".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&identity).unwrap(),
            json!({ "name": "Alice", "githubUsername": "alice" })
        );
    }
}
